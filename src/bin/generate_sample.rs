//! Writes synthetic `*-ketquathi-ct*.csv` result sheets into the working
//! directory so the viewer has something to import.

use anyhow::{Context, Result};

const SUBJECTS: [&str; 9] = [
    "Toán",
    "Văn",
    "Lí",
    "Hóa",
    "Sinh",
    "Sử",
    "Địa",
    "Giáo dục công dân",
    "Ngoại ngữ",
];

/// Natural science block: Lí, Hóa, Sinh.
const SCIENCE: [usize; 3] = [2, 3, 4];
/// Social science block: Sử, Địa, Giáo dục công dân.
const SOCIAL: [usize; 3] = [5, 6, 7];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// A score on the official 0.25 / 0.2 grid, clamped to 0..=10.
fn score(rng: &mut SimpleRng, mean: f64, step: f64) -> f64 {
    let raw = rng.gauss(mean, 1.6).clamp(0.0, 10.0);
    (raw / step).round() * step
}

fn candidate_row(rng: &mut SimpleRng, id: u32, region_mean: f64) -> Vec<String> {
    let mut scores: [Option<f64>; 9] = [None; 9];

    // About one in ten are independent candidates sitting only a few papers.
    let independent = rng.next_f64() < 0.1;
    if independent {
        for idx in SCIENCE {
            if rng.next_f64() < 0.6 {
                scores[idx] = Some(score(rng, region_mean, 0.25));
            }
        }
    } else {
        scores[0] = Some(score(rng, region_mean, 0.2));
        scores[1] = Some(score(rng, region_mean + 0.6, 0.25));
        scores[8] = Some(score(rng, region_mean - 0.8, 0.2));
        let block = if rng.next_f64() < 0.45 { SCIENCE } else { SOCIAL };
        for idx in block {
            scores[idx] = Some(score(rng, region_mean, 0.25));
        }
    }

    let mut row = vec![format!("{id:08}")];
    row.extend(
        scores
            .iter()
            .map(|s| s.map(|v| format!("{v:.2}")).unwrap_or_default()),
    );
    row
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // (file suffix, region codes in that file, mean score)
    let files = [
        ("ct01", [1u32, 2, 3], 6.6),
        ("ct02", [28, 29, 30], 6.2),
        ("ct03", [7, 14, 62], 5.4),
    ];
    let per_region = 400;

    for (suffix, regions, base_mean) in files {
        let path = format!("sample-ketquathi-{suffix}.csv");
        let mut writer = csv::Writer::from_path(&path).with_context(|| format!("creating {path}"))?;

        let mut header = vec!["SOBAODANH"];
        header.extend(SUBJECTS);
        writer.write_record(&header)?;

        let mut rows = 0;
        for (i, region) in regions.into_iter().enumerate() {
            let mean = base_mean - i as f64 * 0.3;
            for n in 0..per_region {
                let id = region * 1_000_000 + n + 1;
                writer.write_record(candidate_row(&mut rng, id, mean))?;
                rows += 1;
            }
        }
        writer.flush()?;
        println!("Wrote {rows} candidates to {path}");
    }

    Ok(())
}
