use std::collections::BTreeMap;
use std::fmt;

use crate::data::model::{ExamDataset, Subject};

// ---------------------------------------------------------------------------
// Grade classification
// ---------------------------------------------------------------------------

/// Grade band of a single subject score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    Excellent,
    Good,
    Average,
    Weak,
}

impl Grade {
    #[cfg(test)]
    pub const ALL: [Grade; 4] = [Grade::Excellent, Grade::Good, Grade::Average, Grade::Weak];

    pub fn label(self) -> &'static str {
        match self {
            Grade::Excellent => "Giỏi",
            Grade::Good => "Khá",
            Grade::Average => "Trung bình",
            Grade::Weak => "Yếu",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify_score(score: f64) -> Grade {
    if score >= 8.0 {
        Grade::Excellent
    } else if score >= 6.5 {
        Grade::Good
    } else if score >= 5.0 {
        Grade::Average
    } else {
        Grade::Weak
    }
}

/// Number of present scores per grade, most frequent first. Grades with no
/// score are left out.
pub fn grade_breakdown(dataset: &ExamDataset, subject: Subject) -> Vec<(Grade, usize)> {
    let mut counts: BTreeMap<Grade, usize> = BTreeMap::new();
    for score in dataset.scores(subject) {
        *counts.entry(classify_score(score)).or_default() += 1;
    }
    let mut out: Vec<(Grade, usize)> = counts.into_iter().collect();
    // Stable sort keeps grade order among equal counts.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width bins over the observed score range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges, ascending.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(start, end, count)` of bin `idx`.
    pub fn bin(&self, idx: usize) -> Option<(f64, f64, usize)> {
        let count = *self.counts.get(idx)?;
        Some((self.edges[idx], self.edges[idx + 1], count))
    }

    /// Index of the bin containing `x`, if any.
    pub fn bin_index(&self, x: f64) -> Option<usize> {
        let (&lo, &hi) = (self.edges.first()?, self.edges.last()?);
        if x < lo || x > hi {
            return None;
        }
        let n = self.counts.len();
        let idx = ((x - lo) / (hi - lo) * n as f64) as usize;
        Some(idx.min(n - 1))
    }
}

/// Histogram of the present scores of `subject`.
///
/// Bins span min..max of the data, the last bin is closed on the right.
/// When all scores are equal the range is widened to `value ± 0.5`.
pub fn score_histogram(dataset: &ExamDataset, subject: Subject, bins: usize) -> Histogram {
    let scores: Vec<f64> = dataset.scores(subject).collect();
    if scores.is_empty() || bins == 0 {
        return Histogram::default();
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if (max - min).abs() < f64::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut hist = Histogram {
        edges,
        counts: vec![0; bins],
    };
    for score in scores {
        if let Some(idx) = hist.bin_index(score) {
            hist.counts[idx] += 1;
        }
    }
    hist
}

// ---------------------------------------------------------------------------
// Per-region means and subject summary
// ---------------------------------------------------------------------------

/// Mean score of `subject` per region name, ascending by mean.
///
/// Records without a region name are skipped, as are regions where nobody
/// took the subject.
pub fn region_averages(dataset: &ExamDataset, subject: Subject) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in &dataset.records {
        let (Some(region), Some(score)) = (record.region_name.as_deref(), record.score(subject))
        else {
            continue;
        };
        let entry = sums.entry(region).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    let mut out: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(region, (sum, n))| (region.to_string(), sum / n as f64))
        .collect();
    out.sort_by(|a, b| a.1.total_cmp(&b.1));
    out
}

/// Basic descriptive numbers for one subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

pub fn subject_summary(dataset: &ExamDataset, subject: Subject) -> Option<SubjectSummary> {
    let mut count = 0;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for score in dataset.scores(subject) {
        count += 1;
        sum += score;
        min = min.min(score);
        max = max.max(score);
    }
    (count > 0).then(|| SubjectSummary {
        count,
        mean: sum / count as f64,
        min,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use approx::assert_relative_eq;

    fn math(id: &str, score: Option<f64>, region: Option<&str>) -> Record {
        let mut r = Record {
            candidate_id: id.into(),
            scores: [None; Subject::COUNT],
            region_code: None,
            region_name: region.map(str::to_string),
        };
        r.set_score(Subject::Math, score);
        r
    }

    fn dataset(scores: &[Option<f64>]) -> ExamDataset {
        ExamDataset::from_records(scores.iter().map(|s| math("1", *s, None)).collect())
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(classify_score(8.0), Grade::Excellent);
        assert_eq!(classify_score(7.99), Grade::Good);
        assert_eq!(classify_score(6.5), Grade::Good);
        assert_eq!(classify_score(5.0), Grade::Average);
        assert_eq!(classify_score(4.99), Grade::Weak);
        assert_eq!(classify_score(0.0), Grade::Weak);
    }

    #[test]
    fn breakdown_orders_by_count_and_skips_absent() {
        let ds = dataset(&[Some(9.0), Some(2.0), Some(3.0), None, Some(7.0), Some(8.5)]);
        assert_eq!(
            grade_breakdown(&ds, Subject::Math),
            vec![(Grade::Excellent, 2), (Grade::Weak, 2), (Grade::Good, 1)]
        );
        assert!(grade_breakdown(&ds, Subject::Biology).is_empty());
    }

    #[test]
    fn histogram_spans_data_range() {
        let ds = dataset(&[Some(0.0), Some(5.0), Some(10.0), Some(10.0), None]);
        let h = score_histogram(&ds, Subject::Math, 20);
        assert_eq!(h.counts.len(), 20);
        assert_eq!(h.edges.len(), 21);
        assert_relative_eq!(h.edges[0], 0.0);
        assert_relative_eq!(h.edges[20], 10.0);
        assert_eq!(h.total(), 4);
        assert_eq!(h.counts[0], 1);
        assert_eq!(h.counts[10], 1);
        // Right edge is inclusive.
        assert_eq!(h.counts[19], 2);
    }

    #[test]
    fn histogram_of_constant_scores_is_widened() {
        let ds = dataset(&[Some(7.0), Some(7.0)]);
        let h = score_histogram(&ds, Subject::Math, 4);
        assert_relative_eq!(h.edges[0], 6.5);
        assert_relative_eq!(h.edges[4], 7.5);
        assert_eq!(h.total(), 2);
        let (start, end, count) = h.bin(2).unwrap();
        assert_relative_eq!(start, 7.0);
        assert_relative_eq!(end, 7.25);
        assert_eq!(count, 2);
    }

    #[test]
    fn histogram_of_no_scores_is_empty() {
        let ds = dataset(&[None, None]);
        assert!(score_histogram(&ds, Subject::Math, 20).is_empty());
    }

    #[test]
    fn region_means_ascending_without_unknown_regions() {
        let ds = ExamDataset::from_records(vec![
            math("1", Some(8.0), Some("Hà Nội")),
            math("2", Some(6.0), Some("Hà Nội")),
            math("3", Some(5.0), Some("Cà Mau")),
            math("4", Some(1.0), None),
            math("5", None, Some("Lai Châu")),
        ]);
        let avgs = region_averages(&ds, Subject::Math);
        assert_eq!(avgs.len(), 2);
        assert_eq!(avgs[0].0, "Cà Mau");
        assert_relative_eq!(avgs[0].1, 5.0);
        assert_eq!(avgs[1].0, "Hà Nội");
        assert_relative_eq!(avgs[1].1, 7.0);
    }

    #[test]
    fn summary_of_present_scores() {
        let ds = dataset(&[Some(2.0), None, Some(6.0), Some(10.0)]);
        let s = subject_summary(&ds, Subject::Math).unwrap();
        assert_eq!(s.count, 3);
        assert_relative_eq!(s.mean, 6.0);
        assert_relative_eq!(s.min, 2.0);
        assert_relative_eq!(s.max, 10.0);
        assert!(subject_summary(&ds, Subject::History).is_none());
    }
}
