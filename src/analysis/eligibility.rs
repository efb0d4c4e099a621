use std::fmt;

use crate::data::model::{ExamDataset, Subject};

// ---------------------------------------------------------------------------
// Graduation criteria
// ---------------------------------------------------------------------------

/// Rules deciding who is considered for graduation and who fails outright.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassCriteria {
    /// A record is eligible with at least this many present scores.
    pub min_subjects_for_eligibility: usize,
    /// An eligible record fails when any score is `<=` this value.
    pub fail_threshold: f64,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            min_subjects_for_eligibility: 4,
            fail_threshold: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of [`compute_pass_rate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassReport {
    pub total_count: usize,
    pub eligible_count: usize,
    pub ineligible_count: usize,
    /// Eligible records with at least one score at or below the threshold.
    pub failed_count: usize,
    pub passed_count: usize,
    /// Percentage of failed among eligible, full precision. `0.0` when no
    /// record is eligible.
    pub failure_rate: f64,
    pub criteria: PassCriteria,
}

impl PassReport {
    /// Failure rate rounded to two decimals for display.
    pub fn failure_rate_display(&self) -> String {
        format!("{:.2}%", self.failure_rate)
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min = self.criteria.min_subjects_for_eligibility;
        writeln!(f, "--- Phân tích toàn bộ dữ liệu ---")?;
        writeln!(f, "Tổng số thí sinh trong tệp: {}", group_thousands(self.total_count))?;
        writeln!(f)?;
        writeln!(f, "--- Lọc đối tượng xét tốt nghiệp ---")?;
        writeln!(
            f,
            "Số thí sinh không xét tốt nghiệp (thi < {min} môn, thường là thí sinh tự do): {}",
            group_thousands(self.ineligible_count)
        )?;
        writeln!(
            f,
            "Số thí sinh đủ điều kiện xét tốt nghiệp (thi >= {min} môn): {}",
            group_thousands(self.eligible_count)
        )?;
        writeln!(f)?;
        writeln!(f, "--- Kết quả tốt nghiệp (của nhóm đủ điều kiện) ---")?;
        writeln!(
            f,
            "Số thí sinh trượt do có điểm liệt (<= {:.1}): {}",
            self.criteria.fail_threshold,
            group_thousands(self.failed_count)
        )?;
        writeln!(f)?;
        write!(
            f,
            "=> Tỷ lệ trượt tốt nghiệp thực tế: {}",
            self.failure_rate_display()
        )
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Split records into eligible / ineligible and count outright failures
/// among the eligible ones.
///
/// Only `subjects` are looked at, both for the eligibility count and for the
/// failure check. Absent scores never trigger a failure.
pub fn compute_pass_rate(
    dataset: &ExamDataset,
    subjects: &[Subject],
    criteria: &PassCriteria,
) -> PassReport {
    let mut eligible_count = 0;
    let mut failed_count = 0;

    for record in &dataset.records {
        if record.taken_count(subjects) < criteria.min_subjects_for_eligibility {
            continue;
        }
        eligible_count += 1;
        let failed = subjects
            .iter()
            .filter_map(|s| record.score(*s))
            .any(|score| score <= criteria.fail_threshold);
        if failed {
            failed_count += 1;
        }
    }

    let total_count = dataset.len();
    let failure_rate = if eligible_count > 0 {
        failed_count as f64 / eligible_count as f64 * 100.0
    } else {
        0.0
    };

    PassReport {
        total_count,
        eligible_count,
        ineligible_count: total_count - eligible_count,
        failed_count,
        passed_count: eligible_count - failed_count,
        failure_rate,
        criteria: *criteria,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use approx::assert_relative_eq;

    fn record(scores: &[Option<f64>]) -> Record {
        let mut r = Record {
            candidate_id: "01000001".into(),
            scores: [None; Subject::COUNT],
            region_code: Some("01".into()),
            region_name: Some("Hà Nội".into()),
        };
        for (subject, score) in Subject::ALL.iter().zip(scores) {
            r.set_score(*subject, *score);
        }
        r
    }

    /// 10 records: 3 with fewer than four scores, 2 eligible with a score <= 1.
    fn scenario() -> ExamDataset {
        let mut records = vec![
            record(&[Some(5.0), Some(6.0), Some(7.0)]),
            record(&[Some(0.5)]),
            record(&[]),
            record(&[Some(1.0), Some(6.0), Some(7.0), Some(8.0)]),
            record(&[Some(5.0), Some(6.0), None, Some(7.0), Some(0.25), Some(9.0)]),
        ];
        for _ in 0..5 {
            records.push(record(&[Some(5.0), Some(6.0), Some(7.0), Some(1.25)]));
        }
        ExamDataset::from_records(records)
    }

    #[test]
    fn scenario_counts_and_rate() {
        let report = compute_pass_rate(&scenario(), &Subject::ALL, &PassCriteria::default());
        assert_eq!(report.total_count, 10);
        assert_eq!(report.ineligible_count, 3);
        assert_eq!(report.eligible_count, 7);
        assert_eq!(report.failed_count, 2);
        assert_eq!(report.passed_count, 5);
        assert_relative_eq!(report.failure_rate, 200.0 / 7.0, epsilon = 1e-12);
        assert_eq!(report.failure_rate_display(), "28.57%");
    }

    #[test]
    fn eligible_plus_ineligible_is_total() {
        let ds = scenario();
        for min in 0..=Subject::COUNT + 1 {
            let criteria = PassCriteria {
                min_subjects_for_eligibility: min,
                ..PassCriteria::default()
            };
            let r = compute_pass_rate(&ds, &Subject::ALL, &criteria);
            assert_eq!(r.eligible_count + r.ineligible_count, r.total_count);
            assert!(r.failed_count <= r.eligible_count);
        }
    }

    #[test]
    fn no_eligible_records_gives_zero_rate() {
        let ds = ExamDataset::from_records(vec![record(&[Some(0.0)]), record(&[])]);
        let r = compute_pass_rate(&ds, &Subject::ALL, &PassCriteria::default());
        assert_eq!(r.eligible_count, 0);
        assert_eq!(r.ineligible_count, 2);
        assert_eq!(r.failure_rate, 0.0);

        let empty = compute_pass_rate(&ExamDataset::default(), &Subject::ALL, &PassCriteria::default());
        assert_eq!(empty.total_count, 0);
        assert_eq!(empty.failure_rate, 0.0);
    }

    #[test]
    fn only_listed_subjects_are_considered() {
        let ds = ExamDataset::from_records(vec![record(&[
            Some(5.0),
            Some(5.0),
            Some(5.0),
            Some(5.0),
            Some(0.0),
        ])]);
        let first_four = &Subject::ALL[..4];
        let r = compute_pass_rate(&ds, first_four, &PassCriteria::default());
        assert_eq!(r.eligible_count, 1);
        assert_eq!(r.failed_count, 0);

        let r = compute_pass_rate(&ds, &Subject::ALL, &PassCriteria::default());
        assert_eq!(r.failed_count, 1);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let ds = scenario();
        let a = compute_pass_rate(&ds, &Subject::ALL, &PassCriteria::default());
        let b = compute_pass_rate(&ds, &Subject::ALL, &PassCriteria::default());
        assert_eq!(a, b);
    }

    #[test]
    fn summary_text_groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_234_567), "1,234,567");

        let r = compute_pass_rate(&scenario(), &Subject::ALL, &PassCriteria::default());
        let text = r.to_string();
        assert!(text.contains("Tổng số thí sinh trong tệp: 10"));
        assert!(text.ends_with("28.57%"));
    }
}
