use std::fmt;

// ---------------------------------------------------------------------------
// Subject – the closed set of examined subjects
// ---------------------------------------------------------------------------

/// One examined subject. The discriminant doubles as the index into
/// [`Record::scores`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subject {
    Math,
    Literature,
    Physics,
    Chemistry,
    Biology,
    History,
    Geography,
    CivicEducation,
    ForeignLanguage,
}

impl Subject {
    /// All subjects in column order.
    pub const ALL: [Subject; 9] = [
        Subject::Math,
        Subject::Literature,
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
        Subject::History,
        Subject::Geography,
        Subject::CivicEducation,
        Subject::ForeignLanguage,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Column header used by the source spreadsheets and the cache schema.
    pub fn column_name(self) -> &'static str {
        match self {
            Subject::Math => "Toán",
            Subject::Literature => "Văn",
            Subject::Physics => "Lí",
            Subject::Chemistry => "Hóa",
            Subject::Biology => "Sinh",
            Subject::History => "Sử",
            Subject::Geography => "Địa",
            Subject::CivicEducation => "Giáo dục công dân",
            Subject::ForeignLanguage => "Ngoại ngữ",
        }
    }

    /// Alternative spellings seen in published result sheets.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Subject::Physics => &["Lý", "Vật lí", "Vật lý"],
            Subject::Chemistry => &["Hoá", "Hóa học"],
            Subject::CivicEducation => &["GDCD"],
            _ => &[],
        }
    }

    /// Match a header cell against the canonical name and its aliases.
    pub fn from_header(header: &str) -> Option<Subject> {
        let header = header.trim();
        Self::ALL.into_iter().find(|s| {
            s.column_name() == header || s.aliases().iter().any(|a| *a == header)
        })
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ---------------------------------------------------------------------------
// Record – one examinee
// ---------------------------------------------------------------------------

/// Header of the candidate identifier column.
pub const ID_COLUMN: &str = "SOBAODANH";
/// Header of the derived region code column.
pub const REGION_CODE_COLUMN: &str = "Mã tỉnh";
/// Header of the derived region name column.
pub const REGION_NAME_COLUMN: &str = "Tỉnh";

/// One examinee row with a fixed set of optional subject scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Candidate number as printed in the source (may be shorter than 8 digits).
    pub candidate_id: String,
    /// Scores indexed by [`Subject::index`]; `None` when the subject was not taken.
    pub scores: [Option<f64>; Subject::COUNT],
    /// Two-character region prefix of the zero-padded identifier.
    pub region_code: Option<String>,
    /// Display name of `region_code`, `None` when the code is unknown.
    pub region_name: Option<String>,
}

impl Record {
    pub fn score(&self, subject: Subject) -> Option<f64> {
        self.scores[subject.index()]
    }

    pub fn set_score(&mut self, subject: Subject, score: Option<f64>) {
        self.scores[subject.index()] = score;
    }

    /// Number of present scores among `subjects`.
    pub fn taken_count(&self, subjects: &[Subject]) -> usize {
        subjects.iter().filter(|s| self.score(**s).is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// ExamDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All records in insertion order (file order, then row order).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExamDataset {
    pub records: Vec<Record>,
}

impl ExamDataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        ExamDataset { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Present scores of one subject, in record order.
    pub fn scores(&self, subject: Subject) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().filter_map(move |r| r.score(subject))
    }

    /// Append another dataset, keeping order and duplicates.
    pub fn extend(&mut self, other: ExamDataset) {
        self.records.extend(other.records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_index_matches_column_order() {
        for (i, s) in Subject::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn headers_resolve_with_aliases() {
        assert_eq!(Subject::from_header(" Toán "), Some(Subject::Math));
        assert_eq!(Subject::from_header("Lý"), Some(Subject::Physics));
        assert_eq!(Subject::from_header("Lí"), Some(Subject::Physics));
        assert_eq!(Subject::from_header("Mã môn ngoại ngữ"), None);
    }

    #[test]
    fn taken_count_ignores_other_subjects() {
        let mut r = Record {
            candidate_id: "1".into(),
            scores: [None; Subject::COUNT],
            region_code: None,
            region_name: None,
        };
        r.set_score(Subject::Math, Some(7.0));
        r.set_score(Subject::History, Some(0.0));
        assert_eq!(r.taken_count(&Subject::ALL), 2);
        assert_eq!(r.taken_count(&[Subject::Math, Subject::Biology]), 1);
    }
}
