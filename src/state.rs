use std::path::{Path, PathBuf};

use crate::analysis::eligibility::{compute_pass_rate, PassCriteria, PassReport};
use crate::analysis::stats::{
    grade_breakdown, region_averages, score_histogram, subject_summary, Grade, Histogram,
    SubjectSummary,
};
use crate::config::Settings;
use crate::data::cache::{CacheEntry, CacheStore, SaveOutcome};
use crate::data::loader::load_and_combine;
use crate::data::model::{ExamDataset, Subject};
use crate::data::regions::RegionTable;
use crate::data::source::{discover_sources, GlobSources, SourceLister};
use crate::error::ExamError;

// ---------------------------------------------------------------------------
// Chart selection and status
// ---------------------------------------------------------------------------

/// Which chart the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Distribution,
    Classification,
    RegionComparison,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::Distribution,
        ChartKind::Classification,
        ChartKind::RegionComparison,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Distribution => "Phân phối điểm",
            ChartKind::Classification => "Tỷ lệ Giỏi/Khá/TB/Yếu",
            ChartKind::RegionComparison => "So sánh điểm các tỉnh",
        }
    }
}

/// Aggregated data behind one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Distribution(Histogram),
    Classification(Vec<(Grade, usize)>),
    RegionComparison(Vec<(String, f64)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Message shown under the control buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

/// A freshly imported dataset waiting for a cache name.
#[derive(Debug, Clone)]
pub struct PendingImport {
    pub dataset: ExamDataset,
    pub files: Vec<PathBuf>,
    pub name_input: String,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering.
///
/// The current dataset is only ever replaced as a whole; analysis reads it
/// through [`AppState::require_dataset`].
pub struct AppState {
    pub settings: Settings,
    pub cache: CacheStore,
    pub regions: RegionTable,
    sources: Box<dyn SourceLister>,

    /// Loaded dataset (None until the user opens or imports one).
    pub dataset: Option<ExamDataset>,
    /// Cache name of `dataset`.
    pub dataset_name: Option<String>,

    pub subject: Subject,
    /// Chart currently shown (None until one is requested).
    pub chart: Option<ChartKind>,
    /// Histogram bin the user clicked, as `(start, end, count)`.
    pub picked_bin: Option<(f64, f64, usize)>,
    /// Show the record table instead of the chart.
    pub show_preview: bool,
    chart_cache: Option<((ChartKind, Subject), ChartData)>,

    /// Last graduation report, shown in its own window.
    pub report: Option<PassReport>,

    /// Cache names listed by the "open" dialog; `Some` while it is open.
    pub cache_picker: Option<Vec<String>>,
    pub pending_import: Option<PendingImport>,

    pub status: Option<Status>,
}

impl Default for AppState {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_settings(Settings::load_or_default(&cwd), &cwd)
    }
}

impl AppState {
    /// Build a session scanning `source_dir` with the configured pattern.
    pub fn from_settings(settings: Settings, source_dir: &Path) -> Self {
        let sources = GlobSources::new(
            source_dir,
            &settings.source_pattern,
            &settings.source_extensions,
        );
        Self::new(settings, Box::new(sources))
    }

    pub fn new(settings: Settings, sources: Box<dyn SourceLister>) -> Self {
        let cache = CacheStore::new(settings.cache_dir.clone());
        if let Err(e) = cache.ensure_dir() {
            log::warn!("Cannot create cache dir {}: {e}", cache.dir().display());
        }
        Self {
            settings,
            cache,
            regions: RegionTable::builtin(),
            sources,
            dataset: None,
            dataset_name: None,
            subject: Subject::Math,
            chart: None,
            picked_bin: None,
            show_preview: false,
            chart_cache: None,
            report: None,
            cache_picker: None,
            pending_import: None,
            status: None,
        }
    }

    pub fn source_dir(&self) -> PathBuf {
        self.sources.dir()
    }

    /// Scan another directory for source files.
    pub fn set_source_dir(&mut self, dir: PathBuf) {
        log::info!("Source directory set to {}", dir.display());
        self.sources = Box::new(GlobSources::new(
            dir,
            &self.settings.source_pattern,
            &self.settings.source_extensions,
        ));
    }

    pub fn criteria(&self) -> PassCriteria {
        PassCriteria {
            min_subjects_for_eligibility: self.settings.min_subjects_for_eligibility,
            fail_threshold: self.settings.fail_threshold,
        }
    }

    // -- Dataset ownership --

    /// The current dataset or [`ExamError::MissingDataset`].
    pub fn require_dataset(&self) -> Result<&ExamDataset, ExamError> {
        self.dataset.as_ref().ok_or(ExamError::MissingDataset)
    }

    /// Replace the current dataset.
    pub fn set_dataset(&mut self, dataset: ExamDataset, name: String) {
        self.dataset = Some(dataset);
        self.dataset_name = Some(name);
        self.report = None;
        self.picked_bin = None;
        self.chart_cache = None;
    }

    // -- Cache --

    /// List cache entries for the "open" dialog.
    pub fn open_cache_picker(&mut self) {
        match self.cache.list_entries() {
            Ok(names) if names.is_empty() => {
                self.info("Không có bộ dữ liệu nào được lưu trữ.");
            }
            Ok(names) => self.cache_picker = Some(names),
            Err(e) => {
                log::error!("Listing cache entries failed: {e:#}");
                self.error(format!("Lỗi: {e:#}"));
            }
        }
    }

    /// Load the cache entry `name`. On failure the current dataset stays.
    pub fn open_cached(&mut self, name: &str) -> Result<usize, ExamError> {
        self.cache_picker = None;
        let dataset = self.cache.load(name)?;
        let rows = dataset.len();
        self.set_dataset(dataset, name.to_string());
        self.info(format!("Đã nạp {rows} dòng từ bộ dữ liệu '{name}'."));
        Ok(rows)
    }

    // -- Import --

    /// Discover and read the source files; the result waits for a name.
    pub fn import_sources(&mut self) -> Result<usize, ExamError> {
        let files = discover_sources(&*self.sources)?;
        let dataset = load_and_combine(&files, &self.regions)?;
        let rows = dataset.len();
        self.pending_import = Some(PendingImport {
            dataset,
            files,
            name_input: String::new(),
        });
        Ok(rows)
    }

    /// Drop the pending import without saving.
    pub fn cancel_import(&mut self) {
        if self.pending_import.take().is_some() {
            self.info("Hành động nhập và lưu đã bị hủy.");
        }
    }

    /// Save the pending import under `name`. When saved it becomes the
    /// current dataset; a declined overwrite discards it.
    pub fn save_pending(
        &mut self,
        name: &str,
        confirm_overwrite: impl FnOnce(&CacheEntry) -> bool,
    ) -> Result<SaveOutcome, ExamError> {
        let Some(pending) = self.pending_import.take() else {
            return Err(ExamError::MissingDataset);
        };
        let outcome = match self.cache.save(&pending.dataset, name, confirm_overwrite) {
            Ok(outcome) => outcome,
            Err(e) => {
                // Keep the import so the user can pick another name.
                self.pending_import = Some(pending);
                return Err(e);
            }
        };
        match &outcome {
            SaveOutcome::Saved(entry) => {
                let files: Vec<String> = pending
                    .files
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                log::info!("Imported {} into '{}'", files.join(", "), entry.name);
                self.set_dataset(pending.dataset, entry.name.clone());
                self.info(format!(
                    "Đã xử lý và lưu thành công '{}' trong thư mục {}.",
                    entry.name,
                    self.cache.dir().display()
                ));
            }
            SaveOutcome::OverwriteDeclined => {
                self.info("Giữ nguyên bộ dữ liệu đã lưu, không ghi đè.");
            }
        }
        Ok(outcome)
    }

    // -- Analysis --

    /// Graduation report of the current dataset over all subjects.
    pub fn graduation_report(&self) -> Result<PassReport, ExamError> {
        let dataset = self.require_dataset()?;
        Ok(compute_pass_rate(dataset, &Subject::ALL, &self.criteria()))
    }

    /// Compute and keep the graduation report for display.
    pub fn run_graduation_analysis(&mut self) {
        match self.graduation_report() {
            Ok(report) => self.report = Some(report),
            Err(e) => self.fail(&e),
        }
    }

    /// Switch the central chart; requires a dataset.
    pub fn show_chart(&mut self, chart: ChartKind) {
        if let Err(e) = self.require_dataset() {
            self.fail(&e);
            return;
        }
        self.chart = Some(chart);
        self.picked_bin = None;
        self.show_preview = false;
    }

    /// Data of the current chart, recomputed only when the chart, the
    /// subject or the dataset changed.
    pub fn chart_data(&mut self) -> Option<&ChartData> {
        let chart = self.chart?;
        let key = (chart, self.subject);
        if self.chart_cache.as_ref().map(|(k, _)| *k) != Some(key) {
            let dataset = self.dataset.as_ref()?;
            let data = match chart {
                ChartKind::Distribution => ChartData::Distribution(score_histogram(
                    dataset,
                    self.subject,
                    self.settings.histogram_bins,
                )),
                ChartKind::Classification => {
                    ChartData::Classification(grade_breakdown(dataset, self.subject))
                }
                ChartKind::RegionComparison => {
                    ChartData::RegionComparison(region_averages(dataset, self.subject))
                }
            };
            self.chart_cache = Some((key, data));
        }
        self.chart_cache.as_ref().map(|(_, data)| data)
    }

    /// Summary numbers of the selected subject.
    pub fn subject_summary(&self) -> Option<SubjectSummary> {
        subject_summary(self.dataset.as_ref()?, self.subject)
    }

    pub fn set_subject(&mut self, subject: Subject) {
        self.subject = subject;
        self.picked_bin = None;
    }

    // -- Status --

    pub fn info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            kind: StatusKind::Info,
            text: text.into(),
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            kind: StatusKind::Error,
            text: text.into(),
        });
    }

    /// Log `e` and show it in the status line.
    pub fn fail(&mut self, e: &ExamError) {
        let text = render_chain(e);
        log::error!("{text}");
        self.error(text);
    }
}

/// `error: cause: cause` rendering of an error chain.
fn render_chain(e: &dyn std::error::Error) -> String {
    let mut text = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::FixedSources;
    use tempfile::{tempdir, TempDir};

    const HEADER: &str = "SOBAODANH,Toán,Văn,Lí,Hóa,Sinh,Sử,Địa,Giáo dục công dân,Ngoại ngữ";

    fn session(tmp: &TempDir, files: Vec<PathBuf>) -> AppState {
        let settings = Settings {
            cache_dir: tmp.path().join("data_cache"),
            ..Settings::default()
        };
        AppState::new(settings, Box::new(FixedSources(files)))
    }

    fn source(tmp: &TempDir, name: &str, rows: &[&str]) -> PathBuf {
        let path = tmp.path().join(name);
        let body = std::iter::once(HEADER)
            .chain(rows.iter().copied())
            .collect::<Vec<_>>()
            .join("\n");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn analysis_without_dataset_reports_missing() {
        let tmp = tempdir().unwrap();
        let mut state = session(&tmp, Vec::new());
        assert!(matches!(
            state.graduation_report(),
            Err(ExamError::MissingDataset)
        ));

        state.run_graduation_analysis();
        assert!(state.report.is_none());
        assert_eq!(state.status.as_ref().unwrap().kind, StatusKind::Error);

        state.show_chart(ChartKind::Distribution);
        assert!(state.chart.is_none());
    }

    #[test]
    fn import_without_sources_reports_no_sources() {
        let tmp = tempdir().unwrap();
        let mut state = session(&tmp, Vec::new());
        assert!(matches!(
            state.import_sources(),
            Err(ExamError::NoSourcesFound { .. })
        ));
        assert!(state.pending_import.is_none());
    }

    #[test]
    fn import_save_and_reopen() {
        let tmp = tempdir().unwrap();
        let a = source(&tmp, "a-ketquathi-ct01.csv", &["1234567,8,7,6,5,,,,,"]);
        let b = source(&tmp, "b-ketquathi-ct02.csv", &["02000001,1,7,6,5,,,,,", "02000002,9,,,,,,,,"]);
        let mut state = session(&tmp, vec![a, b]);

        assert_eq!(state.import_sources().unwrap(), 3);
        assert!(state.dataset.is_none());

        let outcome = state.save_pending("2024", |_| true).unwrap();
        assert!(matches!(outcome, SaveOutcome::Saved(_)));
        assert!(state.pending_import.is_none());
        assert_eq!(state.dataset_name.as_deref(), Some("2024"));

        let report = state.graduation_report().unwrap();
        assert_eq!(report.total_count, 3);
        assert_eq!(report.eligible_count, 2);
        assert_eq!(report.failed_count, 1);

        let imported = state.dataset.clone().unwrap();
        state.dataset = None;
        assert_eq!(state.open_cached("2024").unwrap(), 3);
        assert_eq!(state.dataset.as_ref(), Some(&imported));
    }

    #[test]
    fn declined_overwrite_keeps_previous_dataset() {
        let tmp = tempdir().unwrap();
        let a = source(&tmp, "a.csv", &["01000001,8,7,6,5,,,,,"]);
        let mut state = session(&tmp, vec![a]);

        state.import_sources().unwrap();
        state.save_pending("same", |_| true).unwrap();
        let first = state.dataset.clone();

        state.import_sources().unwrap();
        let outcome = state.save_pending("same", |_| false).unwrap();
        assert_eq!(outcome, SaveOutcome::OverwriteDeclined);
        assert!(state.pending_import.is_none());
        assert_eq!(state.dataset, first);
    }

    #[test]
    fn invalid_name_keeps_pending_import() {
        let tmp = tempdir().unwrap();
        let a = source(&tmp, "a.csv", &["01000001,8,7,6,5,,,,,"]);
        let mut state = session(&tmp, vec![a]);
        state.import_sources().unwrap();

        assert!(matches!(
            state.save_pending("   ", |_| true),
            Err(ExamError::InvalidCacheName(_))
        ));
        assert!(state.pending_import.is_some());

        state.cancel_import();
        assert!(state.pending_import.is_none());
    }

    #[test]
    fn failed_cache_read_leaves_dataset_untouched() {
        let tmp = tempdir().unwrap();
        let a = source(&tmp, "a.csv", &["01000001,8,7,6,5,,,,,"]);
        let mut state = session(&tmp, vec![a]);
        state.import_sources().unwrap();
        state.save_pending("good", |_| true).unwrap();
        let before = state.dataset.clone();

        std::fs::write(state.cache.entry_path("bad"), b"garbage").unwrap();
        assert!(matches!(
            state.open_cached("bad"),
            Err(ExamError::CacheRead { .. })
        ));
        assert_eq!(state.dataset, before);
        assert_eq!(state.dataset_name.as_deref(), Some("good"));
    }

    #[test]
    fn cache_picker_lists_saved_entries() {
        let tmp = tempdir().unwrap();
        let mut state = session(&tmp, Vec::new());
        state.open_cache_picker();
        assert!(state.cache_picker.is_none());
        assert_eq!(state.status.as_ref().unwrap().kind, StatusKind::Info);

        state
            .cache
            .save(&ExamDataset::default(), "only", |_| true)
            .unwrap();
        state.open_cache_picker();
        assert_eq!(state.cache_picker, Some(vec!["only".to_string()]));
    }

    #[test]
    fn chart_data_follows_subject_and_dataset() {
        let tmp = tempdir().unwrap();
        let a = source(&tmp, "a.csv", &["01000001,8,7,,,,,,,", "02000001,6,,,,,,,,"]);
        let mut state = session(&tmp, vec![a]);
        state.import_sources().unwrap();
        state.save_pending("d", |_| true).unwrap();

        state.show_chart(ChartKind::RegionComparison);
        let Some(ChartData::RegionComparison(avgs)) = state.chart_data().cloned() else {
            panic!("expected region data");
        };
        assert_eq!(
            avgs,
            vec![("TP. HCM".to_string(), 6.0), ("Hà Nội".to_string(), 8.0)]
        );

        state.set_subject(Subject::Literature);
        let Some(ChartData::RegionComparison(avgs)) = state.chart_data().cloned() else {
            panic!("expected region data");
        };
        assert_eq!(avgs, vec![("Hà Nội".to_string(), 7.0)]);
        assert_eq!(state.subject_summary().unwrap().count, 1);

        state.set_dataset(ExamDataset::default(), "empty".into());
        let Some(ChartData::RegionComparison(avgs)) = state.chart_data().cloned() else {
            panic!("expected region data");
        };
        assert!(avgs.is_empty());
    }

    #[test]
    fn error_chain_is_rendered_with_causes() {
        let e = ExamError::CacheRead {
            name: "x".into(),
            source: anyhow::anyhow!("file is truncated"),
        };
        let text = render_chain(&e);
        assert_eq!(text, "cannot read cached dataset 'x': file is truncated");
    }
}
