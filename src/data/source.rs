use std::path::PathBuf;

use anyhow::{Context, Result};
use glob::{glob, Pattern};

use crate::error::ExamError;

// ---------------------------------------------------------------------------
// Source listing
// ---------------------------------------------------------------------------

/// Produces the list of source files to ingest.
pub trait SourceLister {
    /// Candidate files, in ingestion order.
    fn list(&self) -> Result<Vec<PathBuf>>;

    /// Human readable description used in messages.
    fn describe(&self) -> String;

    /// Directory the files come from.
    fn dir(&self) -> PathBuf;
}

/// Scans a directory for `<pattern>.<ext>` files.
#[derive(Debug, Clone)]
pub struct GlobSources {
    pub dir: PathBuf,
    pub pattern: String,
    pub extensions: Vec<String>,
}

impl GlobSources {
    pub fn new(dir: impl Into<PathBuf>, pattern: &str, extensions: &[String]) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.to_string(),
            extensions: extensions.to_vec(),
        }
    }
}

impl SourceLister for GlobSources {
    fn list(&self) -> Result<Vec<PathBuf>> {
        let dir = Pattern::escape(&self.dir.to_string_lossy());
        let mut paths = Vec::new();
        for ext in &self.extensions {
            let full = format!("{dir}/{}.{ext}", self.pattern);
            let entries = glob(&full).with_context(|| format!("invalid pattern '{full}'"))?;
            for entry in entries {
                let path = entry.context("reading directory entry")?;
                if path.is_file() {
                    paths.push(path);
                }
            }
        }
        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    fn describe(&self) -> String {
        format!("{}.{{{}}}", self.pattern, self.extensions.join(","))
    }

    fn dir(&self) -> PathBuf {
        self.dir.clone()
    }
}

/// A fixed list of files, used as-is.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct FixedSources(pub Vec<PathBuf>);

#[cfg(test)]
impl SourceLister for FixedSources {
    fn list(&self) -> Result<Vec<PathBuf>> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        format!("{} fixed file(s)", self.0.len())
    }

    fn dir(&self) -> PathBuf {
        self.0
            .first()
            .and_then(|p| p.parent())
            .map(std::path::Path::to_path_buf)
            .unwrap_or_default()
    }
}

/// List the sources, failing with [`ExamError::NoSourcesFound`] when empty.
///
/// A listing failure is reported the same way, with the failure as source.
pub fn discover_sources(lister: &dyn SourceLister) -> Result<Vec<PathBuf>, ExamError> {
    let not_found = |source| ExamError::NoSourcesFound {
        pattern: lister.describe(),
        dir: lister.dir(),
        source,
    };
    let paths = match lister.list() {
        Ok(paths) => paths,
        Err(e) => {
            log::error!("Source listing failed: {e:#}");
            return Err(not_found(Some(e)));
        }
    };
    if paths.is_empty() {
        return Err(not_found(None));
    }
    log::info!("Discovered {} source file(s): {:?}", paths.len(), paths);
    Ok(paths)
}
