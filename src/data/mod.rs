/// Data layer: core types, ingestion, and the dataset cache.
///
/// Architecture:
/// ```text
///  *-ketquathi-ct*.xlsx / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  list matching files (glob or fixed list)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse sheets, derive region → ExamDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  data_cache/<name>.parquet  ⇄  ExamDataset
///   └──────────┘
/// ```

pub mod cache;
pub mod loader;
pub mod model;
pub mod regions;
pub mod source;
