//! Pure computations over a loaded [`ExamDataset`](crate::data::model::ExamDataset).
//!
//! Nothing here touches the filesystem or the UI; every function takes the
//! dataset explicitly and returns plain values.

pub mod eligibility;
pub mod stats;
