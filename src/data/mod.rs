//! Data ingestion, joining and checkpoint persistence.

pub mod checkpoint;
pub mod join;
pub mod merged;
pub mod records;
