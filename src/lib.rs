//! Batch pipeline that classifies movie reviews as spoilers.
//!
//! Five stages run in order, each persisting a checkpoint the next one reads:
//! join & filter, feature extraction, scaling, split & vectorize, classify & evaluate.

pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod model;
pub mod nlp;
pub mod pipeline;
