//! Series utilities shared by providers, the pipeline and the model.
//!
//! Modules include:
//! - `infer`: infer the typical observation cadence in days
//! - `normalize`: turn raw provider rows into an ordered, de-duplicated training series
/// Cadence inference helpers.
pub mod infer;
/// Normalization of raw rows into a training series.
pub mod normalize;
