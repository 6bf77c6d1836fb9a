//! Data module - Synthetic time series generation

mod generator;

pub use generator::{format_label, DataPoint, Dataset, GenerateError, VALUE_CEILING};
