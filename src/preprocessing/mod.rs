//! Data preparation
//!
//! Turns the record table into a numeric feature matrix and a label vector,
//! then partitions the rows:
//! - Ordinal encoding (`date_confirmation`)
//! - One-hot encoding with source-prefixed column names (`sex`, `country`, `province`)
//! - Seeded, optionally stratified train/test split

mod config;
mod encoder;
mod pipeline;
pub mod split;

pub use config::EncoderConfig;
pub use encoder::{OneHotEncoder, OrdinalEncoder, UnknownCategory};
pub use pipeline::{CaseEncoder, EncodedDataset};
pub use split::{train_test_split, Split, SplitConfig, TrainTestSplit};

use crate::error::Result;
use polars::prelude::DataFrame;

/// Encode `df` and split it, returning the fitted encoder alongside
pub fn prepare_dataset(
    df: &DataFrame,
    encoder_config: &EncoderConfig,
    split_config: &SplitConfig,
) -> Result<(CaseEncoder, EncodedDataset, TrainTestSplit, Split)> {
    let mut encoder = CaseEncoder::with_config(encoder_config.clone());
    let dataset = encoder.fit_transform(df)?;
    let (parts, split) = train_test_split(&dataset.features, &dataset.labels, split_config)?;

    tracing::info!(
        samples = dataset.n_samples(),
        features = dataset.n_features(),
        train = split.train_indices.len(),
        test = split.test_indices.len(),
        "prepared dataset"
    );

    Ok((encoder, dataset, parts, split))
}
