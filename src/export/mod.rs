//! Model persistence
//!
//! Fitted models are wrapped in a `ModelArtifact` together with their
//! feature and class names and stored as bincode blobs.

mod persistence;

pub use persistence::{save_and_reload, ModelArtifact};
