//! # Tanren Export
//!
//! Stages two and three of the pipeline. [`InterchangeExporter`] turns a
//! training directory into an interchange descriptor plus export manifest;
//! [`DeploymentConverter`] turns that descriptor into `model.json`,
//! `weights.bin` and a conversion manifest.

pub mod deploy;
pub mod interchange;

pub use deploy::{ConversionArtifacts, DeploymentConverter, estimated_size_mb};
pub use interchange::{ExportArtifacts, InterchangeExporter};
