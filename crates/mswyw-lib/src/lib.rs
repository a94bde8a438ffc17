//! Worth scoring library for microservices
//!
//! This crate provides the core functionality for:
//! - Resolving input descriptors (file, URL, JSON literal, computation unit)
//! - Coefficient validation
//! - Metrics extraction from an Elastic APM (Kibana) backend
//! - The cost / value / score formula
//! - Run metrics and structured logging

pub mod coefficients;
pub mod error;
pub mod extraction;
pub mod formula;
pub mod models;
pub mod observability;
pub mod orchestrator;
pub mod provider;

pub use coefficients::{CoefficientTable, DEFAULT_COEFFICIENTS, REQUIRED_COEFFICIENTS};
pub use error::{MswywError, Result};
pub use extraction::{KibanaDefaults, KibanaProvider, KIBANA_PROVIDER};
pub use models::*;
pub use observability::{RunMetrics, StructuredLogger};
pub use orchestrator::{Orchestrator, RunReport, RunRequest};
pub use provider::{Descriptor, ParamsProvider, ProviderRegistry, ProviderResolver, UrlFetcher};
