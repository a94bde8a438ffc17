//! Metrics extraction from an Elastic APM (Kibana) backend
//!
//! The pipeline narrows scope in dependent steps:
//! app -> containers -> agent and traffic -> resource charts -> transaction groups
//! and emits one metric record per container. Any failed request aborts the
//! whole extraction.

mod client;
mod pipeline;
mod provider;
mod responses;


pub use client::{ApmClient, BackendConfig, Stage, DEFAULT_REQUEST_TIMEOUT};
pub use pipeline::ExtractionPipeline;
pub use provider::{KibanaDefaults, KibanaProvider, KIBANA_PROVIDER};
pub use responses::{
    container_ids, resource_usage, traffic, ChartsResponse, LocalFilters, ResourceUsage,
    ServicesResponse, Traffic,
};
