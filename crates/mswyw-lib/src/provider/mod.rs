//! Provider resolution
//!
//! Every structured input (coefficients, provider params, runtime metrics,
//! code info) is named by an opaque descriptor string. A descriptor is
//! classified once into a file path, URL, JSON literal or computation unit
//! name, and then resolved by the matching strategy.

mod descriptor;
mod fetch;
mod registry;
mod resolver;

pub use descriptor::Descriptor;
pub use fetch::{Fetcher, UrlFetcher};
pub use registry::{ParamsProvider, ProviderRegistry};
pub use resolver::ProviderResolver;
