// Application layer - use cases and orchestration.
// Callers validate and paginate; the service resolves tenants and customers,
// talks to storage and hands back plain data.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
