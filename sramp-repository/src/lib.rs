//! SRAMP Repository - Service Facade
//!
//! The operation surface callers (and, one layer up, a wire binding) work
//! against: artifact create/read/update/delete plus structured queries with
//! paging, over the located persistence backend and expander.

pub mod artifact;
pub mod query;
pub mod wiring;

pub use artifact::{ArtifactService, ContentFetch};
pub use query::QueryService;
pub use wiring::{bootstrap, Repository};
