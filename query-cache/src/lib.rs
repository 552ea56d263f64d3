//! Keyed query cache with staleness windows, in-flight de-duplication,
//! stale-while-revalidate reads and prefix invalidation.
//!
//! The cache is a cheap-to-clone handle; the application root owns one and
//! passes it to whatever needs it.

mod cache;
mod key;
mod options;
mod state;

pub use cache::{QueryCache, QueryCacheBuilder};
pub use key::{KeyPart, QueryKey};
pub use options::QueryOptions;
pub use state::{QueryState, QueryStatus};
