//! Catalog source: typed rows per object kind.

mod postgres;
mod query;
mod tls;
mod types;

pub use postgres::PgCatalog;
pub use query::{base_query, catalog_query, filtered_query, EXCLUDED_SCHEMA_PATTERNS};
pub use tls::{SslMode, TlsBuilder};
pub use types::*;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for reading exportable objects from a database catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every object of `kind` outside the excluded schemas,
    /// ordered by schema then name.
    async fn fetch_objects(&self, kind: ObjectKind) -> Result<Vec<ExtractedObject>>;
}
