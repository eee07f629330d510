//! # pg-script-export
//!
//! Export PostgreSQL object definitions as re-runnable SQL scripts for a
//! Liquibase changelog.
//!
//! Each run:
//!
//! - **Reads the changelog** (`<database>/changelog_post.xml`) to learn which
//!   scripts are already registered
//! - **Queries the catalog** for enums, functions, views and triggers,
//!   skipping internal schemas
//! - **Writes one script per object** to
//!   `<database>/<schema>/<kind>/<name>.sql`, with the boilerplate needed to
//!   re-run it
//! - **Writes an index fragment** (`<database>/lb_help_script.txt`) holding
//!   `<sqlFile>` entries for scripts the changelog does not reference yet
//!
//! ## Example
//!
//! ```rust,no_run
//! use pg_script_export::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> pg_script_export::Result<()> {
//!     let config = Config::load("config.json")?;
//!     let orchestrator = Orchestrator::new(config)?;
//!     let summary = orchestrator.run().await?;
//!     println!("{} new scripts", summary.total_announced());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fragment;
pub mod manifest;
pub mod orchestrator;
pub mod script;
pub mod source;

// Re-exports for convenient access
pub use config::{Config, DatabaseConfig, OutputConfig};
pub use error::{ExportError, Result};
pub use fragment::{IndexFragment, Registration};
pub use manifest::RegisteredPaths;
pub use orchestrator::{
    extract_kind, health_check, ExtractionSummary, HealthCheckResult, KindSummary, Orchestrator,
};
pub use script::ScriptPath;
pub use source::{CatalogSource, ExtractedObject, ObjectKind, PgCatalog};
