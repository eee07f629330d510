//! Export orchestrator - runs the per-kind extractors in order.

use crate::config::{Config, DatabaseConfig};
use crate::error::{ExportError, Result};
use crate::fragment::{IndexFragment, Registration};
use crate::manifest::RegisteredPaths;
use crate::script::{relative_path, save_objects};
use crate::source::{CatalogSource, ExtractedObject, ObjectKind, PgCatalog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Export orchestrator.
///
/// Owns the configuration and the registered path set, which is loaded
/// once and read-only afterwards.
pub struct Orchestrator {
    config: Config,
    registered: RegisteredPaths,
}

/// Per-kind counts for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSummary {
    /// Object kind.
    pub kind: ObjectKind,

    /// Rows returned by the catalog.
    pub objects: usize,

    /// Script files written.
    pub scripts: usize,

    /// Scripts announced in the index fragment.
    pub announced: usize,

    /// Scripts the changelog already references.
    pub already_registered: usize,
}

impl KindSummary {
    fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            objects: 0,
            scripts: 0,
            announced: 0,
            already_registered: 0,
        }
    }
}

/// Result of an export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// When the export started.
    pub started_at: DateTime<Utc>,

    /// When the export completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Directory the scripts were written under.
    pub database_root: String,

    /// Index fragment location.
    pub fragment_path: String,

    /// Counts per kind, in extraction order.
    pub kinds: Vec<KindSummary>,
}

impl ExtractionSummary {
    pub fn total_scripts(&self) -> usize {
        self.kinds.iter().map(|k| k.scripts).sum()
    }

    pub fn total_announced(&self) -> usize {
        self.kinds.iter().map(|k| k.announced).sum()
    }

    /// Serialize the summary as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of a connection check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub connected: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Orchestrator {
    /// Create an orchestrator, reading the changelog manifest.
    ///
    /// Fails before any database work if the manifest is missing or malformed.
    pub fn new(config: Config) -> Result<Self> {
        let registered = RegisteredPaths::load(config.manifest_path())?;
        Ok(Self::with_registered(config, registered))
    }

    /// Create an orchestrator with an already loaded registered path set.
    pub fn with_registered(config: Config, registered: RegisteredPaths) -> Self {
        Self { config, registered }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registered(&self) -> &RegisteredPaths {
        &self.registered
    }

    /// Connect to the configured database and run the export.
    pub async fn run(&self) -> Result<ExtractionSummary> {
        let catalog = PgCatalog::connect(&self.config.db).await?;
        self.run_with(&catalog).await
    }

    /// Run the export against `catalog`.
    ///
    /// Kinds are processed in the fixed order enum, function, view, trigger;
    /// the order does not follow dependencies between objects.
    pub async fn run_with<C>(&self, catalog: &C) -> Result<ExtractionSummary>
    where
        C: CatalogSource + ?Sized,
    {
        let started_at = Utc::now();
        let timer = Instant::now();

        let database_root = self.config.database_root();
        let fragment_path = self.config.fragment_path();
        std::fs::create_dir_all(&database_root)
            .map_err(|e| ExportError::write(&database_root, e))?;

        info!("Exporting scripts to {:?}", database_root);
        let mut fragment = IndexFragment::create(&fragment_path)?;

        let mut kinds = Vec::with_capacity(ObjectKind::ALL.len());
        for kind in ObjectKind::ALL {
            let summary =
                extract_kind(catalog, kind, &database_root, &mut fragment, &self.registered)
                    .await?;
            kinds.push(summary);
        }
        fragment.finish()?;

        let summary = ExtractionSummary {
            started_at,
            completed_at: Utc::now(),
            duration_seconds: timer.elapsed().as_secs_f64(),
            database_root: database_root.display().to_string(),
            fragment_path: fragment_path.display().to_string(),
            kinds,
        };

        info!(
            "Export complete: {} scripts written, {} new entries in {:?}",
            summary.total_scripts(),
            summary.total_announced(),
            fragment_path
        );

        Ok(summary)
    }
}

/// Export every object of one kind and announce the new scripts.
///
/// Objects resolving to the same script (function overloads) are written
/// together, in catalog order, and announced once. A path `fragment` has
/// already announced is rewritten but not counted as new.
pub async fn extract_kind<C, W>(
    catalog: &C,
    kind: ObjectKind,
    database_root: &Path,
    fragment: &mut IndexFragment<W>,
    registered: &RegisteredPaths,
) -> Result<KindSummary>
where
    C: CatalogSource + ?Sized,
    W: Write,
{
    fragment.section(kind)?;

    let objects = catalog.fetch_objects(kind).await?;
    let mut summary = KindSummary::new(kind);
    summary.objects = objects.len();

    for group in group_by_script(&objects) {
        if group.len() > 1 {
            warn!(
                "{} {}s named {} share one script; writing them together",
                group.len(),
                kind,
                group[0].full_name()
            );
        }

        let path = save_objects(database_root, &group)?;
        summary.scripts += 1;

        match fragment.register(registered, &path.relative, kind)? {
            Registration::Announced => {
                summary.announced += 1;
                debug!("Wrote {} (new)", path.relative);
            }
            Registration::AlreadyRegistered => {
                summary.already_registered += 1;
                debug!("Wrote {}", path.relative);
            }
            // Paths are unique per kind after grouping, so this only happens
            // when one fragment is shared across repeated calls.
            Registration::AlreadyAnnounced => {
                warn!("{} is already in the index fragment; not announced again", path.relative);
            }
        }
    }

    info!(
        "{}: {} objects, {} scripts, {} new",
        kind.section_label(),
        summary.objects,
        summary.scripts,
        summary.announced
    );

    Ok(summary)
}

/// Group objects by their relative script path, keeping first-seen order.
fn group_by_script(objects: &[ExtractedObject]) -> Vec<Vec<&ExtractedObject>> {
    let mut groups: Vec<Vec<&ExtractedObject>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for object in objects {
        let key = relative_path(object.schema(), &object.subpath(), object.name());
        match index.get(&key) {
            Some(&i) => groups[i].push(object),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![object]);
            }
        }
    }

    groups
}

/// Check that the database is reachable.
pub async fn health_check(config: &DatabaseConfig) -> HealthCheckResult {
    let timer = Instant::now();
    let outcome = match PgCatalog::connect(config).await {
        Ok(catalog) => catalog.test_connection().await,
        Err(e) => Err(e),
    };
    let latency_ms = timer.elapsed().as_millis() as u64;

    match outcome {
        Ok(()) => HealthCheckResult {
            connected: true,
            latency_ms,
            error: None,
        },
        Err(e) => HealthCheckResult {
            connected: false,
            latency_ms,
            error: Some(e.to_string()),
        },
    }
}
