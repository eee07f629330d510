//! PostgreSQL catalog access.

use crate::config::DatabaseConfig;
use crate::error::{ExportError, Result};
use crate::source::{catalog_query, CatalogSource, ExtractedObject, ObjectKind, SslMode, TlsBuilder};
use async_trait::async_trait;
use tokio_postgres::{Client, Config as PgConfig, NoTls, Row};
use tracing::{debug, error, info};

/// Catalog reader over a single PostgreSQL session.
pub struct PgCatalog {
    client: Client,
}

impl PgCatalog {
    /// Open a session to the configured database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(config.port);
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        pg_config.application_name("pg-script-export");

        let context = format!(
            "connecting to {}:{}/{}",
            config.host, config.port, config.database
        );
        let ssl_mode = SslMode::parse(&config.ssl_mode)?;

        // The connection future drives the socket and must run on its own task.
        let client = match TlsBuilder::new(ssl_mode).build()? {
            None => {
                let (client, connection) = pg_config
                    .connect(NoTls)
                    .await
                    .map_err(|e| ExportError::connection(e, context.clone()))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        error!("PostgreSQL connection error: {}", e);
                    }
                });
                client
            }
            Some(tls) => {
                let (client, connection) = pg_config
                    .connect(tls)
                    .await
                    .map_err(|e| ExportError::connection(e, context.clone()))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        error!("PostgreSQL connection error: {}", e);
                    }
                });
                client
            }
        };

        info!(
            "Connected to PostgreSQL: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self { client })
    }

    /// Test the connection.
    pub async fn test_connection(&self) -> Result<()> {
        self.client.simple_query("SELECT 1").await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for PgCatalog {
    async fn fetch_objects(&self, kind: ObjectKind) -> Result<Vec<ExtractedObject>> {
        let rows = self.client.query(catalog_query(kind).as_str(), &[]).await?;
        debug!("Catalog returned {} {} rows", rows.len(), kind);

        rows.iter().map(|row| object_from_row(kind, row)).collect()
    }
}

fn object_from_row(kind: ObjectKind, row: &Row) -> Result<ExtractedObject> {
    let schema: String = row.try_get("schemaname")?;
    let name: String = row.try_get("name")?;
    let body: String = row.try_get("body")?;

    let object = match kind {
        ObjectKind::Enum => ExtractedObject::Enum {
            schema,
            name,
            labels: body,
        },
        ObjectKind::Function => ExtractedObject::Function {
            schema,
            name,
            definition: body,
        },
        ObjectKind::View => ExtractedObject::View {
            schema,
            name,
            query: body,
        },
        ObjectKind::Trigger => ExtractedObject::Trigger {
            schema,
            name,
            definition: body,
            table: row.try_get("table_name")?,
        },
    };

    Ok(object)
}
