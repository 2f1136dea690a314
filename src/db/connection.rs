use crate::config::DatabaseConfig;
use duckdb::{Connection, Result as DbResult};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

pub type DbPool = Arc<Mutex<Connection>>;

pub const SCHEMA: &str = r#"
CREATE SEQUENCE IF NOT EXISTS seq_presets_id;

CREATE TABLE IF NOT EXISTS presets (
    id BIGINT PRIMARY KEY DEFAULT nextval('seq_presets_id'),
    name VARCHAR NOT NULL,
    model VARCHAR NOT NULL,
    temperature DOUBLE NOT NULL,
    max_tokens BIGINT NOT NULL,
    top_p DOUBLE NOT NULL,
    presence_penalty DOUBLE NOT NULL,
    frequency_penalty DOUBLE NOT NULL,
    n BIGINT NOT NULL,
    system_message TEXT NOT NULL
);
"#;

pub fn get_connection(config: &DatabaseConfig) -> DbResult<DbPool> {
    info!("Connecting to DuckDB at {}", config.path);
    let conn = if config.path == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(&config.path)?
    };

    init_schema(&conn)?;

    Ok(Arc::new(Mutex::new(conn)))
}

pub fn init_schema(conn: &Connection) -> DbResult<()> {
    info!("Initializing presets schema");
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Locks the shared connection. A panic in another handler must not take the
/// store down with it, so poisoning is ignored.
pub fn lock(pool: &DbPool) -> MutexGuard<'_, Connection> {
    pool.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
