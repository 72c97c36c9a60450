use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_documents_table(conn)?;
    create_collection_index(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the documents table holding every collection as JSON bodies
fn create_documents_table(conn: &Connection) -> Result<(), String> {
    info!("Creating documents table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_collection_index(conn: &Connection) -> Result<(), String> {
    info!("Creating index on collection");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_collection
        ON documents (collection)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}
