use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (user, post)");
        conn.execute_batch(
            "
            CREATE TABLE user (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT UNIQUE NOT NULL,
                password    TEXT NOT NULL
            );

            CREATE TABLE post (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id   INTEGER NOT NULL,
                created     TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                title       TEXT NOT NULL,
                body        TEXT NOT NULL,
                FOREIGN KEY (author_id) REFERENCES user (id)
            );

            CREATE INDEX idx_post_created ON post(created);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
