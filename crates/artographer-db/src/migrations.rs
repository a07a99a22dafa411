use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Applies every schema version newer than the one recorded in
/// `schema_version`. Applied versions are never edited; renames and other
/// changes go in a new version, e.g.
/// `ALTER TABLE user_images RENAME COLUMN old_name TO new_name;`.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        apply(
            conn,
            "
            CREATE TABLE users (
                id                  TEXT PRIMARY KEY,
                user_image_ids      TEXT NOT NULL DEFAULT '[]',
                pinned_artwork_ids  TEXT NOT NULL DEFAULT '[]',
                created_at          TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE user_images (
                userimage_id    TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title           TEXT,
                image_url       TEXT NOT NULL,
                coordinates     TEXT,
                region          TEXT,
                confidence      REAL,
                anchors         TEXT NOT NULL DEFAULT '[]',
                created_at      TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE pinned_artworks (
                entry_id        TEXT NOT NULL,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title           TEXT,
                artwork_details TEXT,
                location        TEXT,
                tags            TEXT,
                is_favorite     INTEGER NOT NULL DEFAULT 0,
                is_visited      INTEGER NOT NULL DEFAULT 0,
                priority        INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (user_id, entry_id)
            );

            CREATE TABLE user_logs (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                timestamp   TEXT NOT NULL,
                message     TEXT NOT NULL,
                event_data  TEXT NOT NULL DEFAULT '{}',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (per-user indexes)");
        apply(
            conn,
            "
            CREATE INDEX IF NOT EXISTS idx_user_images_user
                ON user_images(user_id, created_at);

            CREATE INDEX IF NOT EXISTS idx_pinned_artworks_user
                ON pinned_artworks(user_id, priority);

            CREATE INDEX IF NOT EXISTS idx_user_logs_user_time
                ON user_logs(user_id, timestamp);

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    Ok(())
}

/// One version per transaction: a failing step leaves no partial schema
/// behind and no version row.
fn apply(conn: &Connection, sql: &str) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 2);
        assert_eq!(rows, 2);
    }

    #[test]
    fn creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            tables,
            vec!["pinned_artworks", "schema_version", "user_images", "user_logs", "users"]
        );
    }

    #[test]
    fn failed_version_rolls_back() {
        let conn = Connection::open_in_memory().unwrap();
        // Clashes with the last table v1 creates
        conn.execute_batch("CREATE TABLE user_logs (legacy TEXT);").unwrap();

        assert!(run(&conn).is_err());

        let users: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(users, 0);
        assert_eq!(versions, 0);

        conn.execute_batch("DROP TABLE user_logs;").unwrap();
        run(&conn).unwrap();
    }
}
