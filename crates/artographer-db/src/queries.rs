use crate::models::{
    LogRow, NewPinnedArtwork, NewUserImage, PinnedArtworkPatch, PinnedArtworkRow, UserImagePatch,
    UserImageRow, UserRow, UserStatsRow, parse_id_array,
};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, Row};
use serde_json::Value;

const USER_COLUMNS: &str = "id, user_image_ids, pinned_artwork_ids, created_at, updated_at";

const IMAGE_COLUMNS: &str = "userimage_id, user_id, title, image_url, coordinates, region, \
     confidence, anchors, created_at, updated_at";

const PIN_COLUMNS: &str = "entry_id, user_id, title, artwork_details, location, tags, \
     is_favorite, is_visited, priority, created_at, updated_at";

const LOG_COLUMNS: &str = "id, user_id, timestamp, message, event_data, created_at";

/// The two denormalized id arrays kept on each `users` row.
#[derive(Debug, Clone, Copy)]
enum IdArray {
    Images,
    Pins,
}

impl IdArray {
    fn column(self) -> &'static str {
        match self {
            IdArray::Images => "user_image_ids",
            IdArray::Pins => "pinned_artwork_ids",
        }
    }
}

impl Database {
    // -- Users --

    /// Creates the user if missing. Returns true when a row was inserted.
    pub fn ensure_user(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| ensure_user(conn, id))
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"
            ))?;
            let rows = stmt
                .query_map([], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Deletes the user; images, pins and logs go with it via ON DELETE CASCADE.
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    /// Rebuilds both id arrays from the detail tables.
    pub fn resync_user_arrays(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            if query_user(&tx, id)?.is_none() {
                return Ok(None);
            }

            let image_ids = query_ids(
                &tx,
                "SELECT userimage_id FROM user_images WHERE user_id = ?1 ORDER BY created_at, userimage_id",
                id,
            )?;
            let pin_ids = query_ids(
                &tx,
                "SELECT entry_id FROM pinned_artworks WHERE user_id = ?1 ORDER BY created_at, entry_id",
                id,
            )?;
            write_ids(&tx, id, IdArray::Images, &image_ids)?;
            write_ids(&tx, id, IdArray::Pins, &pin_ids)?;

            let user = query_user(&tx, id)?;
            tx.commit()?;
            Ok(user)
        })
    }

    // -- User images --

    /// Inserts the image and appends its id to the owner's `user_image_ids`.
    /// Returns false, writing nothing, when the image id is already taken.
    pub fn insert_user_image(&self, image: &NewUserImage) -> Result<bool> {
        let coordinates = image.coordinates.as_ref().map(Value::to_string);
        let anchors = serde_json::to_string(&image.anchors)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let taken = tx
                .query_row(
                    "SELECT 1 FROM user_images WHERE userimage_id = ?1",
                    [&image.id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if taken {
                return Ok(false);
            }

            ensure_user(&tx, &image.user_id)?;
            tx.execute(
                "INSERT INTO user_images (userimage_id, user_id, title, image_url, coordinates, region, confidence, anchors)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    image.id,
                    image.user_id,
                    image.title,
                    image.image_url,
                    coordinates,
                    image.region,
                    image.confidence,
                    anchors,
                ],
            )?;
            push_id(&tx, &image.user_id, IdArray::Images, &image.id)?;
            tx.commit()?;
            Ok(true)
        })
    }

    pub fn get_user_image(&self, user_id: &str, image_id: &str) -> Result<Option<UserImageRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT {IMAGE_COLUMNS} FROM user_images WHERE userimage_id = ?1 AND user_id = ?2"
                    ),
                    [image_id, user_id],
                    map_image,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_user_images(&self, user_id: &str) -> Result<Vec<UserImageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {IMAGE_COLUMNS} FROM user_images WHERE user_id = ?1 ORDER BY created_at, userimage_id"
            ))?;
            let rows = stmt
                .query_map([user_id], map_image)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Applies a partial update. Returns false if the image does not exist
    /// for this user.
    pub fn update_user_image(
        &self,
        user_id: &str,
        image_id: &str,
        patch: &UserImagePatch,
    ) -> Result<bool> {
        let coordinates = patch.coordinates.as_ref().map(Value::to_string);
        let anchors = patch.anchors.as_ref().map(serde_json::to_string).transpose()?;

        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE user_images SET
                    title = COALESCE(?3, title),
                    image_url = COALESCE(?4, image_url),
                    coordinates = COALESCE(?5, coordinates),
                    region = COALESCE(?6, region),
                    confidence = COALESCE(?7, confidence),
                    anchors = COALESCE(?8, anchors),
                    updated_at = datetime('now')
                 WHERE userimage_id = ?1 AND user_id = ?2",
                rusqlite::params![
                    image_id,
                    user_id,
                    patch.title,
                    patch.image_url,
                    coordinates,
                    patch.region,
                    patch.confidence,
                    anchors,
                ],
            )?;
            Ok(updated > 0)
        })
    }

    /// Deletes the image and drops its id from `user_image_ids`.
    pub fn delete_user_image(&self, user_id: &str, image_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let deleted = tx.execute(
                "DELETE FROM user_images WHERE userimage_id = ?1 AND user_id = ?2",
                [image_id, user_id],
            )?;
            if deleted == 0 {
                return Ok(false);
            }
            remove_id(&tx, user_id, IdArray::Images, image_id)?;
            tx.commit()?;
            Ok(true)
        })
    }

    // -- Pinned artworks --

    /// Inserts the pin and appends the entry id to `pinned_artwork_ids`.
    /// Returns false when the user already pinned this entry.
    pub fn insert_pinned_artwork(&self, pin: &NewPinnedArtwork) -> Result<bool> {
        let details = pin.artwork_details.as_ref().map(Value::to_string);
        let location = pin.location.as_ref().map(Value::to_string);
        let tags = pin.tags.as_ref().map(Value::to_string);

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            ensure_user(&tx, &pin.user_id)?;

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO pinned_artworks
                    (entry_id, user_id, title, artwork_details, location, tags, is_favorite, is_visited, priority)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    pin.entry_id,
                    pin.user_id,
                    pin.title,
                    details,
                    location,
                    tags,
                    pin.is_favorite,
                    pin.is_visited,
                    pin.priority,
                ],
            )?;
            if inserted == 0 {
                return Ok(false);
            }

            push_id(&tx, &pin.user_id, IdArray::Pins, &pin.entry_id)?;
            tx.commit()?;
            Ok(true)
        })
    }

    pub fn get_pinned_artwork(&self, user_id: &str, entry_id: &str) -> Result<Option<PinnedArtworkRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {PIN_COLUMNS} FROM pinned_artworks WHERE user_id = ?1 AND entry_id = ?2"),
                    [user_id, entry_id],
                    map_pin,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Highest priority first, then oldest pin first.
    pub fn list_pinned_artworks(&self, user_id: &str) -> Result<Vec<PinnedArtworkRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PIN_COLUMNS} FROM pinned_artworks WHERE user_id = ?1
                 ORDER BY priority DESC, created_at, entry_id"
            ))?;
            let rows = stmt
                .query_map([user_id], map_pin)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_pinned_artwork(
        &self,
        user_id: &str,
        entry_id: &str,
        patch: &PinnedArtworkPatch,
    ) -> Result<bool> {
        let details = patch.artwork_details.as_ref().map(Value::to_string);
        let location = patch.location.as_ref().map(Value::to_string);
        let tags = patch.tags.as_ref().map(Value::to_string);

        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE pinned_artworks SET
                    title = COALESCE(?3, title),
                    artwork_details = COALESCE(?4, artwork_details),
                    location = COALESCE(?5, location),
                    tags = COALESCE(?6, tags),
                    is_favorite = COALESCE(?7, is_favorite),
                    is_visited = COALESCE(?8, is_visited),
                    priority = COALESCE(?9, priority),
                    updated_at = datetime('now')
                 WHERE user_id = ?1 AND entry_id = ?2",
                rusqlite::params![
                    user_id,
                    entry_id,
                    patch.title,
                    details,
                    location,
                    tags,
                    patch.is_favorite,
                    patch.is_visited,
                    patch.priority,
                ],
            )?;
            Ok(updated > 0)
        })
    }

    pub fn delete_pinned_artwork(&self, user_id: &str, entry_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let deleted = tx.execute(
                "DELETE FROM pinned_artworks WHERE user_id = ?1 AND entry_id = ?2",
                [user_id, entry_id],
            )?;
            if deleted == 0 {
                return Ok(false);
            }
            remove_id(&tx, user_id, IdArray::Pins, entry_id)?;
            tx.commit()?;
            Ok(true)
        })
    }

    // -- Logs --

    /// Appends one event and returns its row id.
    pub fn insert_log(
        &self,
        user_id: &str,
        timestamp: &str,
        message: &str,
        event_data: &Value,
    ) -> Result<i64> {
        let event_data = event_data.to_string();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            ensure_user(&tx, user_id)?;
            tx.execute(
                "INSERT INTO user_logs (user_id, timestamp, message, event_data) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![user_id, timestamp, message, event_data],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(id)
        })
    }

    /// All logs for a user in event order.
    pub fn get_user_logs(&self, user_id: &str) -> Result<Vec<LogRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LOG_COLUMNS} FROM user_logs WHERE user_id = ?1 ORDER BY timestamp ASC, id ASC"
            ))?;
            let rows = stmt
                .query_map([user_id], map_log)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Most recently stored logs across all users, newest first.
    pub fn recent_logs(&self, limit: u32) -> Result<Vec<LogRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LOG_COLUMNS} FROM user_logs ORDER BY id DESC LIMIT ?1"
            ))?;
            let rows = stmt
                .query_map([limit], map_log)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Dashboard --

    pub fn dashboard_stats(&self) -> Result<Vec<UserStatsRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id,
                    (SELECT COUNT(*) FROM user_images i WHERE i.user_id = u.id),
                    (SELECT COUNT(*) FROM pinned_artworks p WHERE p.user_id = u.id),
                    (SELECT COUNT(*) FROM user_logs l WHERE l.user_id = u.id),
                    (SELECT MAX(l.timestamp) FROM user_logs l WHERE l.user_id = u.id)
                 FROM users u
                 ORDER BY u.id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(UserStatsRow {
                        user_id: row.get(0)?,
                        image_count: row.get(1)?,
                        pin_count: row.get(2)?,
                        log_count: row.get(3)?,
                        last_log_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn ensure_user(conn: &Connection, id: &str) -> Result<bool> {
    let inserted = conn.execute("INSERT OR IGNORE INTO users (id) VALUES (?1)", [id])?;
    Ok(inserted > 0)
}

fn query_user(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            [id],
            map_user,
        )
        .optional()?;
    Ok(row)
}

fn query_ids(conn: &Connection, sql: &str, user_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let ids = stmt
        .query_map([user_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(ids)
}

fn read_ids(conn: &Connection, user_id: &str, array: IdArray) -> Result<Vec<String>> {
    let raw: Option<String> = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", array.column()),
            [user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw.map(|raw| parse_id_array(&raw, user_id)).unwrap_or_default())
}

fn write_ids(conn: &Connection, user_id: &str, array: IdArray, ids: &[String]) -> Result<()> {
    conn.execute(
        &format!(
            "UPDATE users SET {} = ?2, updated_at = datetime('now') WHERE id = ?1",
            array.column()
        ),
        rusqlite::params![user_id, serde_json::to_string(ids)?],
    )?;
    Ok(())
}

fn push_id(conn: &Connection, user_id: &str, array: IdArray, id: &str) -> Result<()> {
    let mut ids = read_ids(conn, user_id, array)?;
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
        write_ids(conn, user_id, array, &ids)?;
    }
    Ok(())
}

fn remove_id(conn: &Connection, user_id: &str, array: IdArray, id: &str) -> Result<()> {
    let mut ids = read_ids(conn, user_id, array)?;
    let before = ids.len();
    ids.retain(|existing| existing != id);
    if ids.len() != before {
        write_ids(conn, user_id, array, &ids)?;
    }
    Ok(())
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        user_image_ids: row.get(1)?,
        pinned_artwork_ids: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn map_image(row: &Row<'_>) -> rusqlite::Result<UserImageRow> {
    Ok(UserImageRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        image_url: row.get(3)?,
        coordinates: row.get(4)?,
        region: row.get(5)?,
        confidence: row.get(6)?,
        anchors: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn map_pin(row: &Row<'_>) -> rusqlite::Result<PinnedArtworkRow> {
    Ok(PinnedArtworkRow {
        entry_id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        artwork_details: row.get(3)?,
        location: row.get(4)?,
        tags: row.get(5)?,
        is_favorite: row.get(6)?,
        is_visited: row.get(7)?,
        priority: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn map_log(row: &Row<'_>) -> rusqlite::Result<LogRow> {
    Ok(LogRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        timestamp: row.get(2)?,
        message: row.get(3)?,
        event_data: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn image(user_id: &str, id: &str) -> NewUserImage {
        NewUserImage {
            user_id: user_id.into(),
            id: id.into(),
            title: Some("Mural".into()),
            image_url: format!("https://img.example/{id}.jpg"),
            coordinates: Some(json!({"x": 1.5, "y": 0.0, "z": -2.25})),
            region: Some("north-wing".into()),
            confidence: Some(0.82),
            anchors: vec![json!({"id": "a1"})],
        }
    }

    fn pin(user_id: &str, entry_id: &str, priority: i64) -> NewPinnedArtwork {
        NewPinnedArtwork {
            user_id: user_id.into(),
            entry_id: entry_id.into(),
            title: Some("Water Lilies".into()),
            artwork_details: Some(json!({"artist": "Monet"})),
            location: None,
            tags: Some(json!(["impressionism"])),
            is_favorite: false,
            is_visited: false,
            priority,
        }
    }

    fn image_ids(db: &Database, user_id: &str) -> Vec<String> {
        parse_id_array(&db.get_user(user_id).unwrap().unwrap().user_image_ids, user_id)
    }

    fn pin_ids(db: &Database, user_id: &str) -> Vec<String> {
        parse_id_array(&db.get_user(user_id).unwrap().unwrap().pinned_artwork_ids, user_id)
    }

    #[test]
    fn ensure_user_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.ensure_user("P1").unwrap());
        assert!(!db.ensure_user("P1").unwrap());

        let user = db.get_user("P1").unwrap().unwrap();
        assert_eq!(user.user_image_ids, "[]");
        assert_eq!(user.pinned_artwork_ids, "[]");
        assert_eq!(db.list_users().unwrap().len(), 1);
    }

    #[test]
    fn image_insert_and_delete_mirror_the_id_array() {
        let db = Database::open_in_memory().unwrap();

        assert!(db.insert_user_image(&image("P1", "img-1")).unwrap());
        assert!(db.insert_user_image(&image("P1", "img-2")).unwrap());
        assert_eq!(image_ids(&db, "P1"), vec!["img-1", "img-2"]);

        assert!(db.delete_user_image("P1", "img-1").unwrap());
        assert_eq!(image_ids(&db, "P1"), vec!["img-2"]);
        assert!(!db.delete_user_image("P1", "img-1").unwrap());
    }

    #[test]
    fn duplicate_image_id_is_rejected_without_writes() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.insert_user_image(&image("P1", "img-1")).unwrap());
        assert!(!db.insert_user_image(&image("P2", "img-1")).unwrap());

        assert!(db.get_user("P2").unwrap().is_none());
        assert_eq!(image_ids(&db, "P1"), vec!["img-1"]);
    }

    #[test]
    fn image_patch_keeps_absent_fields() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user_image(&image("P1", "img-1")).unwrap();

        let patch = UserImagePatch {
            title: Some("Fresco".into()),
            confidence: Some(0.4),
            ..Default::default()
        };
        assert!(db.update_user_image("P1", "img-1", &patch).unwrap());
        assert!(!db.update_user_image("P2", "img-1", &patch).unwrap());

        let row = db.get_user_image("P1", "img-1").unwrap().unwrap();
        assert_eq!(row.title.as_deref(), Some("Fresco"));
        assert_eq!(row.confidence, Some(0.4));
        assert_eq!(row.region.as_deref(), Some("north-wing"));
        assert_eq!(row.image_url, "https://img.example/img-1.jpg");
    }

    #[test]
    fn images_are_scoped_to_their_owner() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user_image(&image("P1", "img-1")).unwrap();

        assert!(db.get_user_image("P2", "img-1").unwrap().is_none());
        assert!(!db.delete_user_image("P2", "img-1").unwrap());
        assert_eq!(db.list_user_images("P1").unwrap().len(), 1);
    }

    #[test]
    fn pins_mirror_and_sort_by_priority() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.insert_pinned_artwork(&pin("P1", "entry-a", 1)).unwrap());
        assert!(db.insert_pinned_artwork(&pin("P1", "entry-b", 5)).unwrap());
        assert!(!db.insert_pinned_artwork(&pin("P1", "entry-a", 9)).unwrap());
        // Another user may pin the same entry
        assert!(db.insert_pinned_artwork(&pin("P2", "entry-a", 0)).unwrap());

        assert_eq!(pin_ids(&db, "P1"), vec!["entry-a", "entry-b"]);
        let order: Vec<String> = db
            .list_pinned_artworks("P1")
            .unwrap()
            .into_iter()
            .map(|p| p.entry_id)
            .collect();
        assert_eq!(order, vec!["entry-b", "entry-a"]);

        let patch = PinnedArtworkPatch {
            is_visited: Some(true),
            ..Default::default()
        };
        assert!(db.update_pinned_artwork("P1", "entry-a", &patch).unwrap());
        let row = db.get_pinned_artwork("P1", "entry-a").unwrap().unwrap();
        assert!(row.is_visited);
        assert!(!row.is_favorite);
        assert_eq!(row.priority, 1);

        assert!(db.delete_pinned_artwork("P1", "entry-a").unwrap());
        assert_eq!(pin_ids(&db, "P1"), vec!["entry-b"]);
        assert_eq!(pin_ids(&db, "P2"), vec!["entry-a"]);
    }

    #[test]
    fn logs_are_ordered_by_timestamp() {
        let db = Database::open_in_memory().unwrap();
        db.insert_log("P1", "2025-03-01T10:00:05Z", "second", &json!({"system": "A"}))
            .unwrap();
        let first = db
            .insert_log("P1", "2025-03-01T10:00:01Z", "first", &json!({"system": "A"}))
            .unwrap();
        db.insert_log("P2", "2025-03-01T09:00:00Z", "other", &json!({})).unwrap();

        let logs = db.get_user_logs("P1").unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].id, first);
        assert_eq!(logs[0].message, "first");

        let recent = db.recent_logs(2).unwrap();
        assert_eq!(recent[0].message, "other");
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn deleting_a_user_cascades() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user_image(&image("P1", "img-1")).unwrap();
        db.insert_pinned_artwork(&pin("P1", "entry-a", 0)).unwrap();
        db.insert_log("P1", "2025-03-01T10:00:00Z", "tap", &json!({})).unwrap();

        assert!(db.delete_user("P1").unwrap());
        assert!(!db.delete_user("P1").unwrap());
        assert!(db.list_user_images("P1").unwrap().is_empty());
        assert!(db.list_pinned_artworks("P1").unwrap().is_empty());
        assert!(db.get_user_logs("P1").unwrap().is_empty());
    }

    #[test]
    fn resync_repairs_drifted_arrays() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user_image(&image("P1", "img-1")).unwrap();
        db.insert_pinned_artwork(&pin("P1", "entry-a", 0)).unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET user_image_ids = '[\"ghost\"]', pinned_artwork_ids = 'garbage' WHERE id = 'P1'",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let user = db.resync_user_arrays("P1").unwrap().unwrap();
        assert_eq!(parse_id_array(&user.user_image_ids, "P1"), vec!["img-1"]);
        assert_eq!(parse_id_array(&user.pinned_artwork_ids, "P1"), vec!["entry-a"]);
        assert!(db.resync_user_arrays("nobody").unwrap().is_none());
    }

    #[test]
    fn dashboard_stats_count_per_user() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user_image(&image("P1", "img-1")).unwrap();
        db.insert_pinned_artwork(&pin("P1", "entry-a", 0)).unwrap();
        db.insert_pinned_artwork(&pin("P1", "entry-b", 0)).unwrap();
        db.insert_log("P1", "2025-03-01T10:00:00Z", "tap", &json!({})).unwrap();
        db.insert_log("P1", "2025-03-01T11:00:00Z", "tap", &json!({})).unwrap();
        db.ensure_user("P2").unwrap();

        let stats = db.dashboard_stats().unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].user_id, "P1");
        assert_eq!((stats[0].image_count, stats[0].pin_count, stats[0].log_count), (1, 2, 2));
        assert_eq!(stats[0].last_log_at.as_deref(), Some("2025-03-01T11:00:00Z"));
        assert_eq!(stats[1].log_count, 0);
        assert!(stats[1].last_log_at.is_none());
    }
}
