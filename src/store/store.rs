//! SQLite-backed analytics store implementation.

use super::models::{
    ArtistRow, SongMatch, SongRow, SongplayCandidate, SongplayRow, StoreStats, TimeRow, UserRow,
};
use super::schema::VERSIONED_SCHEMAS;
use super::trait_def::AnalyticsStore;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const BASE_DB_VERSION: i32 = 73;
const CURRENT_DB_VERSION: i32 = 0;

/// SQLite-backed analytics store. Holds the one long-lived connection for
/// the whole run.
pub struct SqliteAnalyticsStore {
    conn: Mutex<Connection>,
}

impl SqliteAnalyticsStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            let conn = Connection::open(db_path)?;
            Self::create_schema(&conn)?;
            conn
        };

        let version: i32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .context("Failed to read database version")?;

        match version - BASE_DB_VERSION {
            0 => Self::validate_schema_0(&conn)?,
            _ => bail!("Unknown database version {}", version),
        }

        Ok(SqliteAnalyticsStore {
            conn: Mutex::new(conn),
        })
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        for schema in VERSIONED_SCHEMAS {
            for table in schema.tables {
                conn.execute(table.schema, [])?;
                for index in table.indices {
                    conn.execute(index, [])?;
                }
            }
        }
        conn.execute(
            &format!(
                "PRAGMA user_version = {}",
                BASE_DB_VERSION + CURRENT_DB_VERSION
            ),
            [],
        )?;

        Ok(())
    }

    fn validate_schema_0(conn: &Connection) -> Result<()> {
        for table in VERSIONED_SCHEMAS[0].tables {
            let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table.name))?;
            let columns: Vec<String> = stmt
                .query_map([], |row| row.get(1))?
                .collect::<Result<_, _>>()?;

            if columns.is_empty() {
                bail!("Schema validation failed: missing table {}", table.name);
            }
        }

        Ok(())
    }

    fn count_rows(conn: &Connection) -> Result<StoreStats> {
        let songs: usize = conn.query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))?;
        let artists: usize = conn.query_row("SELECT COUNT(*) FROM artists", [], |r| r.get(0))?;
        let users: usize = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
        let time: usize = conn.query_row("SELECT COUNT(*) FROM time", [], |r| r.get(0))?;
        let songplays: usize =
            conn.query_row("SELECT COUNT(*) FROM songplays", [], |r| r.get(0))?;
        Ok(StoreStats {
            songs,
            artists,
            users,
            time,
            songplays,
        })
    }
}

impl AnalyticsStore for SqliteAnalyticsStore {
    fn begin_unit(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("BEGIN IMMEDIATE;")
            .context("Failed to open unit of work")
    }

    fn commit_unit(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("COMMIT;")
            .context("Failed to commit unit of work")
    }

    fn rollback_unit(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("ROLLBACK;")
            .context("Failed to roll back unit of work")
    }

    fn upsert_song(&self, row: &SongRow) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "INSERT OR REPLACE INTO songs (song_id, title, artist_id, year, duration)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        stmt.execute(params![
            row.song_id,
            row.title,
            row.artist_id,
            row.year,
            row.duration,
        ])?;
        Ok(())
    }

    fn upsert_artist(&self, row: &ArtistRow) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "INSERT OR REPLACE INTO artists (artist_id, name, location, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        stmt.execute(params![
            row.artist_id,
            row.name,
            row.location,
            row.latitude,
            row.longitude,
        ])?;
        Ok(())
    }

    fn upsert_times(&self, rows: &[TimeRow]) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "INSERT OR REPLACE INTO time (start_time, hour, day, week, month, year, weekday)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for row in rows {
            stmt.execute(params![
                row.start_time,
                row.hour,
                row.day,
                row.week,
                row.month,
                row.year,
                row.weekday,
            ])?;
        }
        Ok(())
    }

    fn upsert_users(&self, rows: &[UserRow]) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO users (user_id, first_name, last_name, gender, level)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
               first_name = excluded.first_name,
               last_name = excluded.last_name,
               gender = excluded.gender,
               level = excluded.level",
        )?;
        for row in rows {
            stmt.execute(params![
                row.user_id,
                row.first_name,
                row.last_name,
                row.gender,
                row.level,
            ])?;
        }
        Ok(())
    }

    fn match_song(&self, title: &str, artist: &str, duration: f64) -> Result<Option<SongMatch>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT s.song_id, a.artist_id
             FROM songs s
             JOIN artists a ON s.artist_id = a.artist_id
             WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3
             LIMIT 2",
        )?;
        let mut rows = stmt.query(params![title, artist, duration])?;

        let first = match rows.next()? {
            Some(row) => SongMatch {
                song_id: row.get(0)?,
                artist_id: row.get(1)?,
            },
            None => return Ok(None),
        };
        // More than one hit means the lookup is ambiguous.
        if rows.next()?.is_some() {
            return Ok(None);
        }

        Ok(Some(first))
    }

    fn insert_songplay(
        &self,
        candidate: &SongplayCandidate,
        matched: Option<&SongMatch>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO songplays (songplay_id, start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        stmt.execute(params![
            candidate.songplay_id,
            candidate.start_time,
            candidate.user_id,
            candidate.level,
            matched.map(|m| m.song_id.as_str()),
            matched.map(|m| m.artist_id.as_str()),
            candidate.session_id,
            candidate.location,
            candidate.user_agent,
        ])?;
        Ok(())
    }

    fn get_song(&self, song_id: &str) -> Result<Option<SongRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT song_id, title, artist_id, year, duration FROM songs WHERE song_id = ?1",
        )?;
        let result = stmt
            .query_row(params![song_id], |row| {
                Ok(SongRow {
                    song_id: row.get(0)?,
                    title: row.get(1)?,
                    artist_id: row.get(2)?,
                    year: row.get(3)?,
                    duration: row.get(4)?,
                })
            })
            .optional()?;
        Ok(result)
    }

    fn get_user(&self, user_id: &str) -> Result<Option<UserRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT user_id, first_name, last_name, gender, level FROM users WHERE user_id = ?1",
        )?;
        let result = stmt
            .query_row(params![user_id], |row| {
                Ok(UserRow {
                    user_id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    gender: row.get(3)?,
                    level: row.get(4)?,
                })
            })
            .optional()?;
        Ok(result)
    }

    fn list_songplays(&self) -> Result<Vec<SongplayRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT songplay_id, start_time, user_id, level, song_id, artist_id, session_id, location, user_agent
             FROM songplays ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SongplayRow {
                    songplay_id: row.get(0)?,
                    start_time: row.get(1)?,
                    user_id: row.get(2)?,
                    level: row.get(3)?,
                    song_id: row.get(4)?,
                    artist_id: row.get(5)?,
                    session_id: row.get(6)?,
                    location: row.get(7)?,
                    user_agent: row.get(8)?,
                })
            })?
            .collect::<Result<_, _>>()?;
        Ok(rows)
    }

    fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().unwrap();
        Self::count_rows(&conn)
    }
}
