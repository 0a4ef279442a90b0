//! AnalyticsStore trait definition.

use super::models::{
    ArtistRow, SongMatch, SongRow, SongplayCandidate, SongplayRow, StoreStats, TimeRow, UserRow,
};
use anyhow::Result;

/// Trait for analytics storage backends.
///
/// Write operations between `begin_unit` and `commit_unit` form one unit of
/// work; the batch driver opens one unit per source file.
pub trait AnalyticsStore: Send + Sync {
    /// Open a per-file unit of work. Units do not nest.
    fn begin_unit(&self) -> Result<()>;

    /// Commit the current unit of work.
    fn commit_unit(&self) -> Result<()>;

    /// Abandon the current unit of work.
    fn rollback_unit(&self) -> Result<()>;

    /// Insert or overwrite a song by `song_id`.
    fn upsert_song(&self, row: &SongRow) -> Result<()>;

    /// Insert or overwrite an artist by `artist_id`.
    fn upsert_artist(&self, row: &ArtistRow) -> Result<()>;

    /// Insert or overwrite time rows by `start_time`.
    fn upsert_times(&self, rows: &[TimeRow]) -> Result<()>;

    /// Insert or refresh users by `user_id`, so `level` always reflects the
    /// most recently processed record.
    fn upsert_users(&self, rows: &[UserRow]) -> Result<()>;

    /// Exact-match catalog lookup on (song title, artist name, duration).
    /// Zero or ambiguous matches resolve to `None`.
    fn match_song(&self, title: &str, artist: &str, duration: f64) -> Result<Option<SongMatch>>;

    /// Append one songplay fact row, with the resolved catalog ids or both
    /// nulls. Fact rows are never deduplicated.
    fn insert_songplay(
        &self,
        candidate: &SongplayCandidate,
        matched: Option<&SongMatch>,
    ) -> Result<()>;

    /// Get a song by id.
    fn get_song(&self, song_id: &str) -> Result<Option<SongRow>>;

    /// Get a user by id.
    fn get_user(&self, user_id: &str) -> Result<Option<UserRow>>;

    /// All songplay fact rows, in insertion order.
    fn list_songplays(&self) -> Result<Vec<SongplayRow>>;

    /// Row counts across all five relations.
    fn stats(&self) -> Result<StoreStats>;
}
