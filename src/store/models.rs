//! Row models for the five analytics relations.

/// One row of the `songs` dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: Option<i64>,
    pub duration: f64,
}

/// One row of the `artists` dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One row of the `time` dimension, keyed by the epoch-millis timestamp it
/// was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRow {
    pub start_time: i64,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

/// One row of the `users` dimension. `level` is the only field expected to
/// change between records for the same user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub level: String,
}

/// A songplay awaiting its catalog lookup. Carries the raw title, artist
/// name and duration the lookup joins on; id resolution happens at load
/// time because it needs a store round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct SongplayCandidate {
    /// Position of the record within its source file, pre-filter.
    pub songplay_id: i64,
    pub start_time: i64,
    pub user_id: String,
    pub level: String,
    pub song_title: String,
    pub artist_name: String,
    pub duration: f64,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

/// A stored songplay fact row.
#[derive(Debug, Clone, PartialEq)]
pub struct SongplayRow {
    pub songplay_id: i64,
    pub start_time: i64,
    pub user_id: String,
    pub level: String,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

/// Resolved catalog ids for one songplay candidate. Always both or neither.
#[derive(Debug, Clone, PartialEq)]
pub struct SongMatch {
    pub song_id: String,
    pub artist_id: String,
}

/// Row counts across all five relations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStats {
    pub songs: usize,
    pub artists: usize,
    pub users: usize,
    pub time: usize,
    pub songplays: usize,
}
