//! SQLite schema for the analytics database.

pub struct Table {
    pub name: &'static str,
    pub schema: &'static str,
    pub indices: &'static [&'static str],
}

const SONGS_TABLE_V_0: Table = Table {
    name: "songs",
    schema: "CREATE TABLE songs (song_id TEXT NOT NULL UNIQUE, title TEXT NOT NULL, artist_id TEXT NOT NULL, year INTEGER, duration REAL NOT NULL, PRIMARY KEY (song_id));",
    indices: &["CREATE INDEX songs_title_index ON songs (title);"],
};
const ARTISTS_TABLE_V_0: Table = Table {
    name: "artists",
    schema: "CREATE TABLE artists (artist_id TEXT NOT NULL UNIQUE, name TEXT NOT NULL, location TEXT, latitude REAL, longitude REAL, PRIMARY KEY (artist_id));",
    indices: &[],
};
const USERS_TABLE_V_0: Table = Table {
    name: "users",
    schema: "CREATE TABLE users (user_id TEXT NOT NULL UNIQUE, first_name TEXT NOT NULL, last_name TEXT NOT NULL, gender TEXT NOT NULL, level TEXT NOT NULL, PRIMARY KEY (user_id));",
    indices: &[],
};
const TIME_TABLE_V_0: Table = Table {
    name: "time",
    schema: "CREATE TABLE time (start_time INTEGER NOT NULL UNIQUE, hour INTEGER NOT NULL, day INTEGER NOT NULL, week INTEGER NOT NULL, month INTEGER NOT NULL, year INTEGER NOT NULL, weekday INTEGER NOT NULL, PRIMARY KEY (start_time));",
    indices: &[],
};
// songplay_id restarts per source file and repeats across re-runs; the
// implicit rowid is the surrogate key.
const SONGPLAYS_TABLE_V_0: Table = Table {
    name: "songplays",
    schema: "CREATE TABLE songplays (songplay_id INTEGER NOT NULL, start_time INTEGER NOT NULL, user_id TEXT NOT NULL, level TEXT NOT NULL, song_id TEXT, artist_id TEXT, session_id INTEGER NOT NULL, location TEXT, user_agent TEXT);",
    indices: &[],
};

pub struct VersionedSchema {
    pub version: u32,
    pub tables: &'static [Table],
}

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        SONGS_TABLE_V_0,
        ARTISTS_TABLE_V_0,
        USERS_TABLE_V_0,
        TIME_TABLE_V_0,
        SONGPLAYS_TABLE_V_0,
    ],
}];
