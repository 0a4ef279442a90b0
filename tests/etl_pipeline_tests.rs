//! End-to-end pipeline tests: real files on disk, through both batches,
//! into a real SQLite database.

use serde_json::json;
use spinlog::batch::{run_activity_batch, run_catalog_batch};
use spinlog::discover::discover;
use spinlog::store::{AnalyticsStore, SqliteAnalyticsStore};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_records(path: &Path, records: &[serde_json::Value]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let lines: Vec<String> = records.iter().map(|r| r.to_string()).collect();
    fs::write(path, lines.join("\n")).unwrap();
}

fn catalog_record() -> serde_json::Value {
    json!({
        "song_id": "S1", "title": "T", "artist_id": "A1", "year": "2000",
        "duration": 210.5, "artist_name": "AR", "artist_location": "NY",
        "artist_latitude": 40.7, "artist_longitude": -74.0
    })
}

fn play_record(user_id: i64, level: &str, song: &str) -> serde_json::Value {
    json!({
        "page": "NextSong", "ts": 1541990258796i64, "userId": user_id,
        "firstName": "Ryan", "lastName": "Smith", "gender": "M",
        "level": level, "song": song, "artist": "AR", "length": 210.5,
        "sessionId": 583, "location": "San Jose-Sunnyvale-Santa Clara, CA",
        "userAgent": "Mozilla/5.0"
    })
}

struct Fixture {
    tmp: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            tmp: TempDir::new().unwrap(),
        }
    }

    fn store(&self) -> SqliteAnalyticsStore {
        SqliteAnalyticsStore::new(self.tmp.path().join("analytics.db")).unwrap()
    }

    fn song_root(&self) -> std::path::PathBuf {
        self.tmp.path().join("song_data")
    }

    fn log_root(&self) -> std::path::PathBuf {
        self.tmp.path().join("log_data")
    }
}

#[test]
fn end_to_end_example_loads_all_five_relations() {
    let fx = Fixture::new();
    let store = fx.store();
    write_records(&fx.song_root().join("A/S1.json"), &[catalog_record()]);
    write_records(
        &fx.log_root().join("2018/11/events.json"),
        &[play_record(26, "free", "T")],
    );

    let catalog = run_catalog_batch(&store, &fx.song_root(), "*.json").unwrap();
    let activity = run_activity_batch(&store, &fx.log_root(), "*.json").unwrap();

    assert_eq!(catalog.files, 1);
    assert_eq!(activity.files, 1);

    let song = store.get_song("S1").unwrap().unwrap();
    assert_eq!(song.title, "T");
    assert_eq!(song.artist_id, "A1");
    assert_eq!(song.year, Some(2000));
    assert!((song.duration - 210.5).abs() < f64::EPSILON);

    let user = store.get_user("26").unwrap().unwrap();
    assert_eq!(user.first_name, "Ryan");
    assert_eq!(user.level, "free");

    let stats = store.stats().unwrap();
    assert_eq!(stats.songs, 1);
    assert_eq!(stats.artists, 1);
    assert_eq!(stats.users, 1);
    assert_eq!(stats.time, 1);
    assert_eq!(stats.songplays, 1);

    let plays = store.list_songplays().unwrap();
    assert_eq!(plays.len(), 1);
    assert_eq!(plays[0].song_id.as_deref(), Some("S1"));
    assert_eq!(plays[0].artist_id.as_deref(), Some("A1"));
    assert_eq!(plays[0].start_time, 1541990258796);
    assert_eq!(plays[0].session_id, 583);
}

#[test]
fn reprocessing_catalog_files_is_idempotent() {
    let fx = Fixture::new();
    let store = fx.store();
    write_records(&fx.song_root().join("S1.json"), &[catalog_record()]);

    run_catalog_batch(&store, &fx.song_root(), "*.json").unwrap();
    let first = store.get_song("S1").unwrap().unwrap();

    run_catalog_batch(&store, &fx.song_root(), "*.json").unwrap();
    let second = store.get_song("S1").unwrap().unwrap();

    assert_eq!(first, second);
    let stats = store.stats().unwrap();
    assert_eq!(stats.songs, 1);
    assert_eq!(stats.artists, 1);
}

#[test]
fn later_activity_record_overrides_user_level() {
    let fx = Fixture::new();
    let store = fx.store();
    write_records(
        &fx.log_root().join("events.json"),
        &[
            play_record(26, "free", "T"),
            play_record(26, "paid", "T"),
        ],
    );

    run_activity_batch(&store, &fx.log_root(), "*.json").unwrap();

    let user = store.get_user("26").unwrap().unwrap();
    assert_eq!(user.level, "paid");
    assert_eq!(store.stats().unwrap().users, 1);
}

#[test]
fn non_numeric_year_loads_as_null() {
    let fx = Fixture::new();
    let store = fx.store();
    let mut record = catalog_record();
    record["year"] = json!("N/A");
    write_records(&fx.song_root().join("S1.json"), &[record]);

    run_catalog_batch(&store, &fx.song_root(), "*.json").unwrap();

    let song = store.get_song("S1").unwrap().unwrap();
    assert_eq!(song.year, None);
}

#[test]
fn file_with_only_non_play_events_loads_nothing() {
    let fx = Fixture::new();
    let store = fx.store();
    write_records(
        &fx.log_root().join("events.json"),
        &[
            json!({"page": "Home", "ts": 1541990258796i64, "userId": 26}),
            json!({"page": "Logout", "ts": 1541990260000i64}),
        ],
    );

    let summary = run_activity_batch(&store, &fx.log_root(), "*.json").unwrap();

    assert_eq!(summary.files, 1);
    let stats = store.stats().unwrap();
    assert_eq!(stats.time, 0);
    assert_eq!(stats.users, 0);
    assert_eq!(stats.songplays, 0);
}

#[test]
fn unmatched_songplay_has_both_ids_null() {
    let fx = Fixture::new();
    let store = fx.store();
    write_records(&fx.song_root().join("S1.json"), &[catalog_record()]);
    write_records(
        &fx.log_root().join("events.json"),
        &[play_record(26, "free", "Some Other Song")],
    );

    run_catalog_batch(&store, &fx.song_root(), "*.json").unwrap();
    let summary = run_activity_batch(&store, &fx.log_root(), "*.json").unwrap();

    assert_eq!(summary.songplays, 1);
    assert_eq!(summary.songplays_matched, 0);

    let plays = store.list_songplays().unwrap();
    assert!(plays[0].song_id.is_none() && plays[0].artist_id.is_none());
}

#[test]
fn rerunning_activity_batch_duplicates_fact_rows_only() {
    let fx = Fixture::new();
    let store = fx.store();
    write_records(
        &fx.log_root().join("events.json"),
        &[play_record(26, "free", "T")],
    );

    run_activity_batch(&store, &fx.log_root(), "*.json").unwrap();
    run_activity_batch(&store, &fx.log_root(), "*.json").unwrap();

    let stats = store.stats().unwrap();
    // Dimensions stay deduplicated; the fact table is at-least-once.
    assert_eq!(stats.time, 1);
    assert_eq!(stats.users, 1);
    assert_eq!(stats.songplays, 2);
}

#[test]
fn discovery_is_deterministic_across_runs() {
    let fx = Fixture::new();
    let root = fx.log_root();
    write_records(&root.join("2018/11/a.json"), &[json!({"page": "Home", "ts": 1})]);
    write_records(&root.join("2018/12/b.json"), &[json!({"page": "Home", "ts": 2})]);
    write_records(&root.join("c.json"), &[json!({"page": "Home", "ts": 3})]);

    let first = discover(&root, "*.json").unwrap();
    let second = discover(&root, "*.json").unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn malformed_activity_file_halts_with_file_context() {
    let fx = Fixture::new();
    let store = fx.store();
    let root = fx.log_root();
    fs::create_dir_all(&root).unwrap();
    fs::write(
        root.join("events.json"),
        "{\"page\": \"Home\", \"ts\": 1}\n{broken\n",
    )
    .unwrap();

    let err = run_activity_batch(&store, &root, "*.json").unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("events.json"));
    assert!(message.contains("line 2") || message.contains(":2"));
}
