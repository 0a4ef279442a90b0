//! Load transformed row sets into the analytics store.

use crate::store::{AnalyticsStore, ArtistRow, SongRow};
use crate::transform::ActivityBatch;
use anyhow::Result;
use tracing::warn;

/// Outcome of loading one activity file's songplay candidates. Row-level
/// failures are isolated here so one bad event cannot block the rest of
/// its file.
#[derive(Debug, Default)]
pub struct SongplayLoadReport {
    pub inserted: usize,
    pub matched: usize,
    pub failures: Vec<SongplayFailure>,
}

/// One songplay candidate that could not be loaded.
#[derive(Debug)]
pub struct SongplayFailure {
    pub songplay_id: i64,
    pub reason: String,
}

/// Upsert one catalog file's song and artist rows.
pub fn load_catalog(store: &dyn AnalyticsStore, song: &SongRow, artist: &ArtistRow) -> Result<()> {
    store.upsert_artist(artist)?;
    store.upsert_song(song)?;
    Ok(())
}

/// Upsert one activity file's time and user rows, then resolve and insert
/// its songplay facts. A candidate whose lookup finds no unambiguous
/// catalog pair is stored with null song and artist ids.
pub fn load_activity(
    store: &dyn AnalyticsStore,
    batch: &ActivityBatch,
) -> Result<SongplayLoadReport> {
    store.upsert_times(&batch.times)?;
    store.upsert_users(&batch.users)?;

    let mut report = SongplayLoadReport::default();
    for candidate in &batch.songplays {
        let result = store
            .match_song(
                &candidate.song_title,
                &candidate.artist_name,
                candidate.duration,
            )
            .and_then(|matched| {
                store.insert_songplay(candidate, matched.as_ref())?;
                Ok(matched.is_some())
            });

        match result {
            Ok(was_matched) => {
                report.inserted += 1;
                if was_matched {
                    report.matched += 1;
                }
            }
            Err(e) => {
                warn!("Failed to load songplay {}: {:#}", candidate.songplay_id, e);
                report.failures.push(SongplayFailure {
                    songplay_id: candidate.songplay_id,
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    Ok(report)
}
