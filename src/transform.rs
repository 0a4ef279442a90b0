//! Pure mapping from extracted records to normalized rows.

use crate::error::EtlError;
use crate::records::{ActivityRecord, CatalogRecord};
use crate::store::{ArtistRow, SongRow, SongplayCandidate, TimeRow, UserRow};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::path::Path;

/// The `page` value that marks a play event; every other event type is
/// discarded.
const SONG_PLAYED_PAGE: &str = "NextSong";

/// Row sets derived from one activity file.
#[derive(Debug, Default)]
pub struct ActivityBatch {
    pub times: Vec<TimeRow>,
    pub users: Vec<UserRow>,
    pub songplays: Vec<SongplayCandidate>,
}

/// Project one catalog file's single record into its song and artist rows.
pub fn transform_catalog(
    records: &[CatalogRecord],
    file: &Path,
) -> Result<(SongRow, ArtistRow), EtlError> {
    let record = match records {
        [record] => record,
        _ => {
            return Err(EtlError::Shape {
                file: file.to_path_buf(),
                count: records.len(),
            })
        }
    };

    let song = SongRow {
        song_id: record.song_id.clone(),
        title: record.title.clone(),
        artist_id: record.artist_id.clone(),
        year: record.year,
        duration: record.duration,
    };
    let artist = ArtistRow {
        artist_id: record.artist_id.clone(),
        name: record.artist_name.clone(),
        location: record.artist_location.clone(),
        latitude: record.artist_latitude,
        longitude: record.artist_longitude,
    };

    Ok((song, artist))
}

/// Filter one activity file's records down to play events and derive the
/// time, user and songplay row sets. An input with no play events yields
/// three empty sets.
///
/// `songplay_id` is the record's position within the file before
/// filtering. Weekday is Monday = 0; week numbers are ISO weeks.
pub fn transform_activity(records: &[ActivityRecord]) -> Result<ActivityBatch, EtlError> {
    let mut batch = ActivityBatch::default();

    for (index, record) in records.iter().enumerate() {
        if record.page != SONG_PLAYED_PAGE {
            continue;
        }

        let ts = DateTime::<Utc>::from_timestamp_millis(record.ts).ok_or(EtlError::Timestamp {
            index,
            ts: record.ts,
        })?;

        batch.times.push(TimeRow {
            start_time: record.ts,
            hour: ts.hour(),
            day: ts.day(),
            week: ts.iso_week().week(),
            month: ts.month(),
            year: ts.year(),
            weekday: ts.weekday().num_days_from_monday(),
        });

        let user_id = required(record.user_id.as_deref(), index, "userId")?;
        let level = required(record.level.as_deref(), index, "level")?;
        batch.users.push(UserRow {
            user_id: user_id.to_string(),
            first_name: required(record.first_name.as_deref(), index, "firstName")?.to_string(),
            last_name: required(record.last_name.as_deref(), index, "lastName")?.to_string(),
            gender: required(record.gender.as_deref(), index, "gender")?.to_string(),
            level: level.to_string(),
        });

        batch.songplays.push(SongplayCandidate {
            songplay_id: index as i64,
            start_time: record.ts,
            user_id: user_id.to_string(),
            level: level.to_string(),
            song_title: required(record.song.as_deref(), index, "song")?.to_string(),
            artist_name: required(record.artist.as_deref(), index, "artist")?.to_string(),
            duration: record.length.ok_or(EtlError::MissingField {
                index,
                field: "length",
            })?,
            session_id: record.session_id.ok_or(EtlError::MissingField {
                index,
                field: "sessionId",
            })?,
            location: record.location.clone(),
            user_agent: record.user_agent.clone(),
        });
    }

    Ok(batch)
}

fn required<'a>(
    value: Option<&'a str>,
    index: usize,
    field: &'static str,
) -> Result<&'a str, EtlError> {
    value.ok_or(EtlError::MissingField { index, field })
}
