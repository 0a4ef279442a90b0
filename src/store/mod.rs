mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{
    ArtistRow, SongMatch, SongRow, SongplayCandidate, SongplayRow, StoreStats, TimeRow, UserRow,
};
pub use store::SqliteAnalyticsStore;
pub use trait_def::AnalyticsStore;
