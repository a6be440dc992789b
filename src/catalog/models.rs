use serde::Deserialize;

use crate::{
    catalog::error::{CatalogError, CatalogResult},
    state::game::{MediaRef, Song},
};

/// JSON representation of one entry of a `songs-<tier>.json` file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSong {
    /// Optional explicit identifier; derived from the other fields when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub artist: String,
    pub track: String,
    pub year: i32,
    /// Free-text query for search-based players.
    #[serde(default)]
    pub spotify_search: Option<String>,
    /// Direct track identifier filled in by the track-mapping script.
    #[serde(default)]
    pub spotify_track_id: Option<String>,
}

impl RawSong {
    fn into_song(self, origin: &str, index: usize) -> CatalogResult<Song> {
        let malformed = |reason| CatalogError::Malformed {
            origin: origin.to_string(),
            index,
            reason,
        };

        let artist = self.artist.trim().to_string();
        let title = self.track.trim().to_string();
        if artist.is_empty() {
            return Err(malformed("artist must not be empty"));
        }
        if title.is_empty() {
            return Err(malformed("track must not be empty"));
        }

        let track_id = non_blank(self.spotify_track_id);
        let id = non_blank(self.id)
            .or_else(|| track_id.clone())
            .unwrap_or_else(|| format!("{artist} - {title}"));

        let query =
            non_blank(self.spotify_search).unwrap_or_else(|| format!("{artist} {title}"));
        let media_ref = MediaRef { track_id, query };

        Ok(Song {
            id,
            artist,
            title,
            year: self.year,
            media_ref,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Decode a catalog payload into songs, rejecting the whole file on the first bad record.
pub fn parse_catalog(contents: &str, origin: &str) -> CatalogResult<Vec<Song>> {
    let raw: Vec<RawSong> =
        serde_json::from_str(contents).map_err(|source| CatalogError::Parse {
            origin: origin.to_string(),
            source,
        })?;

    raw.into_iter()
        .enumerate()
        .map(|(index, song)| song.into_song(origin, index))
        .collect()
}
