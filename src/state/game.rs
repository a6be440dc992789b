use std::{collections::HashSet, fmt, time::SystemTime};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Difficulty tier selecting which song file the catalog provider serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Well-known hits.
    Easy,
    /// Mixed catalog.
    Medium,
    /// Deep cuts.
    Hard,
}

impl Difficulty {
    /// Lowercase tier name, also used to build catalog file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference handed to the playback provider to find a preview. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct MediaRef {
    /// Direct streaming-service track identifier, when the song has been mapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
    /// Free-text query for search-based providers.
    pub query: String,
}

impl MediaRef {
    /// Reference only resolvable through a search.
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            track_id: None,
            query: query.into(),
        }
    }

    /// Reference carrying a direct track identifier next to its search query.
    pub fn track(track_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            track_id: Some(track_id.into()),
            query: query.into(),
        }
    }
}

/// Immutable song record drawn at most once per match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    /// Identifier, unique within a catalog.
    pub id: String,
    /// Performing artist.
    pub artist: String,
    /// Track title.
    pub title: String,
    /// Release year used for chronological placement.
    pub year: i32,
    /// How the playback provider finds a preview.
    pub media_ref: MediaRef,
}

/// A song sitting in a team's timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// The placed song.
    pub song: Song,
    /// True only for the entry seeded when the match starts.
    pub is_anchor: bool,
}

impl TimelineEntry {
    /// Seed entry given to a team before the first turn.
    pub fn anchor(song: Song) -> Self {
        Self {
            song,
            is_anchor: true,
        }
    }

    /// Entry earned by a correct placement.
    pub fn placed(song: Song) -> Self {
        Self {
            song,
            is_anchor: false,
        }
    }

    /// Release year of the underlying song.
    pub fn year(&self) -> i32 {
        self.song.year
    }
}

/// Team competing in a match with its private timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Display name, unique only by convention.
    pub name: String,
    /// Always sorted ascending by year.
    pub timeline: Vec<TimelineEntry>,
    /// Number of placed songs, the anchor excluded.
    pub score: u32,
    /// Score needed to win.
    pub target: u32,
}

impl Team {
    /// Build a team with an empty timeline.
    pub fn new(name: String, target: u32) -> Self {
        Self {
            name,
            timeline: Vec::new(),
            score: 0,
            target,
        }
    }

    /// Recompute the score from the timeline length.
    pub(crate) fn refresh_score(&mut self) {
        self.score = self.timeline.len().saturating_sub(1) as u32;
    }

    /// Whether the team has reached its target.
    pub fn has_won(&self) -> bool {
        self.score >= self.target
    }
}

/// Coarse phase of the match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// No match running.
    Setup,
    /// Waiting for the active team to draw (or for the turn to advance).
    Playing,
    /// A song was drawn and must be placed.
    AwaitingPlacement,
    /// A team reached its target.
    Victory,
}

/// Parameters a match was started with, kept to start a rematch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSettings {
    /// Trimmed team names in turn order.
    pub team_names: Vec<String>,
    /// Catalog tier.
    pub difficulty: Difficulty,
    /// Score each team needs to win.
    pub win_target: u32,
}

/// Complete mutable state of one match, owned by the engine.
#[derive(Debug, Clone)]
pub struct MatchState {
    /// Identifier assigned when the match starts.
    pub id: Option<Uuid>,
    /// Wall-clock start time.
    pub started_at: Option<SystemTime>,
    /// Parameters of the running match; `None` in setup.
    pub settings: Option<MatchSettings>,
    /// Teams in turn order.
    pub teams: Vec<Team>,
    /// Index into `teams` of the team whose turn it is.
    pub active_team_index: usize,
    /// Shuffled once when the match starts, never reordered afterwards.
    pub catalog: Vec<Song>,
    /// Ids of anchors and drawn songs; none of them is drawn again.
    pub drawn_ids: HashSet<String>,
    /// Song drawn and waiting to be placed.
    pub pending_song: Option<Song>,
    /// Index of the winning team once the match is over.
    pub winner: Option<usize>,
    /// Current lifecycle phase.
    pub phase: MatchPhase,
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            id: None,
            started_at: None,
            settings: None,
            teams: Vec::new(),
            active_team_index: 0,
            catalog: Vec::new(),
            drawn_ids: HashSet::new(),
            pending_song: None,
            winner: None,
            phase: MatchPhase::Setup,
        }
    }
}

impl MatchState {
    /// Songs of the shuffled catalog that have not been drawn yet.
    pub fn remaining_songs(&self) -> usize {
        self.catalog
            .iter()
            .filter(|song| !self.drawn_ids.contains(&song.id))
            .map(|song| song.id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Outcome of a placement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementResult {
    /// Whether the song fit at the chosen slot.
    pub correct: bool,
    /// Whether the placement won the match.
    pub victory: bool,
    /// Set when the placement won the match.
    pub winning_team: Option<usize>,
    /// Set when the placement was wrong so the answer can be revealed.
    pub correct_year: Option<i32>,
}

impl PlacementResult {
    pub(crate) fn correct() -> Self {
        Self {
            correct: true,
            victory: false,
            winning_team: None,
            correct_year: None,
        }
    }

    pub(crate) fn victory(team_index: usize) -> Self {
        Self {
            correct: true,
            victory: true,
            winning_team: Some(team_index),
            correct_year: None,
        }
    }

    pub(crate) fn incorrect(year: i32) -> Self {
        Self {
            correct: false,
            victory: false,
            winning_team: None,
            correct_year: Some(year),
        }
    }
}

/// Owned copy of the match handed to readers after each operation.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSnapshot {
    /// Match identifier, `None` in setup.
    pub id: Option<Uuid>,
    /// Wall-clock start time.
    pub started_at: Option<SystemTime>,
    /// Current lifecycle phase.
    pub phase: MatchPhase,
    /// Catalog tier of the running match.
    pub difficulty: Option<Difficulty>,
    /// Teams with their timelines, in turn order.
    pub teams: Vec<Team>,
    /// Index of the team whose turn it is.
    pub active_team_index: usize,
    /// Song waiting to be placed, unredacted.
    pub pending_song: Option<Song>,
    /// Index of the winning team.
    pub winner: Option<usize>,
    /// Distinct songs still drawable.
    pub remaining_songs: usize,
}

impl From<&MatchState> for MatchSnapshot {
    fn from(state: &MatchState) -> Self {
        Self {
            id: state.id,
            started_at: state.started_at,
            phase: state.phase,
            difficulty: state.settings.as_ref().map(|settings| settings.difficulty),
            teams: state.teams.clone(),
            active_team_index: state.active_team_index,
            pending_song: state.pending_song.clone(),
            winner: state.winner,
            remaining_songs: state.remaining_songs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str, year: i32) -> Song {
        Song {
            id: id.into(),
            artist: "Artist".into(),
            title: format!("Track {id}"),
            year,
            media_ref: MediaRef::search(format!("Artist Track {id}")),
        }
    }

    #[test]
    fn score_excludes_anchor() {
        let mut team = Team::new("Red".into(), 3);
        team.refresh_score();
        assert_eq!(team.score, 0);

        team.timeline.push(TimelineEntry::anchor(song("a", 1990)));
        team.refresh_score();
        assert_eq!(team.score, 0);

        team.timeline.push(TimelineEntry::placed(song("b", 2000)));
        team.refresh_score();
        assert_eq!(team.score, 1);
        assert!(!team.has_won());
    }

    #[test]
    fn remaining_songs_ignores_drawn_and_duplicate_ids() {
        let mut state = MatchState {
            catalog: vec![song("a", 1990), song("b", 2000), song("b", 2001), song("c", 2010)],
            ..MatchState::default()
        };
        assert_eq!(state.remaining_songs(), 3);

        state.drawn_ids.insert("b".into());
        assert_eq!(state.remaining_songs(), 2);
    }

    #[test]
    fn media_ref_omits_missing_track_id() {
        let value = serde_json::to_value(MediaRef::search("a-ha take on me")).unwrap();
        assert_eq!(value, serde_json::json!({ "query": "a-ha take on me" }));

        let value =
            serde_json::to_value(MediaRef::track("2WfaOiMkCvy7F5fcp2zZ8L", "a-ha take on me"))
                .unwrap();
        assert_eq!(value["track_id"], "2WfaOiMkCvy7F5fcp2zZ8L");
    }
}
