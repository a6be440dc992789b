use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::format_system_time,
    playback::PlaybackStatus,
    state::game::{
        Difficulty, MatchPhase, MatchSnapshot, MediaRef, PlacementResult, Song, Team,
        TimelineEntry,
    },
};

/// Payload used to start a brand-new match.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartMatchRequest {
    /// Names of the competing teams, in turn order.
    #[validate(length(min = 2, message = "a match requires at least two teams"))]
    pub team_names: Vec<String>,
    pub difficulty: Difficulty,
    /// Songs to place before winning. Defaults to the configured win count.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub win_target: Option<u32>,
}

/// Request to place the pending song in a team's timeline.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceSongRequest {
    pub team_index: usize,
    /// Slot in the timeline, `0` meaning before the oldest song.
    pub insert_index: usize,
}

/// Full song details, revealed once a song sits in a timeline.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SongSummary {
    pub id: String,
    pub artist: String,
    pub title: String,
    pub year: i32,
    pub media_ref: MediaRef,
}

impl From<Song> for SongSummary {
    fn from(song: Song) -> Self {
        Self {
            id: song.id,
            artist: song.artist,
            title: song.title,
            year: song.year,
            media_ref: song.media_ref,
        }
    }
}

/// Pending song as shown to players: enough to play it, nothing that gives the answer away.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct HiddenSongSummary {
    pub id: String,
    pub media_ref: MediaRef,
}

impl From<Song> for HiddenSongSummary {
    fn from(song: Song) -> Self {
        Self {
            id: song.id,
            media_ref: song.media_ref,
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct TimelineEntrySummary {
    pub song: SongSummary,
    pub is_anchor: bool,
}

impl From<TimelineEntry> for TimelineEntrySummary {
    fn from(entry: TimelineEntry) -> Self {
        Self {
            song: entry.song.into(),
            is_anchor: entry.is_anchor,
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
/// Public projection of a team and its timeline.
pub struct TeamSummary {
    pub index: usize,
    pub name: String,
    pub score: u32,
    pub target: u32,
    pub timeline: Vec<TimelineEntrySummary>,
}

impl From<(usize, Team)> for TeamSummary {
    fn from((index, team): (usize, Team)) -> Self {
        Self {
            index,
            name: team.name,
            score: team.score,
            target: team.target,
            timeline: team.timeline.into_iter().map(Into::into).collect(),
        }
    }
}

/// Snapshot returned after every match operation.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct MatchSummary {
    pub id: Option<Uuid>,
    pub started_at: Option<String>,
    pub phase: MatchPhase,
    pub difficulty: Option<Difficulty>,
    pub teams: Vec<TeamSummary>,
    pub active_team_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_song: Option<HiddenSongSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<usize>,
    pub remaining_songs: usize,
}

impl From<MatchSnapshot> for MatchSummary {
    fn from(snapshot: MatchSnapshot) -> Self {
        Self {
            id: snapshot.id,
            started_at: snapshot.started_at.map(format_system_time),
            phase: snapshot.phase,
            difficulty: snapshot.difficulty,
            teams: snapshot
                .teams
                .into_iter()
                .enumerate()
                .map(TeamSummary::from)
                .collect(),
            active_team_index: snapshot.active_team_index,
            pending_song: snapshot.pending_song.map(Into::into),
            winner: snapshot.winner,
            remaining_songs: snapshot.remaining_songs,
        }
    }
}

/// Response to a draw: the song for the game master plus the preview status.
#[derive(Debug, Serialize, ToSchema)]
pub struct DrawResponse {
    pub song: SongSummary,
    pub active_team_index: usize,
    pub playback: PlaybackStatus,
    /// Present when the preview could not be started; the draw still stands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_error: Option<String>,
}

/// Outcome of a placement attempt.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PlacementResponse {
    pub correct: bool,
    pub victory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_team: Option<usize>,
    /// Year of the song, revealed when the placement was wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_year: Option<i32>,
    pub song: SongSummary,
    pub team: TeamSummary,
}

impl PlacementResponse {
    /// Combine the engine result with the revealed song and the updated team.
    pub fn new(result: PlacementResult, song: Song, team: TeamSummary) -> Self {
        Self {
            correct: result.correct,
            victory: result.victory,
            winning_team: result.winning_team,
            correct_year: result.correct_year,
            song: song.into(),
            team,
        }
    }
}

/// Response returned after the turn moved on.
#[derive(Debug, Serialize, ToSchema)]
pub struct TurnResponse {
    pub active_team_index: usize,
    pub active_team: String,
}
