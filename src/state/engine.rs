//! Timeline placement and scoring engine driving a single match.

use std::{collections::HashSet, sync::Arc, time::SystemTime};

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    catalog::{CatalogError, CatalogProvider},
    state::{
        game::{
            Difficulty, MatchPhase, MatchSettings, MatchSnapshot, MatchState, PlacementResult,
            Song, Team, TimelineEntry,
        },
        shuffle::{RandomOrder, SongOrder},
    },
};

/// Minimum number of teams in a match.
pub const MIN_TEAMS: usize = 2;

/// Failures surfaced by engine operations. None of them leave a partial mutation behind.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Setup parameters were rejected before anything was fetched or changed.
    #[error("invalid match configuration: {0}")]
    Config(String),
    /// The song source is unreachable, malformed or too small.
    #[error("song catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),
    /// The catalog lacks enough distinct songs to anchor every team.
    #[error("not enough unused songs to anchor every team ({available} of {needed})")]
    InsufficientSongs {
        /// Anchors required.
        needed: usize,
        /// Distinct songs found.
        available: usize,
    },
    /// Every song of the catalog has been drawn.
    #[error("no songs remaining in the catalog")]
    NoSongsRemaining,
    /// A precondition was violated by the caller.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Stateful engine owning one match at a time.
///
/// The engine is not synchronized; callers serialize access (the HTTP layer keeps
/// it behind an async mutex).
pub struct GameEngine {
    catalog: Arc<dyn CatalogProvider>,
    order: Box<dyn SongOrder>,
    state: MatchState,
}

impl GameEngine {
    /// Engine shuffling each match catalog with an OS-seeded Fisher–Yates shuffle.
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self::with_order(catalog, Box::new(RandomOrder::new()))
    }

    /// Engine using a custom draw order strategy.
    pub fn with_order(catalog: Arc<dyn CatalogProvider>, order: Box<dyn SongOrder>) -> Self {
        Self {
            catalog,
            order,
            state: MatchState::default(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    /// Read-only view of the match.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Settings of the running match, if any.
    pub fn settings(&self) -> Option<&MatchSettings> {
        self.state.settings.as_ref()
    }

    /// Song waiting to be placed.
    pub fn pending_song(&self) -> Option<&Song> {
        self.state.pending_song.as_ref()
    }

    /// Team whose turn it is, when a match is running.
    pub fn active_team(&self) -> Option<&Team> {
        self.state.teams.get(self.state.active_team_index)
    }

    /// Distinct songs that can still be drawn.
    pub fn remaining_songs(&self) -> usize {
        self.state.remaining_songs()
    }

    /// Owned copy of the match for readers.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot::from(&self.state)
    }

    /// Start a match: validate settings, fetch and shuffle the catalog, then seed
    /// one anchor per team.
    ///
    /// Everything is computed off to the side and swapped in at the end, so a
    /// failure (or dropping the future mid-fetch) leaves the engine in setup.
    pub async fn initialize(
        &mut self,
        team_names: Vec<String>,
        difficulty: Difficulty,
        win_target: u32,
    ) -> Result<(), EngineError> {
        self.ensure_phase(MatchPhase::Setup, "initialize")?;
        let team_names = validate_team_names(team_names)?;
        if win_target < 1 {
            return Err(EngineError::Config("win target must be at least 1".into()));
        }

        let mut catalog = self.catalog.fetch(difficulty).await?;
        let needed = team_names.len() + 1;
        if catalog.len() < needed {
            return Err(CatalogError::TooSmall {
                difficulty,
                available: catalog.len(),
                needed,
            }
            .into());
        }

        self.order.arrange(&mut catalog);

        let mut drawn_ids = HashSet::new();
        let anchors = pick_anchors(&catalog, team_names.len(), &mut drawn_ids)?;

        let teams = team_names
            .iter()
            .zip(anchors)
            .map(|(name, anchor)| {
                let mut team = Team::new(name.clone(), win_target);
                team.timeline.push(TimelineEntry::anchor(anchor));
                team.refresh_score();
                team
            })
            .collect::<Vec<_>>();

        let id = Uuid::new_v4();
        info!(
            match_id = %id,
            %difficulty,
            teams = teams.len(),
            win_target,
            songs = catalog.len(),
            "match started"
        );

        self.state = MatchState {
            id: Some(id),
            started_at: Some(SystemTime::now()),
            settings: Some(MatchSettings {
                team_names,
                difficulty,
                win_target,
            }),
            teams,
            active_team_index: 0,
            catalog,
            drawn_ids,
            pending_song: None,
            winner: None,
            phase: MatchPhase::Playing,
        };

        Ok(())
    }

    /// Draw the next unused song of the shuffled catalog.
    ///
    /// Exhaustion is reported as [`EngineError::NoSongsRemaining`]; deciding what
    /// it means for the match is up to the caller.
    pub fn draw_next_song(&mut self) -> Result<Song, EngineError> {
        self.ensure_phase(MatchPhase::Playing, "draw a song")?;

        let song = next_undrawn(&self.state.catalog, &self.state.drawn_ids)
            .cloned()
            .ok_or(EngineError::NoSongsRemaining)?;

        self.state.drawn_ids.insert(song.id.clone());
        self.state.pending_song = Some(song.clone());
        self.state.phase = MatchPhase::AwaitingPlacement;

        debug!(song_id = %song.id, remaining = self.remaining_songs(), "song drawn");
        Ok(song)
    }

    /// Try to insert the pending song into a team's timeline at `insert_index`.
    pub fn place_song(
        &mut self,
        team_index: usize,
        insert_index: usize,
    ) -> Result<PlacementResult, EngineError> {
        self.ensure_phase(MatchPhase::AwaitingPlacement, "place a song")?;

        let team_count = self.state.teams.len();
        let Some(team) = self.state.teams.get(team_index) else {
            return Err(EngineError::InvalidState(format!(
                "team index {team_index} out of range ({team_count} teams)"
            )));
        };
        if insert_index > team.timeline.len() {
            return Err(EngineError::InvalidState(format!(
                "insert index {insert_index} out of range for a timeline of {} songs",
                team.timeline.len()
            )));
        }
        let Some(song) = self.state.pending_song.take() else {
            return Err(EngineError::InvalidState("no song is waiting to be placed".into()));
        };

        let team = &mut self.state.teams[team_index];
        let year = song.year;

        if !placement_fits(&team.timeline, year, insert_index) {
            info!(team = %team.name, year, insert_index, "placement rejected");
            self.state.phase = MatchPhase::Playing;
            return Ok(PlacementResult::incorrect(year));
        }

        team.timeline.insert(insert_index, TimelineEntry::placed(song));
        team.refresh_score();
        info!(team = %team.name, year, score = team.score, "placement accepted");

        if team.has_won() {
            info!(team = %team.name, score = team.score, "match won");
            self.state.phase = MatchPhase::Victory;
            self.state.winner = Some(team_index);
            return Ok(PlacementResult::victory(team_index));
        }

        self.state.phase = MatchPhase::Playing;
        Ok(PlacementResult::correct())
    }

    /// Hand the turn to the next team, returning its index.
    pub fn advance_turn(&mut self) -> Result<usize, EngineError> {
        self.ensure_phase(MatchPhase::Playing, "advance the turn")?;

        let team_count = self.state.teams.len();
        if team_count >= MIN_TEAMS {
            self.state.active_team_index = (self.state.active_team_index + 1) % team_count;
        }

        debug!(active_team = self.state.active_team_index, "turn advanced");
        Ok(self.state.active_team_index)
    }

    /// Drop the match and return to setup. Safe from any phase.
    pub fn reset(&mut self) {
        if let Some(id) = self.state.id {
            info!(match_id = %id, "match reset");
        }
        self.state = MatchState::default();
    }

    fn ensure_phase(&self, expected: MatchPhase, action: &str) -> Result<(), EngineError> {
        if self.state.phase == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidState(format!(
                "cannot {action} while in {:?} phase",
                self.state.phase
            )))
        }
    }
}

fn validate_team_names(team_names: Vec<String>) -> Result<Vec<String>, EngineError> {
    if team_names.len() < MIN_TEAMS {
        return Err(EngineError::Config(format!(
            "a match requires at least {MIN_TEAMS} teams (got {})",
            team_names.len()
        )));
    }

    team_names
        .into_iter()
        .map(|name| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                Err(EngineError::Config("team name must not be empty".into()))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

fn next_undrawn<'a>(catalog: &'a [Song], drawn_ids: &HashSet<String>) -> Option<&'a Song> {
    catalog.iter().find(|song| !drawn_ids.contains(&song.id))
}

/// Reserve the first `count` distinct undrawn songs, or nothing at all.
fn pick_anchors(
    catalog: &[Song],
    count: usize,
    drawn_ids: &mut HashSet<String>,
) -> Result<Vec<Song>, EngineError> {
    let mut reserved = drawn_ids.clone();
    let mut anchors = Vec::with_capacity(count);

    for _ in 0..count {
        let Some(song) = next_undrawn(catalog, &reserved) else {
            return Err(EngineError::InsufficientSongs {
                needed: count,
                available: anchors.len(),
            });
        };
        reserved.insert(song.id.clone());
        anchors.push(song.clone());
    }

    *drawn_ids = reserved;
    Ok(anchors)
}

/// Whether a song of `year` belongs at `insert_index` of a year-sorted timeline.
/// Equal years are accepted on both sides.
pub(crate) fn placement_fits(timeline: &[TimelineEntry], year: i32, insert_index: usize) -> bool {
    let after_previous = insert_index == 0
        || timeline
            .get(insert_index - 1)
            .is_some_and(|previous| previous.year() <= year);
    let before_next = timeline
        .get(insert_index)
        .is_none_or(|next| year <= next.year());

    after_previous && before_next
}
