use tokio::sync::watch;
use tracing::debug;

use crate::{
    playback::{
        EmbedKind, EmbedTarget, MAX_VOLUME, PlaybackError, PlaybackProvider, PlaybackStatus,
        PlayerState,
    },
    state::game::MediaRef,
};

/// Base of direct track embeds.
pub const TRACK_EMBED_BASE: &str = "https://open.spotify.com/embed/track/";
/// Base of search-driven video embeds; the query is appended URL-encoded.
pub const SEARCH_EMBED_BASE: &str = "https://www.youtube.com/embed?listType=search&list=";

/// Embed-based player: resolves a [`MediaRef`] into an embed the presentation
/// layer renders, and tracks the resulting player state.
pub struct EmbedPlayback {
    kind: EmbedKind,
    status: watch::Sender<PlaybackStatus>,
}

impl EmbedPlayback {
    /// Build a stopped player.
    pub fn new(kind: EmbedKind, volume: u8, preview_length_secs: u32) -> Self {
        let (status, _rx) = watch::channel(PlaybackStatus {
            state: PlayerState::Stopped,
            target: None,
            volume: volume.min(MAX_VOLUME),
            preview_length_secs,
        });
        Self { kind, status }
    }

    /// Strategy this player was built with.
    pub fn kind(&self) -> EmbedKind {
        self.kind
    }

    fn resolve(&self, media: &MediaRef) -> Result<EmbedTarget, PlaybackError> {
        match self.kind {
            EmbedKind::TrackEmbed => {
                let track_id = media
                    .track_id
                    .as_deref()
                    .filter(|id| is_track_id(id))
                    .ok_or_else(|| PlaybackError::Unresolvable(media.query.clone()))?;
                Ok(EmbedTarget {
                    kind: self.kind,
                    reference: track_id.to_string(),
                    url: format!("{TRACK_EMBED_BASE}{track_id}?utm_source=generator&theme=0"),
                })
            }
            EmbedKind::SearchEmbed => {
                let query = media.query.trim();
                if query.is_empty() {
                    return Err(PlaybackError::Unresolvable(media.query.clone()));
                }
                Ok(EmbedTarget {
                    kind: self.kind,
                    reference: query.to_string(),
                    url: format!("{SEARCH_EMBED_BASE}{}", encode_query(query)),
                })
            }
        }
    }

    fn require_loaded(&self) -> Result<(), PlaybackError> {
        if self.status.borrow().target.is_some() {
            Ok(())
        } else {
            Err(PlaybackError::NothingLoaded)
        }
    }

    fn set_state(&self, state: PlayerState) {
        self.status.send_if_modified(|status| {
            let changed = status.state != state;
            status.state = state;
            changed
        });
    }
}

impl PlaybackProvider for EmbedPlayback {
    fn start(&self, media: &MediaRef) -> Result<(), PlaybackError> {
        let target = self.resolve(media)?;
        debug!(kind = %self.kind, url = %target.url, "starting preview");
        self.status.send_modify(|status| {
            status.state = PlayerState::Playing;
            status.target = Some(target);
        });
        Ok(())
    }

    fn stop(&self) {
        self.status.send_if_modified(|status| {
            let changed = status.state != PlayerState::Stopped || status.target.is_some();
            status.state = PlayerState::Stopped;
            status.target = None;
            changed
        });
    }

    fn pause(&self) -> Result<(), PlaybackError> {
        self.require_loaded()?;
        self.set_state(PlayerState::Paused);
        Ok(())
    }

    fn resume(&self) -> Result<(), PlaybackError> {
        self.require_loaded()?;
        self.set_state(PlayerState::Playing);
        Ok(())
    }

    fn set_volume(&self, volume: u8) -> Result<(), PlaybackError> {
        if volume > MAX_VOLUME {
            return Err(PlaybackError::InvalidVolume(volume));
        }
        // Track embeds expose no volume control to the host page.
        if self.kind == EmbedKind::TrackEmbed {
            return Err(PlaybackError::Unsupported("volume control", self.kind));
        }
        self.status.send_if_modified(|status| {
            let changed = status.volume != volume;
            status.volume = volume;
            changed
        });
        Ok(())
    }

    fn state(&self) -> PlaybackStatus {
        self.status.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<PlaybackStatus> {
        self.status.subscribe()
    }
}

fn is_track_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Percent-encode a query for use inside a URL query string.
fn encode_query(query: &str) -> String {
    let mut encoded = String::with_capacity(query.len());
    for byte in query.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            b' ' => encoded.push('+'),
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}
