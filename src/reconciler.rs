//! The reconciliation engine: decides whether a polled snapshot is worth
//! re-announcing, resolves metadata and cover art when the track changes,
//! and pushes the rebuilt activity to the presence sink.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::covers::CoverResolver;
use crate::presence::{NowPlaying, PlayStatus, PresenceSink, Timeline};
use crate::server::{PlayState, Playback, PlaybackSource, Track};

/// Asset key shown when a track has no album or the cover upload fails.
pub const FALLBACK_ART: &str = "logo-dark";

/// Everything remembered between ticks. Owned exclusively by the engine;
/// ticks never overlap, so no locking is needed.
#[derive(Default)]
struct ReconcilerState {
    last_track_id: i64,
    last_state: Option<PlayState>,
    last_position_ms: i64,
    /// Set iff `last_track_id != 0`.
    cached_track: Option<Track>,
    cached_art: String,
}

pub struct Reconciler<S, C, K> {
    source: S,
    covers: C,
    sink: K,
    state: ReconcilerState,
}

impl<S, C, K> Reconciler<S, C, K>
where
    S: PlaybackSource,
    C: CoverResolver,
    K: PresenceSink,
{
    pub fn new(source: S, covers: C, sink: K) -> Self {
        Self {
            source,
            covers,
            sink,
            state: ReconcilerState::default(),
        }
    }

    /// One reconciliation pass. Every failure is logged and swallowed
    /// here; the next tick is the retry.
    pub async fn tick(&mut self) {
        let playback = match self.source.active_playback().await {
            Ok(playback) => playback,
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch active playback");
                return;
            }
        };

        let playback = match playback {
            Some(p) if matches!(p.state, PlayState::Playing | PlayState::Paused) => p,
            _ => {
                self.go_idle();
                return;
            }
        };

        // Suppress redundant updates: the server reports sub-second
        // position granularity, so an unchanged position means nothing
        // moved since the last tick.
        if playback.track_id == self.state.last_track_id
            && self.state.last_state == Some(playback.state)
            && playback.position_ms == self.state.last_position_ms
        {
            return;
        }

        if playback.track_id != self.state.last_track_id {
            let track = match self.source.track(playback.track_id).await {
                Ok(track) => track,
                Err(e) => {
                    // Cached track and art stay in place; the no-op guard
                    // cannot match this snapshot, so the next tick retries.
                    tracing::warn!(track_id = playback.track_id, error = %e, "failed to fetch track");
                    return;
                }
            };

            let mut art = FALLBACK_ART.to_string();
            if let Some(album) = track.albums.first() {
                match self.covers.resolve(album.id).await {
                    Ok(url) => art = url,
                    Err(e) => {
                        tracing::warn!(album_id = album.id, error = %e, "cover art unavailable, using fallback")
                    }
                }
            }

            tracing::info!(
                "{}: {} - {}",
                status_label(playback.state),
                track.title,
                track.artist_line()
            );
            self.state.cached_track = Some(track);
            self.state.cached_art = art;
        } else if self.state.last_state != Some(playback.state) {
            if let Some(track) = &self.state.cached_track {
                tracing::info!("{}: {}", status_label(playback.state), track.title);
            }
        }

        let Some(track) = self.state.cached_track.as_ref() else {
            return;
        };

        let now_ms = epoch_ms(SystemTime::now());
        let activity = build_now_playing(track, &playback, self.state.cached_art.clone(), now_ms);

        if let Err(e) = self.sink.set_now_playing(&activity) {
            // Leave last_* untouched so the next tick re-announces this
            // transition instead of silently drifting.
            tracing::warn!(sink = self.sink.name(), error = %e, "failed to update presence");
            return;
        }

        self.state.last_track_id = playback.track_id;
        self.state.last_state = Some(playback.state);
        self.state.last_position_ms = playback.position_ms;
    }

    /// Nothing is playing: clear the display if we were showing something,
    /// and drop all cached state.
    fn go_idle(&mut self) {
        if self.state.last_state.is_some() {
            match self.sink.clear() {
                Ok(()) => tracing::info!("no active playback, cleared presence"),
                Err(e) => {
                    tracing::warn!(sink = self.sink.name(), error = %e, "failed to clear presence")
                }
            }
        }
        self.state = ReconcilerState::default();
    }

    /// Tear down the sink session on shutdown.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.sink.close() {
            tracing::warn!(sink = self.sink.name(), error = %e, "failed to close presence session");
        }
    }
}

fn status_label(state: PlayState) -> &'static str {
    match state {
        PlayState::Playing => "Playing",
        PlayState::Paused => "Paused",
        PlayState::Other => "Stopped",
    }
}

fn epoch_ms(t: SystemTime) -> i64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Playback position extrapolated from the last server update to `now_ms`,
/// clamped into `[0, duration]`. The lower clamp covers clock skew between
/// this host and the server; the upper keeps the progress bar from
/// overshooting the track length.
fn effective_position_ms(playback: &Playback, now_ms: i64) -> i64 {
    let mut effective = playback.position_ms + (now_ms - playback.updated_at_ms);
    if let Some(duration) = playback.duration_ms {
        effective = effective.min(duration);
    }
    effective.max(0)
}

fn build_now_playing(
    track: &Track,
    playback: &Playback,
    cover_art: String,
    now_ms: i64,
) -> NowPlaying {
    let album_line = track.albums.first().map(|album| {
        if album.year != 0 {
            format!("{} ({})", album.title, album.year)
        } else {
            album.title.clone()
        }
    });

    let (status, timeline) = match playback.state {
        PlayState::Playing => {
            let effective = effective_position_ms(playback, now_ms);
            let start_ms = now_ms - effective;
            let timeline = Timeline {
                start_ms,
                end_ms: playback.duration_ms.map(|d| start_ms + d),
            };
            (PlayStatus::Playing, Some(timeline))
        }
        _ => (PlayStatus::Paused, None),
    };

    NowPlaying {
        title: track.title.clone(),
        artists: track.artist_line(),
        album_line,
        cover_art,
        status,
        timeline,
    }
}
