use crate::error::Error;

/// Whether the track is actively playing or paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStatus {
    Playing,
    Paused,
}

/// Progress timeline in epoch milliseconds. `end_ms` is absent when the
/// track duration is unknown (e.g. a live stream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub start_ms: i64,
    pub end_ms: Option<i64>,
}

/// A fully resolved "now playing" activity, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    /// Artist names joined with ", "; empty when the track has none.
    pub artists: String,
    /// "Album (year)" line; `None` when the track has no album.
    pub album_line: Option<String>,
    /// Public cover URL, or an asset key for the bundled fallback art.
    pub cover_art: String,
    pub status: PlayStatus,
    /// Only present while playing; paused tracks show no progress bar.
    pub timeline: Option<Timeline>,
}

/// A display surface for the current activity (Discord, a test recorder).
pub trait PresenceSink {
    /// Name of this sink, for logging.
    fn name(&self) -> &'static str;

    /// Show the given activity, replacing whatever was shown before.
    fn set_now_playing(&mut self, now: &NowPlaying) -> Result<(), Error>;

    /// Remove the activity from the display.
    fn clear(&mut self) -> Result<(), Error>;

    /// Tear down the session. Called once at shutdown.
    fn close(&mut self) -> Result<(), Error>;
}
