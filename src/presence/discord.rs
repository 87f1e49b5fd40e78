//! Discord Rich Presence sink over the local IPC socket.

use discord_rich_presence::activity::{Activity, ActivityType, Assets, Timestamps};
use discord_rich_presence::{DiscordIpc, DiscordIpcClient};

use super::traits::{NowPlaying, PlayStatus, PresenceSink};
use crate::error::Error;

/// Discord application id for this integration.
pub const DISCORD_APP_ID: &str = "1474543583473176846";

/// Asset key for the "playing" badge registered with the Discord app.
const PLAYING_BADGE: &str = "playing";
/// The pause badge is not a registered asset, so it is served by URL.
const PAUSED_BADGE: &str = "https://files.catbox.moe/ibpq2d.png";

pub struct DiscordSink {
    client: DiscordIpcClient,
}

impl DiscordSink {
    /// Connect to the local Discord client. Failure here is fatal to
    /// startup; there is no reconnect logic.
    pub fn login(app_id: &str) -> Result<Self, Error> {
        let mut client =
            DiscordIpcClient::new(app_id).map_err(|e| Error::Presence(e.to_string()))?;
        client
            .connect()
            .map_err(|e| Error::Presence(e.to_string()))?;
        tracing::debug!(app_id, "connected to Discord");
        Ok(Self { client })
    }
}

impl PresenceSink for DiscordSink {
    fn name(&self) -> &'static str {
        "Discord"
    }

    fn set_now_playing(&mut self, now: &NowPlaying) -> Result<(), Error> {
        let assets = match now.status {
            PlayStatus::Playing => Assets::new()
                .large_image(&now.cover_art)
                .large_text(&now.artists)
                .small_image(PLAYING_BADGE)
                .small_text("Playing"),
            PlayStatus::Paused => Assets::new()
                .large_image(&now.cover_art)
                .large_text(&now.artists)
                .small_image(PAUSED_BADGE)
                .small_text("Paused"),
        };

        let mut activity = Activity::new()
            .activity_type(ActivityType::Listening)
            .details(&now.title)
            .assets(assets);

        if let Some(album_line) = &now.album_line {
            activity = activity.state(album_line);
        }

        if let Some(timeline) = &now.timeline {
            // Discord wants epoch seconds.
            let mut timestamps = Timestamps::new().start(timeline.start_ms / 1000);
            if let Some(end_ms) = timeline.end_ms {
                timestamps = timestamps.end(end_ms / 1000);
            }
            activity = activity.timestamps(timestamps);
        }

        self.client
            .set_activity(activity)
            .map_err(|e| Error::Presence(e.to_string()))
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.client
            .clear_activity()
            .map_err(|e| Error::Presence(e.to_string()))
    }

    fn close(&mut self) -> Result<(), Error> {
        self.client
            .close()
            .map_err(|e| Error::Presence(e.to_string()))
    }
}
