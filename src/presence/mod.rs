mod discord;
mod traits;

pub use discord::{DiscordSink, DISCORD_APP_ID};
pub use traits::{NowPlaying, PlayStatus, PresenceSink, Timeline};
