pub mod config;
pub mod covers;
pub mod error;
pub mod logging;
pub mod presence;
pub mod reconciler;
pub mod server;
