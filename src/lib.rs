pub mod classify;
pub mod cli;
pub mod config;
pub mod crest;
pub mod error;
pub mod geometry;
pub mod http_client;
pub mod league_fetch;
pub mod model;
pub mod plan;
pub mod projection;
pub mod render;
pub mod sequence;
pub mod standings;
pub mod telemetry;
pub mod threshold;

pub use error::{ErrorKind, RaceError, RaceResult};
