/// Data entities for chart records and data kinds
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Last.fm API client
pub mod lastfm;
/// The fetcher seam the duplicate scanner depends on
pub mod source;

pub use entities::{DataKind, Record};
pub use lastfm::{LastFmClient, LastFmClientBuilder};
pub use source::ScrobbleSource;
