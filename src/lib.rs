//! Lastfm-dupes - Find duplicate albums and tracks in a Last.fm library
//!
//! This library fetches a user's top albums or top tracks from Last.fm and
//! groups entries that only differ by decorations such as "(Deluxe Edition)"
//! or " - Remix", reporting the groups with aggregated playcounts.

/// HTTP API exposing the duplicate scanner
pub mod api;
/// Client modules for interacting with Last.fm
pub mod clients;
/// Environment and `.env` loading
pub mod config;
/// Title normalization and duplicate grouping
pub mod duplicates;
/// Fetch-then-detect orchestration
pub mod scanner;
