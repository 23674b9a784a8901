use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::clients::errors::Error;

/// Which Last.fm chart to pull from a user's library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DataKind {
    /// `user.gettopalbums`
    Albums,
    /// `user.gettoptracks`
    Tracks,
}

impl DataKind {
    /// Last.fm API method name for this chart.
    pub fn api_method(self) -> &'static str {
        match self {
            DataKind::Albums => "user.gettopalbums",
            DataKind::Tracks => "user.gettoptracks",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::Albums => "albums",
            DataKind::Tracks => "tracks",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "albums" => Ok(DataKind::Albums),
            "tracks" => Ok(DataKind::Tracks),
            other => Err(Error::InvalidDataKind(other.to_string())),
        }
    }
}

/// One entry of a user's top albums or top tracks chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub artist: String,
    pub title: String,
    pub playcount: u64,
    pub url: String,
}

impl Record {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        playcount: u64,
        url: impl Into<String>,
    ) -> Self {
        Record {
            artist: artist.into(),
            title: title.into(),
            playcount,
            url: url.into(),
        }
    }
}
