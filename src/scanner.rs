use log::{debug, info};

use crate::clients::{DataKind, ScrobbleSource, errors::Result};
use crate::duplicates::{DuplicateGroup, detect_duplicates};

/// Fetches a user's chart and reports duplicate versions in it.
pub struct Scanner<S> {
    source: S,
}

impl<S: ScrobbleSource> Scanner<S> {
    pub fn new(source: S) -> Self {
        Scanner { source }
    }

    pub async fn scan(&self, username: &str, kind: DataKind) -> Result<Vec<DuplicateGroup>> {
        info!("Fetching {kind} for {username} ...");
        let records = self.source.fetch_all(username, kind).await?;
        debug!("Fetched {} {kind} for {username}", records.len());

        if records.is_empty() {
            info!("No {kind} found for {username}. Nothing to compare.");
            return Ok(Vec::new());
        }

        let groups = detect_duplicates(&records, kind);
        info!(
            "Found {} duplicate groups among {} {kind}",
            groups.len(),
            records.len()
        );
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{Record, errors::Error};

    struct StaticSource {
        albums: Vec<Record>,
        tracks: Vec<Record>,
    }

    impl ScrobbleSource for StaticSource {
        async fn fetch_all(&self, username: &str, kind: DataKind) -> Result<Vec<Record>> {
            if username != "rj" {
                return Err(Error::UserNotFound(username.to_string()));
            }
            Ok(match kind {
                DataKind::Albums => self.albums.clone(),
                DataKind::Tracks => self.tracks.clone(),
            })
        }
    }

    fn scanner() -> Scanner<StaticSource> {
        Scanner::new(StaticSource {
            albums: vec![
                Record::new("Band", "Record", 20, "a1"),
                Record::new("Band", "Record (Special Edition)", 4, "a2"),
            ],
            tracks: Vec::new(),
        })
    }

    #[tokio::test]
    async fn scans_the_requested_kind() {
        let groups = scanner().scan("rj", DataKind::Albums).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].base_title, "Record");
        assert_eq!(groups[0].total_playcount, 24);
    }

    #[tokio::test]
    async fn empty_chart_is_not_an_error() {
        let groups = scanner().scan("rj", DataKind::Tracks).await.unwrap();
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn propagates_source_errors() {
        let err = scanner().scan("ghost", DataKind::Albums).await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound(ref user) if user == "ghost"));
    }
}
