//! Duplicate detection over a user's chart.
//!
//! Titles are reduced to a base title by stripping a fixed list of decoration
//! substrings for the data kind. Records sharing a base title and the exact same
//! artist form a group, and only groups with at least two versions are reported.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::clients::entities::{DataKind, Record};

const ALBUM_DECORATIONS: &[&str] = &[
    " (Deluxe)",
    " (Deluxe Edition)",
    " (Digital Deluxe Version)",
    " (Special Edition)",
    " (Acoustic)",
];

const TRACK_DECORATIONS: &[&str] = &[
    " - Remix",
    " (Acoustic)",
    " (Acoustic version)",
    " (Remix)",
    " - Acoustic",
];

/// Literal substrings stripped from titles of `kind`, in application order.
pub fn strings_to_remove(kind: DataKind) -> &'static [&'static str] {
    match kind {
        DataKind::Albums => ALBUM_DECORATIONS,
        DataKind::Tracks => TRACK_DECORATIONS,
    }
}

/// Reduce `title` to its base title.
///
/// Each rule removes every exact, case-sensitive occurrence of its substring and
/// the result is trimmed before the next rule runs.
pub fn normalize(title: &str, kind: DataKind) -> String {
    strings_to_remove(kind)
        .iter()
        .fold(title.to_string(), |title, pattern| {
            title.replace(pattern, "").trim().to_string()
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    base_title: String,
    artist: String,
}

/// One variant within a [`DuplicateGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub title: String,
    pub playcount: u64,
    pub url: String,
}

impl From<&Record> for Version {
    fn from(record: &Record) -> Self {
        Version {
            title: record.title.clone(),
            playcount: record.playcount,
            url: record.url.clone(),
        }
    }
}

/// Two or more versions of the same work by the same artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DuplicateGroup {
    pub base_title: String,
    pub artist: String,
    pub total_playcount: u64,
    pub version_count: usize,
    /// In the order the records were received.
    pub versions: Vec<Version>,
}

/// Group `records` by base title and artist and report every group with more
/// than one version, largest groups first.
///
/// Groups with the same number of versions keep the order in which their first
/// record appeared in `records`.
pub fn detect_duplicates(records: &[Record], kind: DataKind) -> Vec<DuplicateGroup> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut buckets: Vec<(GroupKey, Vec<&Record>)> = Vec::new();

    for record in records {
        let key = GroupKey {
            base_title: normalize(&record.title, kind),
            artist: record.artist.clone(),
        };
        match index.get(&key) {
            Some(&slot) => buckets[slot].1.push(record),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push((key, vec![record]));
            }
        }
    }

    let mut groups: Vec<DuplicateGroup> = buckets
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(key, members)| DuplicateGroup {
            base_title: key.base_title,
            artist: key.artist,
            // saturates at u64::MAX
            total_playcount: members
                .iter()
                .map(|record| record.playcount)
                .fold(0, u64::saturating_add),
            version_count: members.len(),
            versions: members.into_iter().map(Version::from).collect(),
        })
        .collect();

    // sort_by is stable, ties stay in first-seen order
    groups.sort_by(|a, b| b.version_count.cmp(&a.version_count));
    groups
}
