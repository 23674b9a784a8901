use std::fmt::Display;
use std::str::FromStr;

use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info};
use reqwest::{Client, Response};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};

use crate::clients::{
    entities::{DataKind, Record},
    errors::{Error, Result},
    source::ScrobbleSource,
};

/// Public Last.fm REST endpoint.
pub const DEFAULT_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

// Largest page size user.gettop* accepts
const DEFAULT_PAGE_LIMIT: u32 = 500;
const DEFAULT_CONCURRENCY: usize = 4;
const USER_NOT_FOUND_CODE: u32 = 6;

// Last.fm encodes most numbers as JSON strings
fn from_str_or_number<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber<T> {
        String(String),
        Number(T),
    }

    match StringOrNumber::<T>::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.trim().parse().map_err(de::Error::custom),
        StringOrNumber::Number(n) => Ok(n),
    }
}

#[derive(Deserialize, Debug)]
struct LastFMAPIArtist {
    name: String,
}

#[derive(Deserialize, Debug)]
struct LastFMAPIEntry {
    name: String,
    #[serde(deserialize_with = "from_str_or_number")]
    playcount: u64,
    url: String,
    artist: LastFMAPIArtist,
}

impl From<LastFMAPIEntry> for Record {
    fn from(entry: LastFMAPIEntry) -> Record {
        Record {
            artist: entry.artist.name,
            title: entry.name,
            playcount: entry.playcount,
            url: entry.url,
        }
    }
}

#[derive(Deserialize, Debug)]
struct PageAttr {
    #[serde(deserialize_with = "from_str_or_number")]
    page: u32,
    #[serde(rename = "totalPages", deserialize_with = "from_str_or_number")]
    total_pages: u32,
}

#[derive(Deserialize, Debug)]
struct ChartPage {
    #[serde(alias = "album", alias = "track", default)]
    entries: Vec<LastFMAPIEntry>,
    #[serde(rename = "@attr")]
    attr: PageAttr,
}

#[derive(Deserialize, Debug)]
enum ChartResponse {
    #[serde(rename = "topalbums")]
    Albums(ChartPage),
    #[serde(rename = "toptracks")]
    Tracks(ChartPage),
}

impl ChartResponse {
    fn into_page(self, kind: DataKind) -> Result<ChartPage> {
        let (received, page) = match self {
            ChartResponse::Albums(page) => (DataKind::Albums, page),
            ChartResponse::Tracks(page) => (DataKind::Tracks, page),
        };
        if received == kind {
            Ok(page)
        } else {
            Err(Error::LastFMUnexpectedResponse(format!(
                "requested {kind} chart but received {received}"
            )))
        }
    }
}

#[derive(Deserialize, Debug)]
struct LastFMAPIError {
    error: u32,
    message: String,
}

/// Builder for [`LastFmClient`]. Every setting except the API key has a default.
#[derive(Default)]
pub struct LastFmClientBuilder {
    api_key: Option<String>,
    user_agent: Option<String>,
    base_url: Option<String>,
    page_limit: Option<u32>,
    concurrency: Option<usize>,
}

impl LastFmClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `LASTFM_API_KEY`, `LASTFM_USER_AGENT` and `LASTFM_API_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LASTFM_API_KEY").map_err(|e| {
            Error::ConfigurationError(format!(
                "LASTFM_API_KEY: {e}. Set it in the environment or a .env file."
            ))
        })?;
        let mut builder = Self::new().api_key(&api_key);
        if let Ok(user_agent) = std::env::var("LASTFM_USER_AGENT") {
            builder = builder.user_agent(&user_agent);
        }
        if let Ok(url) = std::env::var("LASTFM_API_URL") {
            builder = builder.base_url(&url);
        }
        Ok(builder)
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    pub fn page_limit(mut self, limit: u32) -> Self {
        self.page_limit = Some(limit);
        self
    }

    /// Number of pages requested at the same time once the page count is known.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn build(self) -> Result<LastFmClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::ConfigurationError(
                    "Missing Last.fm API key. Set LASTFM_API_KEY.".to_string(),
                )
            })?;
        let user_agent = self.user_agent.unwrap_or_else(|| {
            format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        });
        let client = Client::builder().user_agent(user_agent).build()?;

        Ok(LastFmClient {
            client,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key,
            page_limit: self.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1),
            concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1),
        })
    }
}

/// Read-only client for a user's Last.fm charts.
#[derive(Debug, Clone)]
pub struct LastFmClient {
    client: Client,
    base_url: String,
    api_key: String,
    page_limit: u32,
    concurrency: usize,
}

impl LastFmClient {
    // Create a LastFmClient from environment variables or raise a configuration error
    pub fn try_default() -> Result<Self> {
        LastFmClientBuilder::from_env()?.build()
    }

    /// Fetch every page of the user's chart for `kind`.
    ///
    /// Page 1 tells how many pages exist; the rest are requested with bounded
    /// concurrency and stitched back together in page order. A user without
    /// scrobbles yields an empty list, an unknown user yields
    /// [`Error::UserNotFound`].
    pub async fn fetch_all(&self, username: &str, kind: DataKind) -> Result<Vec<Record>> {
        let first = self.fetch_page(username, kind, 1).await?;
        let total_pages = first.attr.total_pages;
        info!("Fetched {kind} page 1 of {total_pages} for {username}");

        let mut records: Vec<Record> = first.entries.into_iter().map(Record::from).collect();

        if total_pages > 1 {
            let pages: Vec<ChartPage> = stream::iter(2..=total_pages)
                .map(|page| async move {
                    let chart = self.fetch_page(username, kind, page).await?;
                    info!(
                        "Fetched {kind} page {} of {total_pages} for {username}",
                        chart.attr.page
                    );
                    Ok::<_, Error>(chart)
                })
                .buffered(self.concurrency)
                .try_collect()
                .await?;
            records.extend(
                pages
                    .into_iter()
                    .flat_map(|page| page.entries)
                    .map(Record::from),
            );
        }

        debug!("Fetched {} {kind} for {username}", records.len());
        Ok(records)
    }

    async fn fetch_page(&self, username: &str, kind: DataKind, page: u32) -> Result<ChartPage> {
        let limit = self.page_limit.to_string();
        let page_number = page.to_string();
        debug!("Request: {} user={username} page={page}", kind.api_method());

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("method", kind.api_method()),
                ("user", username),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("page", page_number.as_str()),
            ])
            .send()
            .await?;

        let chart: ChartResponse = Self::handle_response(response).await.map_err(|err| {
            if is_user_not_found(&err) {
                Error::UserNotFound(username.to_string())
            } else {
                err
            }
        })?;
        chart.into_page(kind)
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;

        // Last.fm reports failures as {"error": N, "message": "..."}, sometimes with a 200
        if let Ok(err) = serde_json::from_str::<LastFMAPIError>(&text) {
            return Err(Error::LastFMApi {
                code: err.error,
                message: err.message,
            });
        }
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn is_user_not_found(err: &Error) -> bool {
    matches!(
        err,
        Error::LastFMApi { code, message }
            if *code == USER_NOT_FOUND_CODE && message.eq_ignore_ascii_case("user not found")
    )
}

impl ScrobbleSource for LastFmClient {
    async fn fetch_all(&self, username: &str, kind: DataKind) -> Result<Vec<Record>> {
        LastFmClient::fetch_all(self, username, kind).await
    }
}
