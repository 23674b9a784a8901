use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    response::{IntoResponse, Response},
    routing::get,
};
use lastfm_dupes::clients::{DataKind, LastFmClient, LastFmClientBuilder, Record, errors::Error};
use lastfm_dupes::scanner::Scanner;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone)]
struct SeenRequest {
    params: HashMap<String, String>,
    user_agent: Option<String>,
}

struct FakeLastFm {
    base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl FakeLastFm {
    fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    fn client(&self) -> LastFmClient {
        LastFmClientBuilder::new()
            .api_key("test-key")
            .user_agent("dupes-tests/1.0")
            .base_url(&self.base_url)
            .page_limit(2)
            .concurrency(2)
            .build()
            .unwrap()
    }
}

fn entry(artist: &str, title: &str, playcount: u64) -> Value {
    json!({
        "artist": {"name": artist, "url": "", "mbid": ""},
        "name": title,
        "playcount": playcount.to_string(),
        "url": format!("https://www.last.fm/music/{artist}/_/{title}"),
        "@attr": {"rank": "1"}
    })
}

fn chart(kind: DataKind, entries: Vec<Value>, page: usize, total_pages: usize) -> Value {
    let (root, item) = match kind {
        DataKind::Albums => ("topalbums", "album"),
        DataKind::Tracks => ("toptracks", "track"),
    };
    let mut body = Map::new();
    body.insert(item.to_string(), Value::Array(entries));
    body.insert(
        "@attr".to_string(),
        json!({
            "user": "rj",
            "page": page.to_string(),
            "perPage": "2",
            "totalPages": total_pages.to_string(),
        }),
    );
    let mut response = Map::new();
    response.insert(root.to_string(), Value::Object(body));
    Value::Object(response)
}

fn respond(pages: &[Value], params: &HashMap<String, String>) -> Response {
    match params.get("user").map(String::as_str) {
        Some("ghost") => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": 6, "message": "User not found", "links": []})),
        )
            .into_response(),
        Some("broken") => {
            (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
        }
        Some("locked") => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": 10, "message": "Invalid API key"})),
        )
            .into_response(),
        _ => {
            let page: usize = params
                .get("page")
                .and_then(|p| p.parse().ok())
                .unwrap_or(1);
            match pages.get(page - 1) {
                Some(body) => Json(body.clone()).into_response(),
                None => (StatusCode::NOT_FOUND, "no such page").into_response(),
            }
        }
    }
}

async fn spawn_fake(pages: Vec<Value>) -> FakeLastFm {
    let pages = Arc::new(pages);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let app = Router::new().route(
        "/2.0/",
        get(
            move |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| {
                let pages = pages.clone();
                let recorder = recorder.clone();
                async move {
                    recorder.lock().unwrap().push(SeenRequest {
                        params: params.clone(),
                        user_agent: headers
                            .get(USER_AGENT)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string),
                    });
                    respond(&pages, &params)
                }
            },
        ),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeLastFm {
        base_url: format!("http://{addr}/2.0/"),
        seen,
    }
}

fn three_track_pages() -> Vec<Value> {
    vec![
        chart(
            DataKind::Tracks,
            vec![entry("Artist A", "Song X - Remix", 10), entry("Artist B", "Other", 8)],
            1,
            3,
        ),
        chart(
            DataKind::Tracks,
            vec![entry("Artist A", "Song X", 5), entry("Artist C", "Lonely", 4)],
            2,
            3,
        ),
        chart(DataKind::Tracks, vec![entry("Artist A", "Song X (Remix)", 1)], 3, 3),
    ]
}

#[test_log::test(tokio::test)]
async fn fetches_every_page_in_order() {
    let fake = spawn_fake(three_track_pages()).await;

    let records = fake.client().fetch_all("rj", DataKind::Tracks).await.unwrap();

    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Song X - Remix", "Other", "Song X", "Lonely", "Song X (Remix)"]
    );
    assert_eq!(
        records[0],
        Record::new(
            "Artist A",
            "Song X - Remix",
            10,
            "https://www.last.fm/music/Artist A/_/Song X - Remix"
        )
    );

    let seen = fake.seen();
    let mut pages: Vec<&str> = seen.iter().map(|r| r.params["page"].as_str()).collect();
    pages.sort_unstable();
    assert_eq!(pages, vec!["1", "2", "3"]);

    for request in &seen {
        assert_eq!(request.params["method"], "user.gettoptracks");
        assert_eq!(request.params["user"], "rj");
        assert_eq!(request.params["api_key"], "test-key");
        assert_eq!(request.params["format"], "json");
        assert_eq!(request.params["limit"], "2");
        assert_eq!(request.user_agent.as_deref(), Some("dupes-tests/1.0"));
    }
}

#[test_log::test(tokio::test)]
async fn user_without_scrobbles_yields_empty_list() {
    let fake = spawn_fake(vec![chart(DataKind::Albums, vec![], 1, 0)]).await;

    let records = fake.client().fetch_all("rj", DataKind::Albums).await.unwrap();

    assert!(records.is_empty());
    assert_eq!(fake.seen().len(), 1);
    assert_eq!(fake.seen()[0].params["method"], "user.gettopalbums");
}

#[test_log::test(tokio::test)]
async fn unknown_user_is_reported_distinctly() {
    let fake = spawn_fake(Vec::new()).await;

    let err = fake
        .client()
        .fetch_all("ghost", DataKind::Albums)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UserNotFound(ref user) if user == "ghost"));
}

#[test_log::test(tokio::test)]
async fn api_errors_keep_code_and_message() {
    let fake = spawn_fake(Vec::new()).await;

    let err = fake
        .client()
        .fetch_all("locked", DataKind::Tracks)
        .await
        .unwrap_err();

    match err {
        Error::LastFMApi { code, message } => {
            assert_eq!(code, 10);
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn non_json_failure_reports_status() {
    let fake = spawn_fake(Vec::new()).await;

    let err = fake
        .client()
        .fetch_all("broken", DataKind::Tracks)
        .await
        .unwrap_err();

    match err {
        Error::UnexpectedStatus { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("exploded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn failing_later_page_fails_the_whole_fetch() {
    // page 1 claims two pages but page 2 does not exist
    let fake = spawn_fake(vec![chart(
        DataKind::Albums,
        vec![entry("Band", "Record", 3)],
        1,
        2,
    )])
    .await;

    let err = fake
        .client()
        .fetch_all("rj", DataKind::Albums)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnexpectedStatus { status: 404, .. }));
}

#[test_log::test(tokio::test)]
async fn wrong_chart_kind_is_rejected() {
    let fake = spawn_fake(three_track_pages()).await;

    let err = fake
        .client()
        .fetch_all("rj", DataKind::Albums)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::LastFMUnexpectedResponse(_)));
}

#[test_log::test(tokio::test)]
async fn scanner_groups_versions_across_pages() {
    let fake = spawn_fake(three_track_pages()).await;

    let groups = Scanner::new(fake.client())
        .scan("rj", DataKind::Tracks)
        .await
        .unwrap();

    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.base_title, "Song X");
    assert_eq!(group.artist, "Artist A");
    assert_eq!(group.version_count, 3);
    assert_eq!(group.total_playcount, 16);
    let titles: Vec<&str> = group.versions.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(titles, vec!["Song X - Remix", "Song X", "Song X (Remix)"]);
}
