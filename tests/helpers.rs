#![allow(dead_code)]

use chrono::Utc;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use newswire::model::Article;

/// An in-memory article with a handle made unique across test runs, so the
/// live-database tests can share one table.
pub fn article(name: &str, body: &str) -> Article {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    Article {
        id: None,
        source: "the-guardian".to_owned(),
        handle: format!("world/{name}-{nanos}"),
        section: "World news".to_owned(),
        authors: "Jane Doe".to_owned(),
        headline: "A headline".to_owned(),
        body: body.to_owned(),
        source_url: format!("https://example.org/{name}"),
        wordcount: None,
        created_at: None,
    }
}

/// Sections listing payload with a single section served by the mock itself.
pub fn sections_body(mock: &MockServer, section_path: &str) -> Value {
    json!({
        "response": {
            "results": [
                { "apiUrl": format!("{}{}", mock.uri(), section_path) }
            ]
        }
    })
}

pub fn content_body(results: Value) -> Value {
    json!({ "response": { "results": results } })
}

pub fn raw_article(id: &str, headline: &str, body: &str) -> Value {
    json!({
        "id": id,
        "sectionName": "UK news",
        "webUrl": format!("https://example.org/{id}"),
        "fields": {
            "headline": headline,
            "body": body,
            "byline": "Jane Doe"
        }
    })
}

/// Serve the sections listing and one section's content for the day.
pub async fn mount_guardian(mock: &MockServer, section_path: &str, results: Value) {
    Mock::given(method("GET"))
        .and(path("/sections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sections_body(mock, section_path)))
        .mount(mock)
        .await;

    Mock::given(method("GET"))
        .and(path(section_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(content_body(results)))
        .mount(mock)
        .await;
}
