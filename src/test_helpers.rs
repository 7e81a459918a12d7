use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::api::client::RestClient;
use crate::api::types::Thought;

pub const OWNER: &str = "user-1";

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub fn make_thought(id: &str, date: &str, created_at: &str) -> Thought {
    Thought {
        id: id.into(),
        user_id: OWNER.into(),
        date: day(date),
        content: format!("thought {}", id),
        hidden: false,
        created_at: ts(created_at),
        updated_at: ts(created_at),
    }
}

pub fn thought_json(id: &str, date: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "user_id": OWNER,
        "date": date,
        "content": format!("thought {}", id),
        "hidden": false,
        "created_at": created_at,
        "updated_at": created_at,
    })
}

pub async fn mock_client() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let client = RestClient::new(&server.uri(), "anon-key", "test-token");
    (server, client)
}

/// Answers the distinct-date probe. `before` selects the cursor variant.
pub async fn mount_date_probe(server: &MockServer, before: Option<&str>, dates: &[&str]) {
    let rows: Vec<Value> = dates.iter().map(|d| json!({ "date": d })).collect();
    let mock = Mock::given(method("GET"))
        .and(path("/rest/v1/thoughts"))
        .and(query_param("select", "date"));
    let mock = match before {
        Some(cursor) => mock.and(query_param("date", format!("lt.{}", cursor))),
        None => mock.and(query_param_is_missing("date")),
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

/// Answers the row fetch for exactly `dates` (in request order).
pub async fn mount_thoughts_on_dates(server: &MockServer, dates: &[&str], rows: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/thoughts"))
        .and(query_param("select", "*"))
        .and(query_param("date", format!("in.({})", dates.join(","))))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

/// Three thoughts on 2024-01-02 (t1 < t2 < t3) and one on 2024-01-01.
pub fn scenario_rows() -> Vec<Value> {
    vec![
        thought_json("t3", "2024-01-02", "2024-01-02T11:00:00Z"),
        thought_json("t2", "2024-01-02", "2024-01-02T10:00:00Z"),
        thought_json("t1", "2024-01-02", "2024-01-02T09:00:00Z"),
        thought_json("old", "2024-01-01", "2024-01-01T12:00:00Z"),
    ]
}

pub async fn mount_scenario(server: &MockServer) {
    mount_date_probe(
        server,
        None,
        &["2024-01-02", "2024-01-02", "2024-01-02", "2024-01-01"],
    )
    .await;
    mount_thoughts_on_dates(server, &["2024-01-02", "2024-01-01"], scenario_rows()).await;
}
