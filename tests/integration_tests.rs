// Integration tests for HMA Console workflows against a mocked HMA API

use actix_web::{test, web, App};
use hma_console::config::{DashboardSettings, UploadSettings};
use hma_console::core::{
    ContentSubmission, QuerySubmission, RemovalStatus, RemovalTarget, StatCardView, TimeSpan,
    UploadedFile,
};
use hma_console::models::{ContentId, CreateExchangeRequest, EnabledRatio, FormInput};
use hma_console::routes::{self, AppState};
use hma_console::{Console, ConsoleError, HmaClient};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn console_for(server: &ServerGuard) -> Console {
    console_with_dashboard(server, DashboardSettings::default())
}

fn console_with_dashboard(server: &ServerGuard, dashboard: DashboardSettings) -> Console {
    let hma = HmaClient::new(server.url(), Some(Duration::from_secs(5))).unwrap();
    Console::new(hma, dashboard)
}

/// Response body that is written only after `delay`
fn delayed_body(
    body: &'static str,
    delay: Duration,
) -> impl Fn(&mut dyn Write) -> std::io::Result<()> + Send + Sync + 'static {
    move |w| {
        std::thread::sleep(delay);
        w.write_all(body.as_bytes())
    }
}

fn hash_target(value: &str) -> RemovalTarget {
    RemovalTarget::Hash {
        signal_type: "pdq".to_string(),
        signal_value: value.to_string(),
    }
}

#[tokio::test]
async fn test_remove_by_hash_deletes_each_found_id_once() {
    let mut server = Server::new_async().await;

    let find = server
        .mock("POST", "/ui/bank/TX_BANK/content/find")
        .match_body(Matcher::Json(json!({"signal_type": "pdq", "signal_value": "facd"})))
        .with_header("content-type", "application/json")
        .with_body(r#"{"content_ids": ["a", "b", "c"]}"#)
        .expect(1)
        .create_async()
        .await;
    let delete_a = server
        .mock("DELETE", "/c/bank/TX_BANK/content/a")
        .with_body(r#"{"deleted": 1}"#)
        .expect(1)
        .create_async()
        .await;
    let delete_b = server
        .mock("DELETE", "/c/bank/TX_BANK/content/b")
        .with_status(500)
        .with_body("boom")
        .expect(1)
        .create_async()
        .await;
    let delete_c = server
        .mock("DELETE", "/c/bank/TX_BANK/content/c")
        .with_body(r#"{"deleted": 1}"#)
        .expect(1)
        .create_async()
        .await;

    let console = console_for(&server);
    let summary = console
        .remove_content("TX_BANK", &hash_target("facd"))
        .await
        .unwrap();

    find.assert_async().await;
    delete_a.assert_async().await;
    delete_b.assert_async().await;
    delete_c.assert_async().await;

    assert_eq!(summary.removed, 2);
    assert_eq!(summary.status, RemovalStatus::Removed);
    assert_eq!(
        summary.content_ids,
        vec![ContentId::new("a"), ContentId::new("b"), ContentId::new("c")]
    );
    assert!(summary.results[0].success);
    assert!(!summary.results[1].success);
    assert!(summary.results[1]
        .error
        .as_deref()
        .unwrap()
        .starts_with("HTTP 500"));
    assert!(summary.results[2].success);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deletes_run_one_at_a_time_in_find_order() {
    let mut server = Server::new_async().await;
    let log = Arc::new(Mutex::new(Vec::new()));

    server
        .mock("POST", "/ui/bank/TX_BANK/content/find")
        .with_body(r#"{"content_ids": ["c", "a", "b"]}"#)
        .expect(1)
        .create_async()
        .await;
    for id in ["a", "b", "c"] {
        let log = Arc::clone(&log);
        server
            .mock("DELETE", format!("/c/bank/TX_BANK/content/{}", id).as_str())
            .with_chunked_body(move |w| {
                log.lock().unwrap().push(format!("start {}", id));
                std::thread::sleep(Duration::from_millis(50));
                log.lock().unwrap().push(format!("end {}", id));
                w.write_all(br#"{"deleted": 1}"#)
            })
            .expect(1)
            .create_async()
            .await;
    }

    let console = console_for(&server);
    let summary = console
        .remove_content("TX_BANK", &hash_target("facd"))
        .await
        .unwrap();

    assert_eq!(summary.removed, 3);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["start c", "end c", "start a", "end a", "start b", "end b"]
    );
}

#[tokio::test]
async fn test_empty_find_issues_no_deletes() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/ui/bank/TX_BANK/content/find")
        .with_body(r#"{"content_ids": []}"#)
        .create_async()
        .await;
    let deletes = server
        .mock("DELETE", Matcher::Regex(r"^/c/bank/".to_string()))
        .expect(0)
        .create_async()
        .await;

    let console = console_for(&server);
    let target = RemovalTarget::Url {
        url: "https://example.com/cat.jpg".to_string(),
        content_type: "photo".parse().unwrap(),
    };
    let err = console.remove_content("TX_BANK", &target).await.unwrap_err();

    deletes.assert_async().await;
    assert!(matches!(err, ConsoleError::NothingToRemove(_)));
    assert_eq!(
        err.to_string(),
        "No matching content found for the provided URL"
    );
}

#[tokio::test]
async fn test_remove_by_id_skips_find() {
    let mut server = Server::new_async().await;

    let find = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/c/bank/TX_BANK/content/42")
        .with_status(404)
        .with_body(r#"{"message": "content not found"}"#)
        .expect(1)
        .create_async()
        .await;

    let console = console_for(&server);
    let summary = console
        .remove_content("TX_BANK", &RemovalTarget::Id(ContentId::new("42")))
        .await
        .unwrap();

    find.assert_async().await;
    delete.assert_async().await;
    assert_eq!(summary.removed, 0);
    assert_eq!(summary.status, RemovalStatus::RemovalFailed);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bank_lookups_run_concurrently() {
    let mut server = Server::new_async().await;
    let delay = Duration::from_millis(300);

    for name in ["A", "B", "C"] {
        let body = match name {
            "A" => r#"{"name": "A", "matching_enabled_ratio": 1.0}"#,
            "B" => r#"{"name": "B", "matching_enabled_ratio": 0.5}"#,
            _ => r#"{"name": "C", "matching_enabled_ratio": 0.0}"#,
        };
        server
            .mock("GET", format!("/c/bank/{}", name).as_str())
            .with_chunked_body(delayed_body(body, delay))
            .expect(1)
            .create_async()
            .await;
    }

    let console = console_for(&server);
    let names = vec!["A".to_string(), "B".to_string(), "C".to_string()];
    let started = Instant::now();
    let ratios = console.resolve_banks(&names).await;
    let elapsed = started.elapsed();

    assert_eq!(ratios.len(), 3);
    assert_eq!(ratios["B"], EnabledRatio::Known(0.5));
    assert!(
        elapsed < delay * 2,
        "three lookups took {:?}, expected them to overlap",
        elapsed
    );
}

#[tokio::test]
async fn test_failed_bank_lookup_renders_unknown() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/ui/query_hash")
        .match_body(Matcher::Regex(r#"name="bypass_enabled_ratio"\s+false"#.to_string()))
        .with_body(
            json!({
                "banks": ["A", "B", "C"],
                "matches": [
                    {"bank_name": "A", "content_id": 1, "signal_type": "pdq", "distance": 0},
                    {"bank_name": "B", "content_id": 2, "signal_type": "pdq", "distance": 4},
                    {"bank_name": "C", "content_id": 3, "signal_type": "pdq", "distance": "16"}
                ],
                "hashes": {"pdq": "facd"}
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/c/bank/A")
        .with_body(r#"{"name": "A", "matching_enabled_ratio": 1.0}"#)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/c/bank/B")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/c/bank/C")
        .with_body(r#"{"name": "C", "matching_enabled_ratio": 0.25}"#)
        .expect(1)
        .create_async()
        .await;

    let console = console_for(&server);
    let submission = QuerySubmission::new(ContentSubmission::hash("pdq", "facd").unwrap(), false);
    let view = console.query(&submission).await.unwrap();

    assert_eq!(view.matches.len(), 3);
    assert_eq!(view.matches[0].enabled_ratio, "100.0");
    assert_eq!(view.matches[1].enabled_ratio, "Unknown");
    assert_eq!(view.matches[2].enabled_ratio, "25.0");
    assert!(view.matches[2].warning.is_some());
    assert_eq!(view.matches[2].distance, "16");
}

#[tokio::test]
async fn test_duplicate_banks_looked_up_once() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/ui/query_url")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="url"\s+https://example.com/a.jpg"#.to_string()),
            Matcher::Regex(r#"name="bypass_enabled_ratio"\s+true"#.to_string()),
        ]))
        .with_body(
            json!({
                "banks": ["A", "A"],
                "matches": [
                    {"bank_name": "A", "content_id": 1, "signal_type": "pdq", "distance": 0},
                    {"bank_name": "A", "content_id": 2, "signal_type": "pdq", "distance": 1}
                ],
                "hashes": {}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let bank = server
        .mock("GET", "/c/bank/A")
        .with_body(r#"{"name": "A", "matching_enabled_ratio": 1.0}"#)
        .expect(1)
        .create_async()
        .await;

    let console = console_for(&server);
    let submission = QuerySubmission::new(
        ContentSubmission::url("https://example.com/a.jpg", Some("photo")).unwrap(),
        true,
    );
    let view = console.query(&submission).await.unwrap();

    bank.assert_async().await;
    assert_eq!(view.matches.len(), 2);
    assert_eq!(view.matched_banks, vec!["A"]);
}

fn exchange_schema_body() -> String {
    json!({
        "config_schema": {
            "fields": [
                {"name": "privacy_group", "type": "number", "required": true},
                {"name": "tags", "type": "set_of_number"},
                {"name": "fetch_all", "type": "boolean"}
            ]
        },
        "credentials_schema": {
            "fields": [{"name": "api_token", "type": "string", "required": true}]
        }
    })
    .to_string()
}

fn exchange_request(credentials: BTreeMap<String, FormInput>) -> CreateExchangeRequest {
    CreateExchangeRequest {
        api: "fb_threatexchange".to_string(),
        bank: " tx_bank ".to_string(),
        config: BTreeMap::from([
            ("privacy_group".to_string(), FormInput::Text("1234".to_string())),
            ("tags".to_string(), FormInput::Text("1, 2, bad, 3".to_string())),
        ]),
        credentials,
    }
}

#[tokio::test]
async fn test_credential_failure_skips_exchange_creation() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/c/exchanges/api/fb_threatexchange/schema")
        .with_body(exchange_schema_body())
        .create_async()
        .await;
    let credentials = server
        .mock("POST", "/c/exchanges/api/fb_threatexchange")
        .with_status(400)
        .with_body(r#"{"message": "invalid token"}"#)
        .expect(1)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/c/exchanges")
        .expect(0)
        .create_async()
        .await;

    let console = console_for(&server);
    let request = exchange_request(BTreeMap::from([(
        "api_token".to_string(),
        FormInput::Text("secret".to_string()),
    )]));
    let err = console.create_exchange(&request).await.unwrap_err();

    credentials.assert_async().await;
    create.assert_async().await;
    assert!(matches!(err, ConsoleError::CredentialsRejected { .. }));
    assert_eq!(err.to_string(), "Failed to set credentials: invalid token");
}

#[tokio::test]
async fn test_exchange_created_with_coerced_config() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/c/exchanges/api/fb_threatexchange/schema")
        .with_body(exchange_schema_body())
        .create_async()
        .await;
    let credentials = server
        .mock("POST", "/c/exchanges/api/fb_threatexchange")
        .match_body(Matcher::Json(json!({"credential_json": {"api_token": "secret"}})))
        .with_body(r#"{"supports_authentification": true, "has_set_authentification": true}"#)
        .expect(1)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/c/exchanges")
        .match_body(Matcher::Json(json!({
            "api": "fb_threatexchange",
            "bank": "TX_BANK",
            "api_json": {"privacy_group": 1234, "tags": [1, 2, 3], "fetch_all": false}
        })))
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let console = console_for(&server);
    let request = exchange_request(BTreeMap::from([(
        "api_token".to_string(),
        FormInput::Text("secret".to_string()),
    )]));
    let created = console.create_exchange(&request).await.unwrap();

    credentials.assert_async().await;
    create.assert_async().await;
    assert_eq!(created.bank, "TX_BANK");
    assert!(created.credentials_set);
}

#[tokio::test]
async fn test_blank_credentials_are_not_sent() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/c/exchanges/api/fb_threatexchange/schema")
        .with_body(exchange_schema_body())
        .create_async()
        .await;
    let credentials = server
        .mock("POST", "/c/exchanges/api/fb_threatexchange")
        .expect(0)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/c/exchanges")
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let console = console_for(&server);
    let request = exchange_request(BTreeMap::from([(
        "api_token".to_string(),
        FormInput::Text("   ".to_string()),
    )]));
    let created = console.create_exchange(&request).await.unwrap();

    credentials.assert_async().await;
    create.assert_async().await;
    assert!(!created.credentials_set);
}

#[tokio::test]
async fn test_invalid_bank_name_makes_no_calls() {
    let mut server = Server::new_async().await;
    let any = server.mock("GET", Matcher::Any).expect(0).create_async().await;

    let console = console_for(&server);
    let mut request = exchange_request(BTreeMap::new());
    request.bank = "tx-bank".to_string();
    let err = console.create_exchange(&request).await.unwrap_err();

    any.assert_async().await;
    assert_eq!(
        err.to_string(),
        "Bank name must be all uppercase and snake case (e.g. MY_BANK)"
    );
}

#[tokio::test]
async fn test_add_content_by_url_uses_query_string() {
    let mut server = Server::new_async().await;

    let add = server
        .mock("POST", "/c/bank/TX_BANK/content")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("url".into(), "https://example.com/a b.jpg".into()),
            Matcher::UrlEncoded("content_type".into(), "photo".into()),
        ]))
        .with_body(r#"{"id": 17, "signals": {"pdq": "facd"}}"#)
        .expect(1)
        .create_async()
        .await;

    let console = console_for(&server);
    let content = ContentSubmission::url("https://example.com/a b.jpg", Some("photo")).unwrap();
    let added = console.add_content("TX_BANK", &content).await.unwrap();

    add.assert_async().await;
    assert_eq!(added.content_id, ContentId::new("17"));
    assert_eq!(added.signals["pdq"], "facd");
}

#[tokio::test]
async fn test_add_hash_posts_signal_map() {
    let mut server = Server::new_async().await;

    let add = server
        .mock("POST", "/c/bank/TX_BANK/signal")
        .match_body(Matcher::Json(json!({"pdq": "facd"})))
        .with_body(r#"{"id": 3, "signals": {"pdq": "facd"}}"#)
        .expect(1)
        .create_async()
        .await;

    let console = console_for(&server);
    let content = ContentSubmission::hash("pdq", "facd").unwrap();
    console.add_content("TX_BANK", &content).await.unwrap();
    add.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stat_cards_load_concurrently() {
    let mut server = Server::new_async().await;
    let delay = Duration::from_millis(400);

    for name in ["hashes", "matches"] {
        server
            .mock("GET", "/stats/")
            .match_query(Matcher::UrlEncoded("stat_name".into(), name.into()))
            .with_chunked_body(delayed_body(
                r#"{"card": {"time_span": "24h", "time_span_count": 3, "graph_data": []}}"#,
                delay,
            ))
            .expect(1)
            .create_async()
            .await;
    }

    let console = console_for(&server);
    let started = Instant::now();
    let view = console.dashboard(TimeSpan::Day).await;
    let elapsed = started.elapsed();

    assert!(view.is_settled());
    assert!(
        elapsed < delay * 2 - Duration::from_millis(100),
        "two stat cards took {:?}, expected them to overlap",
        elapsed
    );
}

#[tokio::test]
async fn test_dashboard_isolates_failed_cards() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/stats/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("stat_name".into(), "hashes".into()),
            Matcher::UrlEncoded("time_span".into(), "7d".into()),
        ]))
        .with_body(
            json!({"card": {"time_span": "7d", "time_span_count": 1508, "graph_data": [[1, 3.0], [2, 4.0], [3, 5.0]]}})
                .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/stats/")
        .match_query(Matcher::UrlEncoded("stat_name".into(), "matches".into()))
        .with_status(503)
        .create_async()
        .await;

    let dashboard = DashboardSettings {
        metrics_url: Some("https://metrics.example.com".to_string()),
        ..DashboardSettings::default()
    };
    let console = console_with_dashboard(&server, dashboard);
    let view = console.dashboard(TimeSpan::Week).await;

    assert!(view.is_settled());
    match &view.cards[0].view {
        StatCardView::Ready(card) => {
            assert_eq!(card.title, "Photos Processed");
            assert_eq!(card.count_text, "1.5K");
            assert_eq!(card.span_label, "in the last 7 days");
            assert_eq!(card.graph.values, vec![0.0, 4.0, 0.0]);
        }
        other => panic!("unexpected card {other:?}"),
    }
    match &view.cards[1].view {
        StatCardView::Unavailable { message } => {
            assert!(message.contains("https://metrics.example.com"))
        }
        other => panic!("unexpected card {other:?}"),
    }
}

#[tokio::test]
async fn test_compare_hashes_both_photos() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/h/hash")
        .match_body(Matcher::Regex("left-bytes".to_string()))
        .with_body(r#"{"pdq": "aaaa", "md5": "1111"}"#)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("POST", "/h/hash")
        .match_body(Matcher::Regex("right-bytes".to_string()))
        .with_body(r#"{"pdq": "bbbb"}"#)
        .expect(1)
        .create_async()
        .await;
    let compare = server
        .mock("POST", "/m/compare")
        .match_body(Matcher::Json(json!({"pdq": ["aaaa", "bbbb"]})))
        .with_body(r#"{"pdq": [true, {"distance": 9}]}"#)
        .expect(1)
        .create_async()
        .await;

    let console = console_for(&server);
    let left = UploadedFile {
        file_name: "left.jpg".to_string(),
        bytes: b"left-bytes".to_vec(),
    };
    let right = UploadedFile {
        file_name: "right.jpg".to_string(),
        bytes: b"right-bytes".to_vec(),
    };
    let view = console.compare_files(&left, &right).await.unwrap();

    compare.assert_async().await;
    assert_eq!(view.rows.len(), 1);
    assert!(view.rows[0].matched);
    assert_eq!(view.rows[0].distance, "9");
    assert_eq!(view.left.len(), 2);
}

// HTTP surface

fn app_state(server: &ServerGuard) -> AppState {
    AppState {
        console: Arc::new(console_for(server)),
        upload: UploadSettings::default(),
    }
}

#[actix_web::test]
async fn test_route_invalid_hash_is_rejected_before_upstream() {
    let mut server = Server::new_async().await;
    let upstream = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/query/hash")
        .set_json(json!({"signal_type": "pdq", "signal_value": "not-hex"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(
        body["message"],
        "Please enter a valid hexadecimal hash value (only letters a-f and numbers 0-9)"
    );
    upstream.assert_async().await;
}

#[actix_web::test]
async fn test_route_remove_nothing_found() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/ui/bank/TX_BANK/content/find")
        .with_body(r#"{"content_ids": []}"#)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/banks/TX_BANK/remove")
        .set_json(json!({"by": "hash", "signal_type": "pdq", "signal_value": "facd"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "no_matching_content");
    assert_eq!(body["message"], "No matching content found for the provided hash");
}

#[actix_web::test]
async fn test_route_upstream_error_carries_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/c/banks")
        .with_status(503)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/banks").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 502);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "upstream_error");
    assert_eq!(body["upstream_status"], 503);
}

#[actix_web::test]
async fn test_route_bank_name_check() {
    let server = Server::new_async().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/exchanges/bank-name")
        .set_json(json!({"bank": " my_bank "}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["normalized"], "MY_BANK");
    assert_eq!(body["valid"], true);
}

#[actix_web::test]
async fn test_route_query_file_forwards_upload() {
    let mut server = Server::new_async().await;
    let query = server
        .mock("POST", "/ui/query")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="photo"; filename="cat.jpg""#.to_string()),
            Matcher::Regex(r#"name="bypass_enabled_ratio"\s+true"#.to_string()),
        ]))
        .with_body(r#"{"banks": [], "matches": [], "hashes": {"pdq": "facd"}}"#)
        .expect(1)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server)))
            .configure(routes::configure_routes),
    )
    .await;

    let boundary = "console-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"content_type\"\r\n\r\nphoto\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"bypass_enabled_ratio\"\r\n\r\ntrue\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cat.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\nnot-really-a-jpeg\r\n--{b}--\r\n",
        b = boundary
    );
    let req = test::TestRequest::post()
        .uri("/api/v1/query/file")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let view: Value = test::read_body_json(resp).await;
    assert_eq!(view["hashes"][0]["signal_type"], "pdq");
    query.assert_async().await;
}

fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &str)]) -> String {
    let mut body = String::new();
    for (name, file_name, content) in parts {
        body.push_str(&format!("--{}\r\n", boundary));
        match file_name {
            Some(file_name) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                name, file_name
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                name
            )),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", boundary));
    body
}

#[actix_web::test]
async fn test_route_upload_over_limit_is_rejected() {
    let mut server = Server::new_async().await;
    let upstream = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let state = AppState {
        upload: UploadSettings { max_bytes: 16 },
        ..app_state(&server)
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let boundary = "console-limit-boundary";
    let oversized = "x".repeat(17);
    let body = multipart_body(
        boundary,
        &[
            ("content_type", None, "photo"),
            ("file", Some("big.jpg"), oversized.as_str()),
        ],
    );
    let req = test::TestRequest::post()
        .uri("/api/v1/query/file")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_upload");
    upstream.assert_async().await;
}

#[actix_web::test]
async fn test_route_upload_skips_unused_parts() {
    let mut server = Server::new_async().await;
    let query = server
        .mock("POST", "/ui/query")
        .match_body(Matcher::Regex(r#"filename="ok.jpg""#.to_string()))
        .with_body(r#"{"banks": [], "matches": [], "hashes": {}}"#)
        .expect(1)
        .create_async()
        .await;

    let state = AppState {
        upload: UploadSettings { max_bytes: 16 },
        ..app_state(&server)
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let boundary = "console-skip-boundary";
    let notes = "n".repeat(64);
    let file = "x".repeat(16);
    let body = multipart_body(
        boundary,
        &[
            ("notes", None, notes.as_str()),
            ("content_type", None, "photo"),
            ("file", Some("ok.jpg"), file.as_str()),
        ],
    );
    let req = test::TestRequest::post()
        .uri("/api/v1/query/file")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    query.assert_async().await;
}
