use std::sync::Arc;

use dora_client::{ExportFormat, HttpTransport, QuantApi, TaskApi};
use dora_core::config::ApiConfig;
use dora_core::{ApiError, JobId, JobKind, NewTask, SearchFilter};
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        api_prefix: "/api/v1".into(),
        timeout_secs: Some(5),
    }
}

fn quant_api(server: &MockServer) -> QuantApi {
    QuantApi::new(Arc::new(HttpTransport::new(&api_config(server)).unwrap()))
}

#[tokio::test]
async fn search_sends_filter_and_decodes_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/quant/symbols"))
        .and(query_param("market", "CN"))
        .and(query_param("q", "bank"))
        .and(query_param("kind", "stock"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "20"))
        .and(header_exists("X-Request-Id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "success",
            "data": {
                "items": [{"symbol": "sh600036", "market": "SH", "name": "CMB"}],
                "total": 21,
                "page": 2,
                "page_size": 20
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = SearchFilter {
        query: "bank".into(),
        page: 2,
        ..SearchFilter::default()
    };
    let page = quant_api(&server).search_symbols(&filter).await.expect("search ok");
    assert_eq!(page.total, 21);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].symbol, "sh600036");
    assert_eq!(page.page, Some(2));
}

#[tokio::test]
async fn backend_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/jobs/7"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Job is running", "data": null})),
        )
        .mount(&server)
        .await;

    let err = quant_api(&server).delete_job(JobId(7)).await.unwrap_err();
    assert_eq!(err.to_string(), "Job is running");
    assert_eq!(err.status(), Some(409));
}

#[tokio::test]
async fn status_description_when_body_has_no_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jobs/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Job not found"})))
        .mount(&server)
        .await;

    let err = quant_api(&server).get_job(JobId(404)).await.unwrap_err();
    assert_eq!(err.to_string(), "request failed with status code 404");
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:1".into(),
        api_prefix: "/api/v1".into(),
        timeout_secs: Some(2),
    };
    let api = QuantApi::new(Arc::new(HttpTransport::new(&config).unwrap()));
    let err = api.list_jobs(50).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
    assert!(!err.to_string().is_empty());
}

#[tokio::test]
async fn verify_is_a_get_and_others_post_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/quant/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Job queued",
            "data": {"id": 1, "type": "verify", "status": "queued", "params": {}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/quant/grid-search"))
        .and(body_json(json!({"market": "US", "symbols": "usAAPL"})))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "message": "Job queued",
            "data": {"id": 2, "type": "grid_search", "status": "queued", "params": {"market": "US"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = quant_api(&server);
    let job = api.start_job(JobKind::Verify, &json!(null)).await.unwrap();
    assert_eq!(job.id, JobId(1));

    let job = api
        .start_job(JobKind::GridSearch, &json!({"market": "US", "symbols": "usAAPL"}))
        .await
        .unwrap();
    assert_eq!(job.id, JobId(2));
    assert_eq!(job.job_type, "grid_search");
}

#[tokio::test]
async fn missing_data_member_is_an_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jobs/"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "success"})))
        .mount(&server)
        .await;

    let jobs = quant_api(&server).list_jobs(50).await.unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn export_returns_raw_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jobs/5/export"))
        .and(query_param("format", "csv"))
        .and(query_param("section", "orders"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("symbol,qty\nusAAPL,10\n", "text/csv"))
        .mount(&server)
        .await;

    let body = quant_api(&server)
        .export_job(JobId(5), ExportFormat::Csv, Some("orders"))
        .await
        .unwrap();
    assert_eq!(body, "symbol,qty\nusAAPL,10\n");
}

#[tokio::test]
async fn symbol_lookup_and_import() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/quant/symbols/usAAPL"))
        .and(query_param("market", "US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "success",
            "data": {"symbol": "usAAPL", "market": "US", "name": "Apple", "kind": "stock"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/quant/symbols/import"))
        .and(body_json(json!({"market": "US"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "success",
            "data": {"imported": 8123}
        })))
        .mount(&server)
        .await;

    let api = quant_api(&server);
    let record = api.get_symbol(" usAAPL ", "US").await.unwrap();
    assert_eq!(record.name.as_deref(), Some("Apple"));
    let imported = api.import_symbols("US").await.unwrap();
    assert_eq!(imported["imported"], 8123);
}

#[tokio::test]
async fn unknown_symbol_is_a_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/quant/symbols/zz000000"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "symbol not found"})))
        .mount(&server)
        .await;

    let err = quant_api(&server).get_symbol("zz000000", "CN").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "symbol not found");
}

#[tokio::test]
async fn features_null_data_is_an_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/quant/features"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "success", "data": null})))
        .mount(&server)
        .await;

    let features = quant_api(&server).features().await.unwrap();
    assert_eq!(features, json!({}));
}

#[tokio::test]
async fn health_lives_outside_the_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "ok",
            "data": {"service": "Doraemon API"}
        })))
        .mount(&server)
        .await;

    let health = quant_api(&server).health().await.unwrap();
    assert_eq!(health["service"], "Doraemon API");
}

#[tokio::test]
async fn task_crud_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tasks/"))
        .and(body_json(json!({"title": "rebalance", "completed": false})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": 4, "title": "rebalance", "description": null, "completed": false}
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/tasks/4"))
        .and(body_json(json!({"completed": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 4}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/tasks/4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = TaskApi::new(Arc::new(HttpTransport::new(&api_config(&server)).unwrap()));
    let task = api.create(&NewTask::new("rebalance")).await.unwrap();
    assert_eq!(task.id, 4);
    api.set_completed(4, true).await.unwrap();
    api.delete(4).await.unwrap();
}
