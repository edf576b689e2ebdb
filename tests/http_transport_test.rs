use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use catalog::api::dto::{ListCoursesResponse, ListParams, SearchCoursesResponse, SearchParams};
use catalog::api::{HttpTransport, LIST_COURSES, SEARCH_COURSES, Transport};
use catalog::config::ApiConfig;
use catalog::controller::{CatalogController, Intent};
use catalog::error::AppError;
use catalog::executor::RequestExecutor;
use catalog::models::NewCourseRequest;
use serde_json::{Value, json};

async fn list_courses(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    let title = format!(
        "page={} size={} sort={}",
        params.get("page").cloned().unwrap_or_default(),
        params.get("size").cloned().unwrap_or_default(),
        params.get("sort").cloned().unwrap_or_default(),
    );
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({
        "success": true,
        "courses": [{ "id": 1, "title": title, "description": request_id, "tags": null }],
        "total": 1
    }))
}

async fn search_courses(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let query = params.get("query").cloned().unwrap_or_default();
    Json(json!({
        "success": true,
        "results": [{ "id": "c-9", "title": format!("match for {}", query) }]
    }))
}

async fn create_course(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "success": true, "course": { "id": 5, "title": body["title"], "tags": body["tags"] } }))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/courses", get(list_courses).post(create_course))
        .route("/api/courses/search", get(search_courses))
        .route(
            "/down/courses",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        )
        .route("/garbled/courses", get(|| async { "<html>not json</html>" }))
        .route(
            "/slow/courses",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "success": true, "courses": [] }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test backend");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://{}", addr)
}

fn transport(base: &str, prefix: &str) -> Arc<dyn Transport> {
    let config = ApiConfig::new(format!("{}{}", base, prefix)).expect("valid url");
    Arc::new(HttpTransport::new(config).expect("Failed to build transport"))
}

#[test]
fn test_config_joins_paths_with_one_slash() {
    let config = ApiConfig::new("http://localhost:8080/api/").unwrap();
    assert_eq!(config.url("/courses"), "http://localhost:8080/api/courses");
    assert_eq!(config.url("courses/search"), "http://localhost:8080/api/courses/search");
    assert!(config.timeout.is_none());
}

#[test]
fn test_config_rejects_bad_urls() {
    assert!(matches!(ApiConfig::new("not a url"), Err(AppError::Config(_))));
    assert!(matches!(ApiConfig::new("ftp://example.com"), Err(AppError::Config(_))));
}

#[tokio::test]
async fn test_list_call_sends_query_and_request_id() {
    let base = spawn_backend().await;
    let mut executor = RequestExecutor::<ListCoursesResponse>::new(LIST_COURSES, transport(&base, "/api"));

    let response = executor
        .invoke(
            Some(ListParams {
                page: 2,
                size: 12,
                sort: "rating,desc".to_string(),
            }),
            None::<()>,
        )
        .await
        .expect("list call succeeds");

    assert!(response.success);
    let course = &response.courses[0];
    assert_eq!(course.title, "page=2 size=12 sort=rating,desc");
    assert_eq!(course.description.as_deref().map(str::len), Some(36));
    assert!(course.tags.is_empty());
}

#[tokio::test]
async fn test_search_call_sends_query_text() {
    let base = spawn_backend().await;
    let mut executor =
        RequestExecutor::<SearchCoursesResponse>::new(SEARCH_COURSES, transport(&base, "/api"));

    let response = executor
        .invoke(
            Some(SearchParams {
                query: "graph theory & more".to_string(),
            }),
            None::<()>,
        )
        .await
        .unwrap();

    assert_eq!(response.results[0].title, "match for graph theory & more");
    assert_eq!(response.results[0].id.to_string(), "c-9");
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let base = spawn_backend().await;
    let transport = transport(&base, "/api");
    let mut executor = RequestExecutor::<Value>::new(catalog::api::CREATE_COURSE, transport);

    let response = executor
        .invoke(
            None::<()>,
            Some(NewCourseRequest {
                title: "Compilers".to_string(),
                description: String::new(),
                instructor: String::new(),
                tags: vec!["cs".to_string()],
            }),
        )
        .await
        .unwrap();

    assert_eq!(response["course"]["title"], "Compilers");
    assert_eq!(response["course"]["tags"], json!(["cs"]));
}

#[tokio::test]
async fn test_error_status_is_transport_failure() {
    let base = spawn_backend().await;
    let mut executor = RequestExecutor::<ListCoursesResponse>::new(LIST_COURSES, transport(&base, "/down"));

    let err = executor
        .invoke(None::<()>, None::<()>)
        .await
        .expect_err("503 must fail");

    match &err {
        AppError::Status { status, body } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_non_json_body_is_decode_failure() {
    let base = spawn_backend().await;
    let mut executor =
        RequestExecutor::<ListCoursesResponse>::new(LIST_COURSES, transport(&base, "/garbled"));

    let err = executor.invoke(None::<()>, None::<()>).await.unwrap_err();

    assert!(matches!(err, AppError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut executor = RequestExecutor::<ListCoursesResponse>::new(
        LIST_COURSES,
        transport(&format!("http://{}", addr), ""),
    );

    let err = executor.invoke(None::<()>, None::<()>).await.unwrap_err();

    assert!(matches!(err, AppError::Transport(_)));
    assert_eq!(
        err.user_message("Failed to load courses. Please try again."),
        "Failed to load courses. Please try again."
    );
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let base = spawn_backend().await;
    let config = ApiConfig::new(format!("{}/slow", base))
        .unwrap()
        .with_timeout(Some(Duration::from_millis(200)));
    let transport = Arc::new(HttpTransport::new(config).unwrap());
    let mut executor = RequestExecutor::<ListCoursesResponse>::new(LIST_COURSES, transport);

    let err = executor.invoke(None::<()>, None::<()>).await.unwrap_err();

    assert!(matches!(err, AppError::Transport(_)));
}

#[tokio::test]
async fn test_controller_over_http() {
    let base = spawn_backend().await;
    let mut controller = CatalogController::new(transport(&base, "/api"));

    let call = controller.start();
    controller.complete(call.finish().await);
    assert_eq!(
        controller.display().records[0].title,
        "page=0 size=10 sort=title,asc"
    );

    controller.apply(Intent::EditSearch("rust".to_string()));
    let call = controller.apply(Intent::SubmitSearch).unwrap();
    controller.complete(call.finish().await);
    assert_eq!(controller.display().records[0].title, "match for rust");
}
