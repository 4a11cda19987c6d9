//! GitHub client tests against a local mock HTTP server.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ipc_github::{CiError, CiService, GithubClient, GithubConfig, RunFilter};

const RUNS_PATH: &str = "/repos/OpenXiangShan/XiangShan/actions/runs";

fn client(server: &MockServer) -> GithubClient {
    GithubClient::new(
        GithubConfig::new("OpenXiangShan", "XiangShan", "secret-token").with_base_url(server.uri()),
    )
    .expect("client builds")
}

fn api_run(number: u64, pr: Option<u64>) -> serde_json::Value {
    let pull_requests: Vec<serde_json::Value> =
        pr.into_iter().map(|n| json!({ "number": n })).collect();
    json!({
        "id": 90_000 + number,
        "run_number": number,
        "head_sha": format!("{number:040}"),
        "head_branch": "master",
        "event": "push",
        "conclusion": "success",
        "created_at": "2024-05-01T12:00:00Z",
        "pull_requests": pull_requests,
    })
}

#[tokio::test]
async fn test_list_runs_single_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RUNS_PATH))
        .and(query_param("branch", "master"))
        .and(query_param("per_page", "2"))
        .and(query_param("page", "1"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "workflow_runs": [api_run(8, None), api_run(7, Some(3))],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let runs = client(&server)
        .list_workflow_runs(&RunFilter::branch("master"), 2)
        .await
        .unwrap();

    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].run_number, 8);
    assert_eq!(runs[0].id, 90_008);
    assert_eq!(runs[1].associated_pull_request.as_ref().map(|p| p.number), Some(3));
}

#[tokio::test]
async fn test_list_runs_paginates_until_limit() {
    let server = MockServer::start().await;
    let page_one: Vec<_> = (0..100).map(|i| api_run(500 - i, None)).collect();
    let page_two: Vec<_> = (0..100).map(|i| api_run(400 - i, None)).collect();

    Mock::given(method("GET"))
        .and(path(RUNS_PATH))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "workflow_runs": page_one })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(RUNS_PATH))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "workflow_runs": page_two })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let runs = client(&server)
        .list_workflow_runs(&RunFilter::branch("master"), 150)
        .await
        .unwrap();

    assert_eq!(runs.len(), 150);
    assert_eq!(runs[0].run_number, 500);
    assert_eq!(runs[149].run_number, 351);
}

#[tokio::test]
async fn test_list_runs_event_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RUNS_PATH))
        .and(query_param("event", "pull_request"))
        .and(query_param("status", "success"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "workflow_runs": [api_run(1, Some(9))] })),
        )
        .mount(&server)
        .await;

    let runs = client(&server)
        .list_workflow_runs(&RunFilter::successful_pull_requests(), 15)
        .await
        .unwrap();
    assert_eq!(runs.len(), 1);
}

#[tokio::test]
async fn test_list_comments_all_pages() {
    let server = MockServer::start().await;
    let comments_path = "/repos/OpenXiangShan/XiangShan/issues/42/comments";
    let full_page: Vec<_> = (0..100).map(|i| json!({ "body": format!("c{i}") })).collect();

    Mock::given(method("GET"))
        .and(path(comments_path))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_page))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(comments_path))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "body": "last" }, { "body": null }])),
        )
        .mount(&server)
        .await;

    let bodies = client(&server).list_issue_comments(42).await.unwrap();
    assert_eq!(bodies.len(), 101);
    assert_eq!(bodies[0], "c0");
    assert_eq!(bodies[100], "last");
}

#[tokio::test]
async fn test_create_comment_posts_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/OpenXiangShan/XiangShan/issues/42/comments"))
        .and(body_json(json!({ "body": "[Generated by IPC robot]\ncommit: abc" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .create_issue_comment(42, "[Generated by IPC robot]\ncommit: abc")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_commit_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/OpenXiangShan/XiangShan/commits/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "abc123",
            "commit": { "message": "Fix ROB walk\n\nDetails" },
        })))
        .mount(&server)
        .await;

    let message = client(&server).commit_message("abc123").await.unwrap();
    assert_eq!(message, "Fix ROB walk\n\nDetails");
}

#[tokio::test]
async fn test_error_status_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/OpenXiangShan/XiangShan/commits/unauthorized"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/OpenXiangShan/XiangShan/commits/limited"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/OpenXiangShan/XiangShan/commits/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/OpenXiangShan/XiangShan/commits/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(matches!(
        client.commit_message("unauthorized").await,
        Err(CiError::Auth { status: 401, .. })
    ));
    assert!(matches!(
        client.commit_message("limited").await,
        Err(CiError::RateLimited)
    ));
    match client.commit_message("broken").await {
        Err(CiError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "oops");
        }
        other => panic!("Expected Status error, got {other:?}"),
    }
    assert!(matches!(
        client.commit_message("garbled").await,
        Err(CiError::Parse(_))
    ));
}
