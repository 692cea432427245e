use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use text_to_audio_backend::infrastructure::http::SECURITY_HEADERS;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ok_for_health_check(ctx: &TestContext) {
    let response = ctx.client.get("/api/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.json_body();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "Server is running");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ready_status(ctx: &TestContext) {
    let response = ctx.client.get("/api/health/ready").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.json_body();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "connected");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_in_responses(ctx: &TestContext) {
    let response = ctx.client.get("/api/health").await.unwrap();
    response.assert_header_exists("x-request-id");

    let response = ctx.client.get("/api/history").await.unwrap();
    response.assert_header_exists("x-request-id");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_allow_cross_origin_requests(ctx: &TestContext) {
    let response = ctx.client.get("/api/health").await.unwrap();

    response.assert_header_exists("access-control-allow-origin");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fall_back_to_socket_address_without_forwarding(ctx: &TestContext) {
    let response = ctx
        .client
        .without_forwarding()
        .get("/api/history")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_set_security_headers(ctx: &TestContext) {
    let response = ctx.client.get("/api/health").await.unwrap();

    for (name, value) in SECURITY_HEADERS {
        assert_eq!(
            response.header(name).map(String::as_str),
            Some(*value),
            "header {name}"
        );
    }

    // error responses carry them too
    let missing = ctx.client.get("/api/audio/missing.mp3").await.unwrap();
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        missing.header("x-content-type-options").map(String::as_str),
        Some("nosniff")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_compress_json_when_accepted(ctx: &TestContext) {
    let response = ctx
        .client
        .get_with_header("/api/audio/voices", "accept-encoding", "gzip")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.header("content-encoding").map(String::as_str),
        Some("gzip")
    );

    let plain = ctx.client.get("/api/audio/voices").await.unwrap();
    assert!(plain.header("content-encoding").is_none());
}
