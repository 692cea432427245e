use crate::e2e::helpers;

use helpers::{api_client::DEFAULT_CLIENT_IP, TestContext};
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;
use text_to_audio_backend::domain::history::HistoryStats;

const OTHER_CLIENT_IP: &str = "203.0.113.99";

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_empty_history(ctx: &TestContext) {
    let response = ctx.client.get("/api/history").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.json_body();
    assert_eq!(body["history"], json!([]));
    assert_eq!(
        body["pagination"],
        json!({
            "currentPage": 1,
            "totalPages": 0,
            "totalItems": 0,
            "hasNext": false,
            "hasPrev": false
        })
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_paginate_newest_first(ctx: &TestContext) {
    for age in 0..25 {
        ctx.fixtures
            .create_conversion(DEFAULT_CLIENT_IP, "alloy", 1, age)
            .await
            .unwrap();
    }

    let response = ctx.client.get("/api/history?page=2&limit=10").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.json_body();
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 10);
    assert_eq!(
        body["pagination"],
        json!({
            "currentPage": 2,
            "totalPages": 3,
            "totalItems": 25,
            "hasNext": true,
            "hasPrev": true
        })
    );

    let timestamps: Vec<&str> = history
        .iter()
        .map(|r| r["createdAt"].as_str().unwrap())
        .collect();
    let parsed: Vec<chrono::DateTime<chrono::Utc>> =
        timestamps.iter().map(|t| t.parse().unwrap()).collect();
    assert!(parsed.windows(2).all(|pair| pair[0] >= pair[1]));

    let last = ctx.client.get("/api/history?page=3&limit=10").await.unwrap();
    let last_body = last.json_body();
    assert_eq!(last_body["history"].as_array().unwrap().len(), 5);
    assert_eq!(last_body["pagination"]["hasNext"], false);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_filter_history_by_voice(ctx: &TestContext) {
    ctx.fixtures.create_conversion(DEFAULT_CLIENT_IP, "alloy", 1, 3).await.unwrap();
    ctx.fixtures.create_conversion(DEFAULT_CLIENT_IP, "priya", 1, 2).await.unwrap();
    ctx.fixtures.create_conversion(DEFAULT_CLIENT_IP, "priya", 1, 1).await.unwrap();

    let response = ctx.client.get("/api/history?voice=priya").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.json_body();
    assert_eq!(body["pagination"]["totalItems"], 2);
    assert!(body["history"]
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["voice"] == "priya"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_isolate_history_between_clients(ctx: &TestContext) {
    ctx.client
        .post("/api/audio/convert", &json!({ "text": "Mine only." }))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let other = ctx.client.as_client(OTHER_CLIENT_IP);

    let response = other.get("/api/history").await.unwrap();
    assert_eq!(response.json_body()["pagination"]["totalItems"], 0);

    let stats = other.get("/api/history/stats").await.unwrap();
    assert_eq!(stats.json_body()["totalConversions"], 0);

    let own = ctx.client.get("/api/history").await.unwrap();
    let record = &own.json_body()["history"][0];
    assert_eq!(record["ownerKey"], DEFAULT_CLIENT_IP);
    assert_eq!(record["text"], "Mine only.");
    assert!(record["audioUrl"].as_str().unwrap().starts_with("/audio/"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_zeroed_stats_without_history(ctx: &TestContext) {
    let response = ctx.client.get("/api/history/stats").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.json_body(),
        &json!({
            "totalConversions": 0,
            "totalDuration": 0,
            "averageDuration": 0.0,
            "voiceStats": []
        })
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_aggregate_stats(ctx: &TestContext) {
    ctx.fixtures.create_conversion(DEFAULT_CLIENT_IP, "alloy", 3, 3).await.unwrap();
    ctx.fixtures.create_conversion(DEFAULT_CLIENT_IP, "nova", 4, 2).await.unwrap();
    ctx.fixtures.create_conversion(DEFAULT_CLIENT_IP, "nova", 5, 1).await.unwrap();
    ctx.fixtures.create_conversion(OTHER_CLIENT_IP, "echo", 60, 1).await.unwrap();

    let response = ctx.client.get("/api/history/stats").await.unwrap();
    response.assert_status(StatusCode::OK);

    let stats: HistoryStats = response.json().unwrap();
    assert_eq!(stats.total_conversions, 3);
    assert_eq!(stats.total_duration, 12);
    assert_eq!(stats.average_duration, 4.0);
    assert_eq!(stats.voice_stats.len(), 2);
    assert_eq!(stats.voice_stats[0].voice, "nova");
    assert_eq!(stats.voice_stats[0].count, 2);
    assert_eq!(stats.voice_stats[1].voice, "alloy");
    assert_eq!(stats.voice_stats[1].count, 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_delete_a_conversion(ctx: &TestContext) {
    let id = ctx
        .fixtures
        .create_conversion(DEFAULT_CLIENT_IP, "alloy", 1, 1)
        .await
        .unwrap();

    let response = ctx.client.delete(&format!("/api/history/{id}")).await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.json_body(),
        &json!({ "success": true, "message": "Conversion deleted successfully" })
    );
    assert_eq!(ctx.fixtures.count_conversions(DEFAULT_CLIENT_IP).await.unwrap(), 0);

    let again = ctx.client.delete(&format!("/api/history/{id}")).await.unwrap();
    again
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error("Conversion not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_delete_another_clients_conversion(ctx: &TestContext) {
    let id = ctx
        .fixtures
        .create_conversion(OTHER_CLIENT_IP, "alloy", 1, 1)
        .await
        .unwrap();

    let response = ctx.client.delete(&format!("/api/history/{id}")).await.unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error("Conversion not found");
    assert_eq!(ctx.fixtures.count_conversions(OTHER_CLIENT_IP).await.unwrap(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_malformed_ids(ctx: &TestContext) {
    let response = ctx.client.delete("/api/history/not-a-real-id").await.unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error("Conversion not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_clear_only_own_history(ctx: &TestContext) {
    ctx.fixtures.create_conversion(DEFAULT_CLIENT_IP, "alloy", 1, 2).await.unwrap();
    ctx.fixtures.create_conversion(DEFAULT_CLIENT_IP, "nova", 1, 1).await.unwrap();
    ctx.fixtures.create_conversion(OTHER_CLIENT_IP, "alloy", 1, 1).await.unwrap();

    let response = ctx.client.delete("/api/history").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.json_body(),
        &json!({ "success": true, "message": "Deleted 2 conversions" })
    );
    assert_eq!(ctx.fixtures.count_conversions(DEFAULT_CLIENT_IP).await.unwrap(), 0);
    assert_eq!(ctx.fixtures.count_conversions(OTHER_CLIENT_IP).await.unwrap(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_malformed_query_with_json_error(ctx: &TestContext) {
    let response = ctx.client.get("/api/history?page=abc").await.unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_prefix("Invalid query parameters");
}
