//! Progress API tests.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Duration;
use pretty_assertions::assert_eq;
use serde_json::Value;

use common::fixtures;
use common::TestContext;

#[tokio::test]
async fn test_progress_stats_empty() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/api/progress").await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["level"], 1);
    assert_eq!(body["coins"], 0);
    assert_eq!(body["error_rate"], 0.0);
    assert_eq!(body["recent_activity"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_progress_stats_reflect_attempts() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let words = ctx.seed(1, &fixtures::sample_entries());

    // Warm the cache; the attempts below must invalidate it.
    server.get("/api/progress").await.assert_status_ok();

    for (word, input) in [(&words[0], "apple"), (&words[1], "watr")] {
        server
            .post("/api/spell/check")
            .json(&fixtures::spell_check_request(word.id, input))
            .await
            .assert_status_ok();
    }

    let body: Value = server.get("/api/progress").await.json();
    assert_eq!(body["total_words"], 5);
    assert_eq!(body["reviewed_words"], 2);
    assert_eq!(body["error_words"], 1);
    assert_eq!(body["error_rate"], 50.0);
    assert_eq!(body["mastery"]["familiar"], 1);
    assert_eq!(body["mastery"]["unfamiliar"], 1);
    assert_eq!(body["difficulty_distribution"]["total"], 5);

    let activity = body["recent_activity"].as_array().unwrap();
    assert_eq!(activity[6]["date"], ctx.today().to_string());
    assert_eq!(activity[6]["reviewed"], 2);
}

#[tokio::test]
async fn test_mark_studied_is_soft_touch() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let words = ctx.seed(1, &[fixtures::entry("apple", "苹果")]);

    let response = server
        .post("/api/progress/mark-studied")
        .json(&fixtures::mark_studied_request(words[0].id))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["mastery_level"], 0);
    assert_eq!(body["review_count"], 0);
    assert_eq!(body["error_count"], 0);
    assert!(body["last_reviewed"].is_null());
    assert_eq!(
        body["next_review"],
        (ctx.today() + Duration::days(1)).to_string()
    );

    let count: Value = server.get("/api/progress/review-count").await.json();
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn test_mark_studied_unknown_word() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    server
        .post("/api/progress/mark-studied")
        .json(&fixtures::mark_studied_request(12345))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_batch_update_skips_unknown_ids() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let words = ctx.seed(1, &fixtures::sample_entries());

    let body: Value = server
        .post("/api/progress/batch-update")
        .json(&fixtures::batch_update_request(&[words[0].id, 9999, words[2].id]))
        .await
        .json();

    assert_eq!(body["requested"], 3);
    assert_eq!(body["updated"], 2);
}

#[tokio::test]
async fn test_review_count_and_clear() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let words = ctx.seed(1, &fixtures::sample_entries());

    for word in &words[..3] {
        server
            .post("/api/spell/check")
            .json(&fixtures::spell_check_request(word.id, "wrong"))
            .await
            .assert_status_ok();
    }

    let count: Value = server.get("/api/progress/review-count").await.json();
    assert_eq!(count["count"], 3);

    let cleared: Value = server.post("/api/progress/clear").await.json();
    assert_eq!(cleared["removed"], 3);

    let count: Value = server.get("/api/progress/review-count").await.json();
    assert_eq!(count["count"], 0);

    let stats: Value = server.get("/api/progress").await.json();
    assert_eq!(stats["reviewed_words"], 0);
    assert_eq!(stats["total_words"], 5);
}
