use anyhow::Result;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde_json::{Value, json};

mod common;

use common::server_utils::create_test_server;

#[tokio::test]
async fn test_news_search_defaults_to_tesla() -> Result<()> {
    let (server, harness) = create_test_server();

    let response = server.get("/api/news").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["articles"][0]["title"], "Headline about tesla");
    assert_eq!(body["articles"][0]["source"]["name"], "Wire");

    let queries = harness.news.queries();
    assert_eq!(queries[0].q, "tesla");
    assert_eq!(queries[0].from, None);

    Ok(())
}

#[tokio::test]
async fn test_news_search_passes_query_and_date() -> Result<()> {
    let (server, harness) = create_test_server();

    server
        .get("/api/news")
        .add_query_param("q", "solar")
        .add_query_param("from", "2024-05-01")
        .await
        .assert_status_ok();

    let query = &harness.news.queries()[0];
    assert_eq!(query.q, "solar");
    assert_eq!(query.from, NaiveDate::from_ymd_opt(2024, 5, 1));

    server
        .get("/api/news")
        .add_query_param("from", "yesterday")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_summarize_digest() -> Result<()> {
    let (server, harness) = create_test_server();
    harness.completions.reply("- point one\n- point two");

    let response = server
        .post("/api/summarize")
        .json(&json!({
            "articles": [
                { "title": "One", "description": "first" },
                { "title": "Two" }
            ]
        }))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({ "summaries": "- point one\n- point two" }));

    let request = &harness.completions.requests()[0];
    assert_eq!(request.temperature, Some(0.5));
    assert!(request.prompt.contains("1. One\nfirst"));
    assert!(request.prompt.contains("2. Two"));

    Ok(())
}

#[tokio::test]
async fn test_summarize_requires_articles() -> Result<()> {
    let (server, harness) = create_test_server();

    for path in ["/api/summarize", "/api/hf-summarize"] {
        let response = server.post(path).json(&json!({ "articles": [] })).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
    assert!(harness.completions.requests().is_empty());
    assert!(harness.summarizer.inputs().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_hf_summarize_fills_missing_summaries() -> Result<()> {
    let (server, harness) = create_test_server();
    harness.summarizer.reply(Some("Short one"));
    harness.summarizer.reply(None);

    let response = server
        .post("/api/hf-summarize")
        .json(&json!({
            "articles": [
                { "title": "A", "description": "alpha" },
                { "title": "B" }
            ]
        }))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({ "summaries": ["Short one", "Could not summarize"] }));

    assert_eq!(harness.summarizer.inputs(), vec!["A\nalpha", "B\n"]);

    Ok(())
}

#[tokio::test]
async fn test_news_summary_lifecycle() -> Result<()> {
    let (server, harness) = create_test_server();
    harness.completions.reply("Markets rallied on Tuesday.");

    let created = server
        .post("/api/news/summaries")
        .json(&json!({
            "title": "Markets rally",
            "description": "Stocks up",
            "source": "Wire",
            "url": "https://news.test/markets"
        }))
        .await;
    created.assert_status_ok();

    let summary = &created.json::<Value>()["data"]["summary"];
    assert_eq!(summary["summary"], "Markets rallied on Tuesday.");
    assert_eq!(summary["approved"], json!(false));
    assert_eq!(summary["approved_at"], Value::Null);
    let id = summary["id"].as_i64().unwrap();

    let pending: Value = server
        .get("/api/news/summaries")
        .add_query_param("approved", false)
        .await
        .json();
    assert_eq!(pending["data"]["summaries"].as_array().unwrap().len(), 1);

    let approved = server
        .post(&format!("/api/news/summaries/{id}/approve"))
        .await;
    approved.assert_status_ok();
    let approved_summary = &approved.json::<Value>()["data"]["summary"];
    assert_eq!(approved_summary["approved"], json!(true));
    assert!(approved_summary["approved_at"].is_string());

    let pending: Value = server
        .get("/api/news/summaries")
        .add_query_param("approved", false)
        .await
        .json();
    assert!(pending["data"]["summaries"].as_array().unwrap().is_empty());

    let all: Value = server.get("/api/news/summaries").await.json();
    assert_eq!(all["data"]["summaries"].as_array().unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_news_summary_errors() -> Result<()> {
    let (server, _harness) = create_test_server();

    server
        .post("/api/news/summaries")
        .json(&json!({ "description": "no title" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/news/summaries")
        .json(&json!({ "title": "Bad link", "url": "not a url" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let missing = server.post("/api/news/summaries/999/approve").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(missing.json::<Value>()["error"], "News summary not found");

    Ok(())
}
