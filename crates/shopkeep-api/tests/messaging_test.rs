//! Integration tests for hint texts and the inbound SMS webhook.

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_scroll_reports_record_of_registered_sender() {
    // Arrange
    let ports = common::TestPorts::scripted(["Score: 70\nFeedback: Aye."]);
    common::post_json(
        common::build_test_app(&ports),
        "/request-hints",
        Some("visitor-20"),
        &json!({ "phoneNumber": "+15550100777" }),
    )
    .await;
    common::post_json(
        common::build_test_app(&ports),
        "/evaluate",
        Some("visitor-20"),
        &json!({ "question": "Why?", "answer": "Because the cable was loose." }),
    )
    .await;

    // Act
    let (status, body) = common::post_form(
        common::build_test_app(&ports),
        "/sms",
        "From=%2B15550100777&Body=Scroll+please",
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("1/1"), "unexpected reply: {body}");
    assert!(body.contains("Curious Apprentice"));
}

#[tokio::test]
async fn test_wisdom_returns_tips() {
    let ports = common::TestPorts::scripted(Vec::<String>::new());

    let (status, body) = common::post_form(
        common::build_test_app(&ports),
        "/sms",
        "From=%2B15550100777&Body=wisdom",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("<?xml"));
    assert!(body.contains("Counsel of the counter:"));
}

#[tokio::test]
async fn test_hints_without_number_report_failure() {
    let ports = common::TestPorts::scripted(Vec::<String>::new());

    let (status, json) = common::post_json(
        common::build_test_app(&ports),
        "/request-hints",
        None,
        &json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert!(ports.notifier.sent().is_empty());
}
