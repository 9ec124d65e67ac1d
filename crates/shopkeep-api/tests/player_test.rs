//! Integration tests for profile lookup.

mod common;

use axum::http::StatusCode;

const EDGE_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.0.0";

#[tokio::test]
async fn test_repeat_visits_are_counted() {
    // Arrange
    let ports = common::TestPorts::scripted(Vec::<String>::new());

    // Act
    let (_, first) =
        common::get_json_as(common::build_test_app(&ports), "/player/visitor-1", EDGE_UA).await;
    let (_, second) =
        common::get_json_as(common::build_test_app(&ports), "/player/visitor-1", EDGE_UA).await;
    let (status, third) =
        common::get_json(common::build_test_app(&ports), "/player/visitor-1").await;

    // Assert
    assert_eq!(first["visitCount"], 1);
    assert_eq!(first["isNew"], true);
    assert_eq!(second["visitCount"], 2);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(third["visitCount"], 3);
}

#[tokio::test]
async fn test_registered_phone_number_is_not_exposed() {
    // Arrange
    let ports = common::TestPorts::scripted(Vec::<String>::new());
    common::post_json(
        common::build_test_app(&ports),
        "/request-hints",
        Some("visitor-5"),
        &serde_json::json!({ "phoneNumber": "+15550100199" }),
    )
    .await;

    // Act
    let (status, json) =
        common::get_json(common::build_test_app(&ports), "/player/visitor-5").await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["visitCount"], 2);
    assert!(json.get("phoneNumber").is_none());
    assert!(json.get("revision").is_none());
}

#[tokio::test]
async fn test_browser_is_classified_from_user_agent() {
    let ports = common::TestPorts::scripted(Vec::<String>::new());

    let (_, edge) =
        common::get_json_as(common::build_test_app(&ports), "/player/visitor-2", EDGE_UA).await;
    let (_, none) = common::get_json(common::build_test_app(&ports), "/player/visitor-3").await;

    assert_eq!(edge["browser"], "edge");
    assert_eq!(none["browser"], "unknown");
}

#[tokio::test]
async fn test_profile_json_is_camel_case() {
    let ports = common::TestPorts::scripted(Vec::<String>::new());

    let (_, json) = common::get_json(common::build_test_app(&ports), "/player/visitor-4").await;

    for field in [
        "visitorId",
        "visitCount",
        "answerCount",
        "goodAnswerCount",
        "currentTitle",
        "unlockedTitles",
        "lastVisit",
        "createdAt",
    ] {
        assert!(json.get(field).is_some(), "missing {field}");
    }
    assert_eq!(json["unlockedTitles"][0], "Curious Apprentice");
}
