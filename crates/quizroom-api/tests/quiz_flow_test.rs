//! End-to-end quiz flow over HTTP.

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_preview_lists_implicit_and_scenario_steps() {
    let app = common::build_test_app(common::QUIZ_SCENARIO).await;

    let (status, json) = common::get_json(app.app(), "/api/v1/scenario/preview").await;

    assert_eq!(status, StatusCode::OK);
    let mechanics: Vec<&str> = json["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["mechanic"].as_str().unwrap())
        .collect();
    assert_eq!(mechanics, ["registration", "single_choice", "leaderboard"]);
    assert_eq!(json["digest"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_correct_answer_scores_once_and_reaches_leaderboard() {
    let app = common::build_test_app(common::QUIZ_SCENARIO).await;

    // Options are shuffled at load; the preview tells where "Paris" landed.
    let (_, preview) = common::get_json(app.app(), "/api/v1/scenario/preview").await;
    let correct = preview["steps"][1]["correct_index"].as_u64().unwrap();
    assert_eq!(preview["steps"][1]["options"][correct as usize], "Paris");

    // Register on the registration step.
    let (status, json) = common::post_json(
        app.app(),
        "/api/v1/participants",
        &json!({"participant_id": "ann", "name": "Ann"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["participant"]["name"], "Ann");

    // Open the question and answer it.
    let (status, json) = common::post_empty(app.app(), "/api/v1/moderator/next").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["render"]["mechanic"], "single_choice");

    let (status, json) = common::post_json(
        app.app(),
        "/api/v1/participants/ann/selection",
        &json!({"payload": format!("mcq:{correct}")}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["accepted"], true);

    // Reveal, step back, reveal again: still scored once.
    common::post_empty(app.app(), "/api/v1/moderator/next").await;
    common::post_empty(app.app(), "/api/v1/moderator/prev").await;
    let (_, json) = common::post_empty(app.app(), "/api/v1/moderator/next").await;
    assert_eq!(json["render"]["phase"], 1);

    // Leaderboard.
    let (_, json) = common::post_empty(app.app(), "/api/v1/moderator/next").await;
    assert_eq!(json["render"]["mechanic"], "leaderboard");
    let rows = json["render"]["detail"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["participant_id"], "ann");
    assert_eq!(rows[0]["score"], 10);

    let (status, json) = common::get_json(app.app(), "/api/v1/participants/ann/prompt").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!json["prompts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reset_reloads_scenario_and_forgets_participants() {
    let app = common::build_test_app(common::QUIZ_SCENARIO).await;
    common::post_json(
        app.app(),
        "/api/v1/participants",
        &json!({"participant_id": "ann", "name": "Ann"}),
    )
    .await;
    common::post_empty(app.app(), "/api/v1/moderator/next").await;

    let (status, json) = common::post_empty(app.app(), "/api/v1/moderator/reset").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reloaded"], true);
    assert_eq!(json["steps"], 3);
    let (_, display) = common::get_json(app.app(), "/api/v1/display").await;
    assert_eq!(display["mechanic"], "registration");
    let (status, _) = common::get_json(app.app(), "/api/v1/participants/ann/prompt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_opening_a_question_notifies_registered_participants() {
    let app = common::build_test_app(common::QUIZ_SCENARIO).await;
    common::post_json(
        app.app(),
        "/api/v1/participants",
        &json!({"participant_id": "ann", "name": "Ann"}),
    )
    .await;

    common::post_empty(app.app(), "/api/v1/moderator/next").await;

    let mut delivered = Vec::new();
    for _ in 0..100 {
        delivered = app.transport.sent();
        if !delivered.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(delivered.iter().any(|(id, _)| id == "ann"));
}
