//! Assistant chat flow against a scripted model
//!
//! Covers:
//! - starting a chat stores the welcome message
//! - a save_goal tool call persists the goal and links the conversation
//! - model failures surface as ASSISTANT:INFERENCEERROR
//! - conversation listing pagination and message history

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{
    app, authed, bearer_for, build_app_state, build_app_state_with_bus, create_test_db,
    create_test_goal, create_test_user, send, text_reply, tool_reply, ScriptedModel,
};

use aiminder::models::goal::GoalStatus;
use aiminder::schemas::common::PageableRequest;

#[tokio::test]
async fn test_start_chat_returns_welcome() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "chat-1").await;
    let state = build_app_state(db);
    let bearer = bearer_for(&state, &user).await;

    let (response, body) = send(app(state), authed("POST", "/api/v1/chat", &bearer, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body["data"]["conversationId"].is_string());
    let messages = body["data"]["messages"].as_array().unwrap();
    assert!(!messages.is_empty());
    assert_eq!(messages[0]["type"], "TEXT");
}

#[tokio::test]
async fn test_send_message_runs_save_goal_tool() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "chat-2").await;
    let model = ScriptedModel::new(vec![
        tool_reply(
            "call-1",
            "save_goal",
            json!({
                "draft": {
                    "goalTitle": "Run 10k",
                    "goalTargetDate": "2030-06-01",
                    "goalDescription": "Build up to a 10k race",
                    "milestones": [{"goal": "Run 5k", "targetDate": "2030-03-01"}]
                }
            }),
        ),
        text_reply("목표를 저장했어요!"),
    ]);
    let (state, _rx) = build_app_state_with_bus(db, model.clone());
    let bearer = bearer_for(&state, &user).await;

    let started = state.assistant.start_chat(user.id).await.unwrap();
    let (response, body) = send(
        app(state.clone()),
        authed(
            "POST",
            &format!("/api/v1/chat/{}", started.conversation_id),
            &bearer,
            Some(json!({"text": "10km 달리기를 하고 싶어"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["data"]["chatType"], "ASSISTANT");
    assert_eq!(body["data"]["chat"][0]["messages"][0], "목표를 저장했어요!");
    assert_eq!(model.request_count(), 2);

    // The tool result is fed back before the final answer
    let last = model.last_request();
    assert!(last.iter().any(|m| m["role"] == "tool" && m["tool_call_id"] == "call-1"));

    let goals = state.goals.list_for_user(user.id).await.unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].title, "Run 10k");
    assert_eq!(goals[0].status, GoalStatus::Active);
    assert!(goals[0].is_ai_generated);

    let conversation = state
        .conversations
        .find_by_id(started.conversation_id)
        .await
        .unwrap();
    assert_eq!(conversation.goal_id, Some(goals[0].id));
}

#[tokio::test]
async fn test_model_failure_is_inference_error() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "chat-3").await;
    let state = build_app_state(db);
    let bearer = bearer_for(&state, &user).await;

    let started = state.assistant.start_chat(user.id).await.unwrap();
    let (response, body) = send(
        app(state),
        authed(
            "POST",
            &format!("/api/v1/chat/{}", started.conversation_id),
            &bearer,
            Some(json!({"text": "hello"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errorCode"], "ASSISTANT:INFERENCEERROR");
}

#[tokio::test]
async fn test_blank_message_is_invalid_request() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "chat-4").await;
    let state = build_app_state(db);
    let bearer = bearer_for(&state, &user).await;

    let started = state.assistant.start_chat(user.id).await.unwrap();
    let (response, body) = send(
        app(state),
        authed(
            "POST",
            &format!("/api/v1/chat/{}", started.conversation_id),
            &bearer,
            Some(json!({"text": "   "})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["errorCode"], "COMMON:INVALIDREQUEST");
}

#[tokio::test]
async fn test_foreign_conversation_is_rejected() {
    let db = create_test_db().await;
    let owner = create_test_user(&db, "chat-5").await;
    let intruder = create_test_user(&db, "chat-6").await;
    let state = build_app_state(db);
    let bearer = bearer_for(&state, &intruder).await;

    let started = state.assistant.start_chat(owner.id).await.unwrap();
    let (response, _) = send(
        app(state),
        authed(
            "GET",
            &format!("/api/v1/conversations/{}/messages", started.conversation_id),
            &bearer,
            None,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_feedback_requires_linked_goal() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "chat-7").await;
    let state = build_app_state(db);
    let bearer = bearer_for(&state, &user).await;

    let started = state.assistant.start_chat(user.id).await.unwrap();
    let (response, body) = send(
        app(state),
        authed(
            "POST",
            &format!("/api/v1/chat/{}/feedback", started.conversation_id),
            &bearer,
            None,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body["errorCode"], "ASSISTANT:CONVERSATIONNOTFOUND");
}

#[tokio::test]
async fn test_conversation_listing_is_paged() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "chat-8").await;
    let state = build_app_state(db);
    let bearer = bearer_for(&state, &user).await;

    for _ in 0..25 {
        state.conversations.create(user.id, None).await.unwrap();
    }

    let (response, body) = send(
        app(state.clone()),
        authed("GET", "/api/v1/conversations", &bearer, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
    assert_eq!(
        body["pageable"],
        json!({"page": 0, "count": 10, "totalPages": 3, "totalElements": 25})
    );

    let last = state
        .conversations
        .get(user.id, &PageableRequest::of(2, 10))
        .await
        .unwrap();
    assert_eq!(last.content.len(), 5);
}

#[tokio::test]
async fn test_message_history_is_chronological() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "chat-9").await;
    let goal = create_test_goal(&db, user.id, "Read").await;
    let model = ScriptedModel::new(vec![text_reply("first"), text_reply("second")]);
    let (state, _rx) = build_app_state_with_bus(db, model);
    let bearer = bearer_for(&state, &user).await;

    let conversation = state.conversations.create(user.id, Some(goal.id)).await.unwrap();
    state
        .assistant
        .send_message(conversation.id, user.id, "one")
        .await
        .unwrap();
    state
        .assistant
        .send_message(conversation.id, user.id, "two")
        .await
        .unwrap();

    let (_, body) = send(
        app(state),
        authed(
            "GET",
            &format!("/api/v1/conversations/{}/messages", conversation.id),
            &bearer,
            None,
        ),
    )
    .await;

    let chats = body["data"].as_array().unwrap();
    assert_eq!(chats.len(), 4);
    assert_eq!(chats[0]["chatType"], "USER");
    assert_eq!(chats[3]["chatType"], "ASSISTANT");
    assert_eq!(chats[3]["chat"][0]["messages"][0], "second");
}
