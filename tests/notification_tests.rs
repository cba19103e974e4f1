//! Notification pipeline and inbox endpoints
//!
//! Covers:
//! - feedback events persisted exactly once by the listener
//! - the daily feedback task over every goal of every active user
//! - unchecked count, single check and check-all

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{
    app, authed, bearer_for, build_app_state, build_app_state_with_bus, create_test_db,
    create_test_goal, create_test_user, send, text_reply, ScriptedModel,
};

use aiminder::schemas::common::PageableRequest;
use aiminder::services::notification::{NotificationEvent, NotificationListener};
use aiminder::services::scheduler::{FeedbackTask, PeriodicTask};
use aiminder::state::AppState;

fn feedback_event(state_user: uuid::Uuid, title: &str) -> NotificationEvent {
    NotificationEvent::Feedback {
        goal_title: title.to_string(),
        conversation_id: uuid::Uuid::new_v4(),
        receiver_id: state_user,
    }
}

/// Poll until the listener has written `expected` rows
async fn wait_for_unchecked(state: &AppState, user_id: uuid::Uuid, expected: u64) -> u64 {
    let mut count = 0;
    for _ in 0..100 {
        count = state.notifications.count_unchecked(user_id).await.unwrap();
        if count >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    count
}

#[tokio::test]
async fn test_published_event_is_persisted_once() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "noti-1").await;
    let (state, rx) = build_app_state_with_bus(db, ScriptedModel::new(vec![]));
    NotificationListener::spawn(state.notifications.clone(), rx);

    state.publisher.publish(feedback_event(user.id, "Run"));

    assert_eq!(wait_for_unchecked(&state, user.id, 1).await, 1);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let page = state
        .notifications
        .get(user.id, &PageableRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].title, "AI 비서 알림");
    assert!(page.content[0].description.contains("Run"));
}

#[tokio::test]
async fn test_feedback_task_covers_every_goal() {
    let db = create_test_db().await;
    let first = create_test_user(&db, "noti-2").await;
    let second = create_test_user(&db, "noti-3").await;
    create_test_goal(&db, first.id, "Read").await;
    create_test_goal(&db, first.id, "Write").await;
    create_test_goal(&db, second.id, "Swim").await;

    let model = ScriptedModel::new(vec![
        text_reply("좋아요"),
        text_reply("잘하고 있어요"),
        text_reply("화이팅"),
    ]);
    let (state, mut rx) = build_app_state_with_bus(db, model.clone());

    let task = FeedbackTask::new(
        state.users.clone(),
        state.goals.clone(),
        state.feedback.clone(),
    );
    task.run().await.unwrap();

    let mut events = vec![];
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 3);
    assert_eq!(model.request_count(), 3);
    assert_eq!(
        events.iter().filter(|e| e.receiver_id() == first.id).count(),
        2
    );

    // Each goal gets its own conversation holding the feedback
    let conversations = state
        .conversations
        .get(first.id, &PageableRequest::default())
        .await
        .unwrap();
    assert_eq!(conversations.total_elements, 2);
}

#[tokio::test]
async fn test_feedback_task_stops_on_first_failure() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "noti-4").await;
    create_test_goal(&db, user.id, "A").await;
    create_test_goal(&db, user.id, "B").await;

    // Only one scripted answer: the second goal fails
    let model = ScriptedModel::new(vec![text_reply("ok")]);
    let (state, mut rx) = build_app_state_with_bus(db, model);

    let task = FeedbackTask::new(
        state.users.clone(),
        state.goals.clone(),
        state.feedback.clone(),
    );
    assert!(task.run().await.is_err());
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_check_endpoints() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "noti-5").await;
    let (state, rx) = build_app_state_with_bus(db, ScriptedModel::new(vec![]));
    NotificationListener::spawn(state.notifications.clone(), rx);
    let bearer = bearer_for(&state, &user).await;
    let router = app(state.clone());

    for title in ["A", "B", "C"] {
        state.publisher.publish(feedback_event(user.id, title));
    }
    assert_eq!(wait_for_unchecked(&state, user.id, 3).await, 3);

    let (response, body) = send(
        router.clone(),
        authed("GET", "/api/v1/notifications/count", &bearer, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["data"], 3);

    let (_, body) = send(
        router.clone(),
        authed("GET", "/api/v1/notifications", &bearer, None),
    )
    .await;
    let id = body["data"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"][0]["type"], "ASSISTANT_FEEDBACK");

    let uri = format!("/api/v1/notifications/{}/check", id);
    let (response, body) = send(router.clone(), authed("PATCH", &uri, &bearer, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["data"]["checked"], true);

    // Checking twice is harmless
    let (response, _) = send(router.clone(), authed("PATCH", &uri, &bearer, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (_, body) = send(
        router.clone(),
        authed("PATCH", "/api/v1/notifications/check", &bearer, None),
    )
    .await;
    assert_eq!(body["data"], json!({"checked": 2}));
    assert_eq!(state.notifications.count_unchecked(user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_checking_unknown_notification_is_not_found() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "noti-6").await;
    let state = build_app_state(db);
    let bearer = bearer_for(&state, &user).await;

    let (response, body) = send(
        app(state),
        authed(
            "PATCH",
            &format!("/api/v1/notifications/{}/check", uuid::Uuid::new_v4()),
            &bearer,
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body["errorCode"], "NOTIFICATION:NOTIFICATIONNOTFOUND");
}
