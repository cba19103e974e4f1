use chrono::{Duration, Local};
use uuid::Uuid;

use super::{Assistant, ToolContext};
use crate::error::{AssistantError, Result};
use crate::models::chat::ChatType;
use crate::models::goal;
use crate::models::schedule::{self, ScheduleStatus};
use crate::schemas::assistant::ChatResponse;
use crate::services::conversation::ConversationService;
use crate::services::goal::GoalService;
use crate::services::notification::{NotificationEvent, NotificationPublisher};
use crate::services::schedule::{local_day_bounds, ScheduleService};

#[derive(Clone)]
pub struct FeedbackService {
    goals: GoalService,
    schedules: ScheduleService,
    conversations: ConversationService,
    publisher: NotificationPublisher,
    assistant: Assistant,
}

impl FeedbackService {
    pub fn new(
        goals: GoalService,
        schedules: ScheduleService,
        conversations: ConversationService,
        publisher: NotificationPublisher,
        assistant: Assistant,
    ) -> Self {
        Self {
            goals,
            schedules,
            conversations,
            publisher,
            assistant,
        }
    }

    /// Produce, store and announce feedback on one goal
    pub async fn feedback_for_goal(&self, user_id: Uuid, found: &goal::Model) -> Result<ChatResponse> {
        let conversation = self
            .conversations
            .find_or_create_for_goal(user_id, found.id)
            .await?;

        let today = Local::now().date_naive();
        let yesterday = today - Duration::days(1);
        let (y_start, y_end) = local_day_bounds(yesterday);
        let (t_start, t_end) = local_day_bounds(today);
        let yesterday_schedules = self
            .schedules
            .find_for_goal_between(found.id, y_start, y_end)
            .await?;
        let today_schedules = self
            .schedules
            .find_for_goal_between(found.id, t_start, t_end)
            .await?;

        let ctx = ToolContext {
            conversation_id: conversation.id,
            user_id,
            goal_id: Some(found.id),
        };
        let prompt = feedback_prompt(found, &yesterday_schedules, &today_schedules);
        let response = self.assistant.respond(&ctx, &[], &prompt).await?;

        self.conversations
            .save_assistant_chat(conversation.id, &response)
            .await?;
        self.publisher.publish(NotificationEvent::Feedback {
            goal_title: found.title.clone(),
            conversation_id: conversation.id,
            receiver_id: user_id,
        });

        tracing::debug!(goal_id = %found.id, conversation_id = %conversation.id, "Feedback stored");
        Ok(ChatResponse {
            conversation_id: conversation.id,
            chat: response.responses,
            chat_type: ChatType::Assistant,
        })
    }

    /// On-demand feedback for the goal linked to a conversation
    pub async fn feedback(&self, conversation_id: Uuid, user_id: Uuid) -> Result<ChatResponse> {
        let not_found = || AssistantError::ConversationNotFound(conversation_id);

        let conversation = self.conversations.find_by_id(conversation_id).await?;
        if conversation.user_id != user_id {
            return Err(not_found().into());
        }
        let goal_id = conversation.goal_id.ok_or_else(not_found)?;
        let found = self.goals.find_by_id(goal_id).await?.ok_or_else(not_found)?;

        self.feedback_for_goal(user_id, &found).await
    }
}

fn describe(schedules: &[schedule::Model]) -> String {
    if schedules.is_empty() {
        return "- 없음".to_string();
    }
    schedules
        .iter()
        .map(|s| {
            let state = match s.status {
                ScheduleStatus::Completed => "완료",
                ScheduleStatus::Ready => "미완료",
            };
            format!(
                "- {} ({}, {} ~ {})",
                s.title,
                state,
                s.start_date.with_timezone(&Local).format("%m-%d %H:%M"),
                s.end_date.with_timezone(&Local).format("%m-%d %H:%M"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn feedback_prompt(
    found: &goal::Model,
    yesterday: &[schedule::Model],
    today: &[schedule::Model],
) -> String {
    format!(
        "목표: {}\n목표 설명: {}\n목표 날짜: {}\n\n어제 일정:\n{}\n\n오늘 일정:\n{}",
        found.title,
        found.description.as_deref().unwrap_or("없음"),
        found.target_date,
        describe(yesterday),
        describe(today),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn goal_model() -> goal::Model {
        goal::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Run 5k".to_string(),
            description: None,
            target_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            is_ai_generated: true,
            status: crate::models::goal::GoalStatus::Active,
            image_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_prompt_lists_schedule_state() {
        let found = goal_model();
        let done = schedule::Model {
            id: Uuid::new_v4(),
            goal_id: found.id,
            user_id: found.user_id,
            title: "jog".to_string(),
            description: None,
            status: ScheduleStatus::Completed,
            start_date: Utc::now(),
            end_date: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };

        let prompt = feedback_prompt(&found, &[done], &[]);
        assert!(prompt.contains("목표: Run 5k"));
        assert!(prompt.contains("- jog (완료"));
        assert!(prompt.ends_with("오늘 일정:\n- 없음"));
    }
}
