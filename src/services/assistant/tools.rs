//! Actions the model may invoke while answering.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::goal::GoalStatus;
use crate::schemas::goal::{GoalResponse, NewGoal};
use crate::schemas::schedule::{NewSchedule, ScheduleResponse};
use crate::services::conversation::ConversationService;
use crate::services::goal::GoalService;
use crate::services::schedule::ScheduleService;

/// Who the model is acting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolContext {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub goal_id: Option<Uuid>,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the arguments object
    fn parameters(&self) -> Value;
    async fn call(&self, ctx: &ToolContext, arguments: &str) -> anyhow::Result<Value>;

    /// OpenAI function definition
    fn schema(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name(),
                "description": self.description(),
                "parameters": self.parameters(),
            }
        })
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(arguments: &str) -> anyhow::Result<T> {
    let raw = if arguments.trim().is_empty() { "{}" } else { arguments };
    Ok(serde_json::from_str(raw)?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalMilestone {
    pub goal: String,
    pub target_date: NaiveDate,
}

/// A SMART goal proposal awaiting confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalDraft {
    pub goal_title: String,
    pub goal_target_date: NaiveDate,
    pub goal_description: String,
    #[serde(default)]
    pub milestones: Vec<GoalMilestone>,
}

impl GoalDraft {
    /// Description followed by one line per milestone
    pub fn full_description(&self) -> String {
        if self.milestones.is_empty() {
            return self.goal_description.clone();
        }
        let lines: Vec<String> = self
            .milestones
            .iter()
            .map(|m| format!("- 목표 : {}, 목표 날짜 : {}", m.goal, m.target_date))
            .collect();
        format!("{}\n\n{}", self.goal_description, lines.join("\n"))
    }
}

fn draft_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "goalTitle": {"type": "string"},
            "goalTargetDate": {"type": "string", "format": "date", "description": "YYYY-MM-DD"},
            "goalDescription": {"type": "string"},
            "milestones": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "goal": {"type": "string"},
                        "targetDate": {"type": "string", "format": "date"}
                    },
                    "required": ["goal", "targetDate"]
                }
            }
        },
        "required": ["goalTitle", "goalTargetDate", "goalDescription", "milestones"]
    })
}

pub struct RefineGoalTool;

#[async_trait]
impl Tool for RefineGoalTool {
    fn name(&self) -> &str {
        "refine_goal"
    }

    fn description(&self) -> &str {
        "주어진 목표를 SMART(Specific, Measurable, Achievable, Relevant, Time-bound) 기준에 맞춰 구체화하고 부족한 정보가 있으면 사용자에게 질문한다"
    }

    fn parameters(&self) -> Value {
        draft_schema()
    }

    async fn call(&self, _ctx: &ToolContext, arguments: &str) -> anyhow::Result<Value> {
        let draft: GoalDraft = parse_args(arguments)?;
        Ok(serde_json::to_value(draft)?)
    }
}

pub struct SaveGoalTool {
    goals: GoalService,
    conversations: ConversationService,
}

impl SaveGoalTool {
    pub fn new(goals: GoalService, conversations: ConversationService) -> Self {
        Self {
            goals,
            conversations,
        }
    }
}

#[derive(Deserialize)]
struct SaveGoalArgs {
    draft: GoalDraft,
}

#[async_trait]
impl Tool for SaveGoalTool {
    fn name(&self) -> &str {
        "save_goal"
    }

    fn description(&self) -> &str {
        "확정된 SMART 목표를 데이터베이스에 저장한다"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"draft": draft_schema()},
            "required": ["draft"]
        })
    }

    async fn call(&self, ctx: &ToolContext, arguments: &str) -> anyhow::Result<Value> {
        let SaveGoalArgs { draft } = parse_args(arguments)?;

        let saved = self
            .goals
            .create(NewGoal {
                user_id: ctx.user_id,
                title: draft.goal_title.clone(),
                description: Some(draft.full_description()),
                target_date: draft.goal_target_date,
                image_id: None,
                is_ai_generated: true,
                status: GoalStatus::Active,
            })
            .await?;
        self.conversations
            .link_goal(ctx.conversation_id, saved.id)
            .await?;

        tracing::info!(goal_id = %saved.id, conversation_id = %ctx.conversation_id, "Assistant saved goal");
        Ok(serde_json::to_value(GoalResponse::from_model(saved, None, 0, 0))?)
    }
}

pub struct SaveSchedulesTool {
    schedules: ScheduleService,
    conversations: ConversationService,
}

impl SaveSchedulesTool {
    pub fn new(schedules: ScheduleService, conversations: ConversationService) -> Self {
        Self {
            schedules,
            conversations,
        }
    }

    /// Explicit argument, then the context, then a goal saved earlier in this turn
    async fn resolve_goal(&self, ctx: &ToolContext, explicit: Option<Uuid>) -> anyhow::Result<Uuid> {
        if let Some(goal_id) = explicit.or(ctx.goal_id) {
            return Ok(goal_id);
        }
        self.conversations
            .find_by_id(ctx.conversation_id)
            .await?
            .goal_id
            .ok_or_else(|| anyhow::anyhow!("No goal is linked to this conversation"))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleDraft {
    title: String,
    description: Option<String>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveSchedulesArgs {
    goal_id: Option<Uuid>,
    schedules: Vec<ScheduleDraft>,
}

#[async_trait]
impl Tool for SaveSchedulesTool {
    fn name(&self) -> &str {
        "save_schedules"
    }

    fn description(&self) -> &str {
        "제안된 일정을 데이터베이스에 저장한다"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "goalId": {"type": "string", "format": "uuid"},
                "schedules": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": {"type": "string"},
                            "description": {"type": "string"},
                            "startDate": {"type": "string", "format": "date-time"},
                            "endDate": {"type": "string", "format": "date-time"}
                        },
                        "required": ["title", "startDate", "endDate"]
                    }
                }
            },
            "required": ["schedules"]
        })
    }

    async fn call(&self, ctx: &ToolContext, arguments: &str) -> anyhow::Result<Value> {
        let args: SaveSchedulesArgs = parse_args(arguments)?;
        let goal_id = self.resolve_goal(ctx, args.goal_id).await?;

        let mut saved = Vec::with_capacity(args.schedules.len());
        for draft in args.schedules {
            let created = self
                .schedules
                .create(NewSchedule {
                    goal_id,
                    user_id: ctx.user_id,
                    title: draft.title,
                    description: draft.description,
                    start_date: draft.start_date,
                    end_date: draft.end_date,
                })
                .await?;
            saved.push(ScheduleResponse::from(created));
        }

        Ok(serde_json::to_value(saved)?)
    }
}

pub struct TodayTool;

#[async_trait]
impl Tool for TodayTool {
    fn name(&self) -> &str {
        "get_today"
    }

    fn description(&self) -> &str {
        "오늘 날짜를 조회한다"
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn call(&self, _ctx: &ToolContext, _arguments: &str) -> anyhow::Result<Value> {
        tracing::debug!("Tool call: get_today");
        Ok(json!(Local::now().date_naive().to_string()))
    }
}

pub type ToolSet = Vec<Arc<dyn Tool>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ToolContext {
        ToolContext {
            conversation_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            goal_id: None,
        }
    }

    #[test]
    fn test_full_description_lists_milestones() {
        let draft = GoalDraft {
            goal_title: "Run 5k".to_string(),
            goal_target_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            goal_description: "Build up to 5k".to_string(),
            milestones: vec![
                GoalMilestone {
                    goal: "1k".to_string(),
                    target_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                },
                GoalMilestone {
                    goal: "3k".to_string(),
                    target_date: NaiveDate::from_ymd_opt(2026, 4, 15).unwrap(),
                },
            ],
        };
        assert_eq!(
            draft.full_description(),
            "Build up to 5k\n\n- 목표 : 1k, 목표 날짜 : 2026-03-01\n- 목표 : 3k, 목표 날짜 : 2026-04-15"
        );
    }

    #[tokio::test]
    async fn test_refine_goal_echoes_draft() {
        let args = r#"{"goalTitle":"Run 5k","goalTargetDate":"2026-06-01","goalDescription":"d","milestones":[]}"#;
        let value = RefineGoalTool.call(&ctx(), args).await.unwrap();
        assert_eq!(value["goalTitle"], "Run 5k");
        assert_eq!(value["goalTargetDate"], "2026-06-01");
    }

    #[tokio::test]
    async fn test_refine_goal_rejects_bad_date() {
        let args = r#"{"goalTitle":"x","goalTargetDate":"someday","goalDescription":"d","milestones":[]}"#;
        assert!(RefineGoalTool.call(&ctx(), args).await.is_err());
    }

    #[tokio::test]
    async fn test_today_is_iso_date() {
        let value = TodayTool.call(&ctx(), "").await.unwrap();
        let today = value.as_str().unwrap();
        assert!(NaiveDate::parse_from_str(today, "%Y-%m-%d").is_ok());
        assert_eq!(TodayTool.schema()["function"]["name"], "get_today");
    }
}
