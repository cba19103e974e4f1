//! Goal-coaching assistant: a model, a tool belt and a bounded tool loop.

pub mod client;
pub mod feedback;
pub mod tools;

use std::sync::Arc;

use chrono::Local;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AssistantError, Result};
use crate::models::chat::{self, ChatType};
use crate::schemas::assistant::{
    AssistantResponse, AssistantResponsePayload, ChatResponse, StartChatResponse,
};
use crate::services::conversation::{chat_payloads, ConversationService};

pub use client::{ChatCompletion, ChatModel, OpenAiChatModel, ToolCall};
pub use feedback::FeedbackService;
pub use tools::{Tool, ToolContext, ToolSet};

const OUTPUT_FORMAT: &str = r#"응답은 반드시 다음 JSON 형식으로만 작성한다.
{"responses": [{"type": "TEXT", "messages": ["..."]}, {"type": "QUICK_REPLIES", "messages": ["...", "..."]}]}
TEXT는 사용자에게 보여줄 문장이고, QUICK_REPLIES는 사용자가 누를 수 있는 짧은 선택지다."#;

pub const GOAL_SYSTEM_PROMPT: &str = r#"너는 사용자의 목표 달성을 돕는 AI 비서 AiMinder다.
사용자가 말한 목표를 SMART 기준으로 구체화한다. 정보가 부족하면 한 번에 하나씩 질문한다.
목표가 구체화되면 refine_goal 도구로 초안을 만들어 보여주고, 사용자가 확정하면 save_goal 도구로 저장한다.
저장한 목표에 맞는 일정을 제안하고, 사용자가 동의하면 save_schedules 도구로 저장한다.
날짜 계산이 필요하면 get_today 도구로 오늘 날짜를 확인한다."#;

pub const FEEDBACK_SYSTEM_PROMPT: &str = r#"너는 사용자의 목표 달성을 돕는 AI 비서 AiMinder다.
사용자의 목표와 어제, 오늘의 일정을 보고 짧고 따뜻한 피드백을 준다.
어제 완료한 일정은 칭찬하고, 완료하지 못한 일정은 부담 없이 다시 시도하도록 격려한다.
오늘 일정이 있으면 무엇을 하면 좋을지 안내한다. 필요하면 get_today 도구로 오늘 날짜를 확인한다."#;

pub fn welcome_message() -> AssistantResponse {
    AssistantResponse {
        responses: vec![
            AssistantResponsePayload::text(vec![
                "안녕하세요! 목표 달성을 도와드릴 AI 비서 AiMinder입니다.".to_string(),
                "이루고 싶은 목표가 있다면 편하게 말씀해 주세요.".to_string(),
            ]),
            AssistantResponsePayload::quick_replies(vec![
                "운동 습관 만들기".to_string(),
                "자격증 취득하기".to_string(),
                "독서 습관 만들기".to_string(),
            ]),
        ],
    }
}

/// One configured assistant persona
#[derive(Clone)]
pub struct Assistant {
    model: Arc<dyn ChatModel>,
    system_prompt: &'static str,
    tools: ToolSet,
    max_tool_rounds: usize,
}

impl Assistant {
    pub fn new(
        model: Arc<dyn ChatModel>,
        system_prompt: &'static str,
        tools: ToolSet,
        max_tool_rounds: usize,
    ) -> Self {
        Self {
            model,
            system_prompt,
            tools,
            max_tool_rounds,
        }
    }

    /// Run the model over `history` plus `prompt` until it answers without tool calls
    pub async fn respond(
        &self,
        ctx: &ToolContext,
        history: &[chat::Model],
        prompt: &str,
    ) -> Result<AssistantResponse> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(json!({
            "role": "system",
            "content": format!(
                "현재 시간: {}\n\n{}\n\n{}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                self.system_prompt,
                OUTPUT_FORMAT
            ),
        }));
        messages.extend(history.iter().map(history_message));
        messages.push(json!({"role": "user", "content": prompt}));

        let schemas: Vec<Value> = self.tools.iter().map(|t| t.schema()).collect();

        for round in 0..=self.max_tool_rounds {
            let completion = self
                .model
                .chat(&messages, &schemas)
                .await
                .map_err(|e| inference_error(ctx, format!("Model call failed: {e:#}")))?;

            if completion.tool_calls.is_empty() {
                return parse_response(completion.content.as_deref())
                    .map_err(|e| inference_error(ctx, e));
            }
            if round == self.max_tool_rounds {
                break;
            }

            messages.push(completion.to_message());
            for call in &completion.tool_calls {
                let output = self.run_tool(ctx, call).await;
                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": call.id,
                    "content": output.to_string(),
                }));
            }
        }

        Err(inference_error(
            ctx,
            format!("Tool round limit ({}) exceeded", self.max_tool_rounds),
        ))
    }

    async fn run_tool(&self, ctx: &ToolContext, call: &ToolCall) -> Value {
        let Some(tool) = self.tools.iter().find(|t| t.name() == call.name) else {
            tracing::warn!(tool = %call.name, "Model requested an unknown tool");
            return json!({"error": format!("Unknown tool: {}", call.name)});
        };

        match tool.call(ctx, &call.arguments).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    tool = %call.name,
                    conversation_id = %ctx.conversation_id,
                    error = %e,
                    "Tool call failed"
                );
                json!({"error": e.to_string()})
            }
        }
    }
}

fn history_message(stored: &chat::Model) -> Value {
    match stored.chat_type {
        ChatType::User => json!({"role": "user", "content": stored.content}),
        ChatType::Assistant => {
            let replay = AssistantResponse {
                responses: chat_payloads(stored),
            };
            json!({
                "role": "assistant",
                "content": serde_json::to_string(&replay).unwrap_or_else(|_| stored.content.clone()),
            })
        }
    }
}

/// Parse the final model output, tolerating a fenced code block
fn parse_response(content: Option<&str>) -> std::result::Result<AssistantResponse, String> {
    let raw = content
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| "Model returned no content".to_string())?;

    let unfenced = raw
        .strip_prefix("```json")
        .or_else(|| raw.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(raw);

    let response: AssistantResponse = serde_json::from_str(unfenced)
        .map_err(|e| format!("Unparsable assistant response: {e}"))?;
    if response.responses.is_empty() {
        return Err("Assistant response has no blocks".to_string());
    }
    Ok(response)
}

fn inference_error(ctx: &ToolContext, detail: String) -> AppError {
    tracing::error!(conversation_id = %ctx.conversation_id, error = %detail, "Assistant inference failed");
    AssistantError::InferenceError("AI 응답을 생성하지 못했습니다. 잠시 후 다시 시도해주세요.".to_string())
        .into()
}

#[derive(Clone)]
pub struct AssistantService {
    conversations: ConversationService,
    assistant: Assistant,
    history_size: u64,
}

impl AssistantService {
    pub fn new(conversations: ConversationService, assistant: Assistant, history_size: u64) -> Self {
        Self {
            conversations,
            assistant,
            history_size,
        }
    }

    pub async fn start_chat(&self, user_id: Uuid) -> Result<StartChatResponse> {
        let conversation = self.conversations.create(user_id, None).await?;
        let welcome = welcome_message();
        self.conversations
            .save_assistant_chat(conversation.id, &welcome)
            .await?;

        Ok(StartChatResponse {
            conversation_id: conversation.id,
            messages: welcome.responses,
        })
    }

    pub async fn send_message(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        text: &str,
    ) -> Result<ChatResponse> {
        if text.trim().is_empty() {
            return Err(AppError::invalid_request("메시지 내용이 비어있습니다."));
        }
        let conversation = self.conversations.find_owned(user_id, conversation_id).await?;

        let history = self
            .conversations
            .recent_chats(conversation.id, self.history_size)
            .await?;
        self.conversations.save_user_chat(conversation.id, text).await?;

        let ctx = ToolContext {
            conversation_id: conversation.id,
            user_id,
            goal_id: conversation.goal_id,
        };
        let response = self.assistant.respond(&ctx, &history, text).await?;
        self.conversations
            .save_assistant_chat(conversation.id, &response)
            .await?;

        Ok(ChatResponse {
            conversation_id: conversation.id,
            chat: response.responses,
            chat_type: ChatType::Assistant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_accepts_fenced_json() {
        let fenced = "```json\n{\"responses\":[{\"type\":\"TEXT\",\"messages\":[\"hi\"]}]}\n```";
        let parsed = parse_response(Some(fenced)).unwrap();
        assert_eq!(parsed.first_text(), Some("hi"));
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        assert!(parse_response(None).is_err());
        assert!(parse_response(Some("  ")).is_err());
        assert!(parse_response(Some("hello")).is_err());
        assert!(parse_response(Some("{\"responses\":[]}")).is_err());
    }

    #[test]
    fn test_welcome_message_has_text_first() {
        let welcome = welcome_message();
        assert!(welcome.first_text().unwrap().contains("AiMinder"));
    }
}
