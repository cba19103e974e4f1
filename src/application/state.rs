use std::sync::Arc;

use crate::config::Config;
use crate::services::assistant::tools::{
    RefineGoalTool, SaveGoalTool, SaveSchedulesTool, TodayTool, ToolSet,
};
use crate::services::assistant::{
    Assistant, AssistantService, ChatModel, FeedbackService, FEEDBACK_SYSTEM_PROMPT,
    GOAL_SYSTEM_PROMPT,
};
use crate::services::{
    ConversationService, CookieSettings, GoalService, ImageService, InquiryService,
    NotificationPublisher, NotificationService, OAuth2Service, RedirectValidator, ScheduleService,
    TokenService, UserService,
};

/// Database connection type alias
pub use crate::application::database::DbConn;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub tokens: TokenService,
    pub redirects: RedirectValidator,
    pub cookies: CookieSettings,
    pub oauth: OAuth2Service,
    pub users: UserService,
    pub goals: GoalService,
    pub schedules: ScheduleService,
    pub conversations: ConversationService,
    pub notifications: NotificationService,
    pub images: ImageService,
    pub inquiries: InquiryService,
    pub assistant: AssistantService,
    pub feedback: FeedbackService,
    pub publisher: NotificationPublisher,
}

impl AppState {
    pub fn new(
        db: DbConn,
        config: &Config,
        model: Arc<dyn ChatModel>,
        publisher: NotificationPublisher,
    ) -> Self {
        let images = ImageService::new(db.clone(), config.image.clone());
        let goals = GoalService::new(db.clone(), images.clone());
        let schedules = ScheduleService::new(db.clone(), goals.clone());
        let conversations = ConversationService::new(db.clone());
        let max_rounds = config.assistant.max_tool_rounds;

        let goal_tools: ToolSet = vec![
            Arc::new(RefineGoalTool),
            Arc::new(SaveGoalTool::new(goals.clone(), conversations.clone())),
            Arc::new(SaveSchedulesTool::new(schedules.clone(), conversations.clone())),
            Arc::new(TodayTool),
        ];
        let goal_assistant = Assistant::new(model.clone(), GOAL_SYSTEM_PROMPT, goal_tools, max_rounds);
        let feedback_assistant =
            Assistant::new(model, FEEDBACK_SYSTEM_PROMPT, vec![Arc::new(TodayTool)], max_rounds);

        Self {
            tokens: TokenService::new(db.clone(), &config.auth.jwt),
            redirects: RedirectValidator::new(&config.auth.oauth.allowed_redirect_hosts),
            cookies: CookieSettings::new(&config.auth.cookie),
            oauth: OAuth2Service::new(config.auth.oauth.clone()),
            users: UserService::new(db.clone()),
            notifications: NotificationService::new(db.clone()),
            inquiries: InquiryService::new(db.clone()),
            assistant: AssistantService::new(
                conversations.clone(),
                goal_assistant,
                config.assistant.history_size,
            ),
            feedback: FeedbackService::new(
                goals.clone(),
                schedules.clone(),
                conversations.clone(),
                publisher.clone(),
                feedback_assistant,
            ),
            db,
            images,
            goals,
            schedules,
            conversations,
            publisher,
        }
    }
}
