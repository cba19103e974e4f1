pub mod assistant;
pub mod conversation;
pub mod cookie;
pub mod goal;
pub mod image;
pub mod inquiry;
pub mod notification;
pub mod oauth2;
pub mod redirect;
pub mod schedule;
pub mod scheduler;
pub mod token;
pub mod user;

pub use assistant::{AssistantService, FeedbackService};
pub use conversation::ConversationService;
pub use cookie::CookieSettings;
pub use goal::GoalService;
pub use image::ImageService;
pub use inquiry::InquiryService;
pub use notification::{NotificationPublisher, NotificationService};
pub use oauth2::OAuth2Service;
pub use redirect::RedirectValidator;
pub use schedule::ScheduleService;
pub use token::TokenService;
pub use user::UserService;
