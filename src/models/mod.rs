pub mod chat;
pub mod conversation;
pub mod goal;
pub mod image;
pub mod inquiry;
pub mod notification;
pub mod refresh_token;
pub mod schedule;
pub mod user;
pub mod user_notification_settings;
pub mod user_withdrawal;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::chat::{self, Entity as Chat};
    pub use super::conversation::{self, Entity as Conversation};
    pub use super::goal::{self, Entity as Goal};
    pub use super::image::{self, Entity as Image};
    pub use super::inquiry::{self, Entity as Inquiry};
    pub use super::notification::{self, Entity as Notification};
    pub use super::refresh_token::{self, Entity as RefreshToken};
    pub use super::schedule::{self, Entity as Schedule};
    pub use super::user::{self, Entity as User};
    pub use super::user_notification_settings::{self, Entity as UserNotificationSettings};
    pub use super::user_withdrawal::{self, Entity as UserWithdrawal};
}
