use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use crate::error::{InquiryError, Result};
use crate::models::inquiry::{self, InquiryStatus};
use crate::schemas::inquiry::CreateInquiryRequest;
use crate::state::DbConn;

pub const MAX_CONTENT_LENGTH: usize = 1000;

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email pattern")
});

#[derive(Clone)]
pub struct InquiryService {
    db: DbConn,
}

impl InquiryService {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: Uuid, request: CreateInquiryRequest) -> Result<inquiry::Model> {
        validate_content(&request.content)?;
        let contact_email = normalize_email(request.contact_email)?;

        let now = Utc::now();
        let created = inquiry::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            inquiry_type: Set(request.inquiry_type),
            content: Set(request.content),
            contact_email: Set(contact_email),
            status: Set(InquiryStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(inquiry_id = %created.id, user_id = %user_id, "Inquiry received");
        Ok(created)
    }
}

fn validate_content(content: &str) -> Result<()> {
    let length = content.chars().count();
    if content.trim().is_empty() || length > MAX_CONTENT_LENGTH {
        return Err(InquiryError::InvalidContent.into());
    }
    Ok(())
}

/// Blank counts as absent
fn normalize_email(email: Option<String>) -> Result<Option<String>> {
    match email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()) {
        None => Ok(None),
        Some(email) if EMAIL_PATTERN.is_match(&email) => Ok(Some(email)),
        Some(email) => Err(InquiryError::InvalidEmail(email).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_content_bounds() {
        assert!(validate_content("도와주세요").is_ok());
        assert!(validate_content(&"가".repeat(MAX_CONTENT_LENGTH)).is_ok());
        assert!(matches!(
            validate_content("   "),
            Err(AppError::Inquiry(InquiryError::InvalidContent))
        ));
        assert!(matches!(
            validate_content(&"a".repeat(MAX_CONTENT_LENGTH + 1)),
            Err(AppError::Inquiry(InquiryError::InvalidContent))
        ));
    }

    #[test]
    fn test_email_rules() {
        assert_eq!(normalize_email(None).unwrap(), None);
        assert_eq!(normalize_email(Some("  ".to_string())).unwrap(), None);
        assert_eq!(
            normalize_email(Some("me+tag@aiminder.click".to_string())).unwrap(),
            Some("me+tag@aiminder.click".to_string())
        );
        assert!(matches!(
            normalize_email(Some("not-an-email".to_string())),
            Err(AppError::Inquiry(InquiryError::InvalidEmail(_)))
        ));
        assert!(normalize_email(Some("a@b.c".to_string())).is_err());
    }
}
