use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::inquiry::{self, InquiryStatus, InquiryType};

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInquiryRequest {
    pub inquiry_type: InquiryType,
    pub content: String,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InquiryResponse {
    pub id: Uuid,
    pub inquiry_type: InquiryType,
    pub content: String,
    pub contact_email: Option<String>,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

impl From<inquiry::Model> for InquiryResponse {
    fn from(model: inquiry::Model) -> Self {
        Self {
            id: model.id,
            inquiry_type: model.inquiry_type,
            content: model.content,
            contact_email: model.contact_email,
            status: model.status,
            created_at: model.created_at,
        }
    }
}
