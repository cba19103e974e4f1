use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalReason {
    #[sea_orm(string_value = "SERVICE_DISSATISFACTION")]
    ServiceDissatisfaction,
    #[sea_orm(string_value = "USING_OTHER_SERVICE")]
    UsingOtherService,
    #[sea_orm(string_value = "PRIVACY_CONCERN")]
    PrivacyConcern,
    #[sea_orm(string_value = "LOW_USAGE_FREQUENCY")]
    LowUsageFrequency,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

impl WithdrawalReason {
    pub fn display_name(&self) -> &'static str {
        match self {
            WithdrawalReason::ServiceDissatisfaction => "서비스가 마음에 들지 않음",
            WithdrawalReason::UsingOtherService => "다른 서비스를 사용하게 됨",
            WithdrawalReason::PrivacyConcern => "개인정보 보호 우려",
            WithdrawalReason::LowUsageFrequency => "사용 빈도가 낮음",
            WithdrawalReason::Other => "기타",
        }
    }

    /// Exact match on the user-facing label
    pub fn from_display_name(name: &str) -> Option<Self> {
        <Self as sea_orm::Iterable>::iter().find(|r| r.display_name() == name)
    }
}

/// Audit row written when a user deletes their account
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_withdrawals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub reason: WithdrawalReason,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_from_display_name() {
        assert_eq!(
            WithdrawalReason::from_display_name("개인정보 보호 우려"),
            Some(WithdrawalReason::PrivacyConcern)
        );
        assert_eq!(WithdrawalReason::from_display_name("테스트 사유"), None);
    }
}
