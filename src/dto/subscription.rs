use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::SubscriptionEntity;

/// Payload used to follow a game's release by email.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(email(message = "a valid email address is required"))]
    pub email: String,
}

impl SubscribeRequest {
    /// Address in the form used for uniqueness checks.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// Confirmation returned after subscribing. The unsubscribe token is only
/// ever sent by mail.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub game_id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<SubscriptionEntity> for SubscriptionResponse {
    fn from(entity: SubscriptionEntity) -> Self {
        Self {
            id: entity.id,
            game_id: entity.game_id,
            email: entity.email,
            created_at: entity.created_at,
        }
    }
}
