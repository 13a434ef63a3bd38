use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message in a session's conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at,
        }
    }
}

/// Broker feedback on a lender as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub lender_name: String,
    pub deal_type: String,
    pub rating: u8,
    #[serde(default)]
    pub feedback_text: Option<String>,
}

impl FeedbackSubmission {
    pub fn validate(&self) -> Result<(), FeedbackError> {
        if self.lender_name.trim().is_empty() {
            return Err(FeedbackError::MissingLender);
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(FeedbackError::RatingOutOfRange(self.rating));
        }
        Ok(())
    }

    pub fn into_record(self, created_at: DateTime<Utc>) -> FeedbackRecord {
        FeedbackRecord {
            lender_name: self.lender_name.trim().to_string(),
            deal_type: self.deal_type,
            rating: self.rating,
            feedback_text: self.feedback_text.filter(|text| !text.trim().is_empty()),
            created_at,
        }
    }
}

/// Stored feedback entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub lender_name: String,
    pub deal_type: String,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Keyed append-only conversation history.
pub trait ConversationStore: Send + Sync {
    fn append(&self, session_id: &str, turn: ChatTurn) -> Result<(), StoreError>;
    fn history(&self, session_id: &str) -> Result<Vec<ChatTurn>, StoreError>;
}

/// Append-only feedback log, newest entries returned first.
pub trait FeedbackStore: Send + Sync {
    fn save(&self, record: FeedbackRecord) -> Result<(), StoreError>;
    fn recent(&self, lender: Option<&str>, limit: usize) -> Result<Vec<FeedbackRecord>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Rejected feedback submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedbackError {
    #[error("lender name is required")]
    MissingLender,
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(rating: u8) -> FeedbackSubmission {
        FeedbackSubmission {
            lender_name: " Atlas ".to_string(),
            deal_type: "refurb".to_string(),
            rating,
            feedback_text: Some("  ".to_string()),
        }
    }

    #[test]
    fn ratings_outside_one_to_five_are_rejected() {
        assert_eq!(
            submission(0).validate(),
            Err(FeedbackError::RatingOutOfRange(0))
        );
        assert_eq!(
            submission(6).validate(),
            Err(FeedbackError::RatingOutOfRange(6))
        );
        assert!(submission(1).validate().is_ok());
        assert!(submission(5).validate().is_ok());
    }

    #[test]
    fn records_trim_names_and_drop_blank_text() {
        let record = submission(4).into_record(Utc::now());
        assert_eq!(record.lender_name, "Atlas");
        assert!(record.feedback_text.is_none());
    }
}
