use super::repository::ChatTurn;

/// Prompt material handed to the text-completion collaborator.
#[derive(Debug, Clone, Copy)]
pub struct AdvisorRequest<'a> {
    pub system: &'a str,
    pub history: &'a [ChatTurn],
    pub message: &'a str,
}

/// Black-box text service consuming a context document and conversation history.
pub trait AdvisorClient: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }

    fn complete(&self, request: AdvisorRequest<'_>) -> Result<String, AdvisorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("advisor service is not configured")]
    NotConfigured,
    #[error("advisor service failed: {0}")]
    Upstream(String),
}

/// Stand-in used when no completion service is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAdvisor;

impl AdvisorClient for OfflineAdvisor {
    fn is_available(&self) -> bool {
        false
    }

    fn complete(&self, _request: AdvisorRequest<'_>) -> Result<String, AdvisorError> {
        Err(AdvisorError::NotConfigured)
    }
}
