use crate::config::ConfigError;
use crate::decisions::{DecisionServiceError, RegistryError};
use crate::knowledge::{KbImportError, KnowledgeError, KnowledgeServiceError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(Box<dyn std::error::Error + Send + Sync>),
    Io(std::io::Error),
    Server(axum::Error),
    Registry(RegistryError),
    Decision(DecisionServiceError),
    Knowledge(KnowledgeError),
    KbImport(KbImportError),
    Retrieval(KnowledgeServiceError),
    Payload(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Registry(err) => write!(f, "rule registry error: {}", err),
            AppError::Decision(err) => write!(f, "decision error: {}", err),
            AppError::Knowledge(err) => write!(f, "knowledge base error: {}", err),
            AppError::KbImport(err) => write!(f, "knowledge base import error: {}", err),
            AppError::Retrieval(err) => write!(f, "retrieval error: {}", err),
            AppError::Payload(err) => write!(f, "invalid payload: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(&**err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Registry(err) => Some(err),
            AppError::Decision(err) => Some(err),
            AppError::Knowledge(err) => Some(err),
            AppError::KbImport(err) => Some(err),
            AppError::Retrieval(err) => Some(err),
            AppError::Payload(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Decision(_)
            | AppError::KbImport(_)
            | AppError::Payload(_)
            | AppError::Knowledge(KnowledgeError::InvalidEntry(_))
            | AppError::Retrieval(
                KnowledgeServiceError::EmptyQuestion
                | KnowledgeServiceError::UnknownDecisionType(_)
                | KnowledgeServiceError::Knowledge(KnowledgeError::InvalidEntry(_)),
            ) => StatusCode::BAD_REQUEST,
            AppError::Knowledge(KnowledgeError::EntryNotFound(_))
            | AppError::Retrieval(KnowledgeServiceError::Knowledge(
                KnowledgeError::EntryNotFound(_),
            )) => StatusCode::NOT_FOUND,
            AppError::Knowledge(KnowledgeError::DuplicateEntry(_))
            | AppError::Retrieval(KnowledgeServiceError::Knowledge(
                KnowledgeError::DuplicateEntry(_),
            )) => StatusCode::CONFLICT,
            AppError::Retrieval(
                KnowledgeServiceError::Knowledge(KnowledgeError::Embedding(_))
                | KnowledgeServiceError::ReviewQueue(_),
            ) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Registry(_)
            | AppError::Knowledge(KnowledgeError::Embedding(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RegistryError> for AppError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<DecisionServiceError> for AppError {
    fn from(value: DecisionServiceError) -> Self {
        Self::Decision(value)
    }
}

impl From<KnowledgeError> for AppError {
    fn from(value: KnowledgeError) -> Self {
        Self::Knowledge(value)
    }
}

impl From<KbImportError> for AppError {
    fn from(value: KbImportError) -> Self {
        Self::KbImport(value)
    }
}

impl From<KnowledgeServiceError> for AppError {
    fn from(value: KnowledgeServiceError) -> Self {
        Self::Retrieval(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Payload(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decisions::UnknownDecisionType;
    use crate::knowledge::KbEntryId;

    #[test]
    fn maps_errors_to_status_codes() {
        let unknown = AppError::from(DecisionServiceError::from(UnknownDecisionType(
            "csf_researcher".to_string(),
        )));
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

        let missing = AppError::from(KnowledgeError::EntryNotFound(KbEntryId("kb-x".into())));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let offline = AppError::from(KnowledgeServiceError::from(
            crate::knowledge::ReviewQueueError::Unavailable("down".to_string()),
        ));
        assert_eq!(offline.status(), StatusCode::SERVICE_UNAVAILABLE);

        let registry = AppError::from(RegistryError::DuplicateRuleId("r1".to_string()));
        assert_eq!(registry.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn retrieval_errors_share_one_status_table() {
        let empty = AppError::from(KnowledgeServiceError::EmptyQuestion);
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let duplicate = AppError::from(KnowledgeServiceError::Knowledge(
            KnowledgeError::DuplicateEntry(KbEntryId("kb-x".into())),
        ));
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let embedding = AppError::from(KnowledgeServiceError::Knowledge(
            KnowledgeError::Embedding(crate::knowledge::EmbeddingError::Unavailable(
                "timed out".to_string(),
            )),
        ));
        assert_eq!(embedding.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn response_body_carries_the_message() {
        let response = AppError::from(ConfigError::InvalidPort).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
