use return_ai_common::ErrorEnvelope;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReturnAiError {
    #[error("Usage: compare_images <reference_image> <return_image>")]
    InvalidArguments,

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Reference image not found: {0}")]
    ReferenceNotFound(String),

    #[error("Return image not found: {0}")]
    ReturnNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to load CLIP model: {0}")]
    ModelLoad(String),

    #[error("CLIP similarity computation failed: {0}")]
    SimilarityCompute(String),

    #[error("Image load error: {0}")]
    ImageLoad(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] return_ai_common::Error),
}

pub type Result<T> = std::result::Result<T, ReturnAiError>;

impl From<&ReturnAiError> for ErrorEnvelope {
    fn from(err: &ReturnAiError) -> Self {
        match err {
            ReturnAiError::InvalidArguments => {
                ErrorEnvelope::rejected(err.to_string(), "Invalid arguments")
            }
            ReturnAiError::MissingDependency(_) => ErrorEnvelope::rejected(
                err.to_string(),
                "AI inference unavailable - dependencies missing",
            ),
            ReturnAiError::ReferenceNotFound(_) => {
                ErrorEnvelope::rejected(err.to_string(), "Reference image not found")
            }
            ReturnAiError::ReturnNotFound(_) => {
                ErrorEnvelope::rejected(err.to_string(), "Return image not found")
            }
            _ => ErrorEnvelope::inference_failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use return_ai_common::{IssueLabel, Status};

    #[test]
    fn test_invalid_arguments_envelope() {
        let env = ErrorEnvelope::from(&ReturnAiError::InvalidArguments);
        assert!(env.error.starts_with("Usage:"));
        assert_eq!(env.ai_detected_issues, vec!["Invalid arguments".to_string()]);
        assert!(env.ai_issue_labels.is_empty());
        assert_eq!(env.status, None);
    }

    #[test]
    fn test_not_found_envelopes() {
        let env = ErrorEnvelope::from(&ReturnAiError::ReferenceNotFound("ref.jpg".into()));
        assert_eq!(env.error, "Reference image not found: ref.jpg");
        assert_eq!(env.ai_detected_issues, vec!["Reference image not found".to_string()]);

        let env = ErrorEnvelope::from(&ReturnAiError::ReturnNotFound("ret.jpg".into()));
        assert_eq!(env.error, "Return image not found: ret.jpg");
        assert_eq!(env.ai_similarity_score, None);
    }

    #[test]
    fn test_missing_dependency_envelope() {
        let env = ErrorEnvelope::from(&ReturnAiError::MissingDependency("model file".into()));
        assert_eq!(env.error, "Missing dependency: model file");
        assert_eq!(
            env.ai_detected_issues,
            vec!["AI inference unavailable - dependencies missing".to_string()]
        );
        assert_eq!(env.status, None);
    }

    #[test]
    fn test_inference_failures_are_marked_failed() {
        let errors = vec![
            ReturnAiError::ModelLoad("bad graph".into()),
            ReturnAiError::SimilarityCompute("decode".into()),
            ReturnAiError::Config("broken".into()),
            ReturnAiError::Common(return_ai_common::Error::InvalidEmbedding("zero".into())),
        ];

        for err in errors {
            let env = ErrorEnvelope::from(&err);
            assert_eq!(env.status, Some(Status::Failed), "{:?}", err);
            assert_eq!(env.ai_issue_labels, vec![IssueLabel::Error]);
            assert!(env.ai_detected_issues[0].starts_with("AI inference failed: "));
            assert_eq!(env.ai_confidence, 0.0);
        }
    }

    #[test]
    fn test_model_load_message() {
        let err = ReturnAiError::ModelLoad("unsupported op".into());
        assert_eq!(err.to_string(), "Failed to load CLIP model: unsupported op");
    }
}
