use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::AnswerEntity,
    dto::{format_system_time, game::AnswerStatusDto, validation::validate_not_blank},
};

/// Payload submitted for the caller's next unanswered question.
///
/// The target question is never part of the payload: the pipeline always
/// serves the lowest-position unanswered question for the caller.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAnswerRequest {
    /// Raw answer text, compared case-insensitively after trimming.
    pub answer: String,
}

impl Validate for SubmitAnswerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_not_blank(&self.answer) {
            errors.add("answer", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Record returned for a processed submission. Carries the caller's own data
/// only; the opponent's progress is never exposed here.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerRecord {
    /// Question the answer was recorded against.
    pub question_id: Uuid,
    /// Correctness verdict.
    pub status: AnswerStatusDto,
    /// Submission timestamp (RFC 3339).
    pub answered_at: String,
}

impl From<AnswerEntity> for AnswerRecord {
    fn from(value: AnswerEntity) -> Self {
        Self {
            question_id: value.question_id,
            status: value.status.into(),
            answered_at: format_system_time(value.answered_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answers_are_rejected() {
        let request = SubmitAnswerRequest { answer: "  ".into() };
        assert!(request.validate().is_err());

        let request = SubmitAnswerRequest { answer: "4".into() };
        assert!(request.validate().is_ok());
    }
}
