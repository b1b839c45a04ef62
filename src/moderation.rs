//! Submission lifecycle: `pending -> approved | rejected`.
//!
//! A decision is terminal. Merchants edit or delete only while pending, and a
//! decided submission goes back to the queue only as a new record.

use thiserror::Error;

use crate::models::SubmissionStatus;

/// Curator decision on a pending submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject { reason: String },
}

impl Decision {
    /// Builds a rejection, refusing a missing or blank reason.
    pub fn reject(reason: Option<String>) -> Result<Self, ModerationError> {
        match reason.map(|r| r.trim().to_string()) {
            Some(reason) if !reason.is_empty() => Ok(Decision::Reject { reason }),
            _ => Err(ModerationError::MissingReason),
        }
    }

    pub fn target_status(&self) -> SubmissionStatus {
        match self {
            Decision::Approve => SubmissionStatus::Approved,
            Decision::Reject { .. } => SubmissionStatus::Rejected,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Decision::Approve => None,
            Decision::Reject { reason } => Some(reason),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModerationError {
    #[error("La publicación ya tiene una decisión ({0})")]
    AlreadyDecided(SubmissionStatus),
    #[error("Solo se pueden modificar publicaciones pendientes (estado actual: {0})")]
    NotEditable(SubmissionStatus),
    #[error("La publicación ya está pendiente de aprobación")]
    AlreadyPending,
    #[error("Debes indicar el motivo del rechazo")]
    MissingReason,
}

/// Resulting status for `decision` applied to a record currently in `current`.
pub fn decide(
    current: SubmissionStatus,
    decision: &Decision,
) -> Result<SubmissionStatus, ModerationError> {
    match current {
        SubmissionStatus::Pending => Ok(decision.target_status()),
        decided => Err(ModerationError::AlreadyDecided(decided)),
    }
}

/// Updates and deletes are only allowed on pending submissions.
pub fn ensure_mutable(current: SubmissionStatus) -> Result<(), ModerationError> {
    match current {
        SubmissionStatus::Pending => Ok(()),
        decided => Err(ModerationError::NotEditable(decided)),
    }
}

/// Resubmitting makes sense only once a decision exists.
pub fn ensure_resubmittable(current: SubmissionStatus) -> Result<(), ModerationError> {
    match current {
        SubmissionStatus::Pending => Err(ModerationError::AlreadyPending),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert_eq!(
            decide(SubmissionStatus::Pending, &Decision::Approve),
            Ok(SubmissionStatus::Approved)
        );
        let reject = Decision::reject(Some("Imágenes de baja calidad".into())).unwrap();
        assert_eq!(
            decide(SubmissionStatus::Pending, &reject),
            Ok(SubmissionStatus::Rejected)
        );
    }

    #[test]
    fn decisions_are_terminal() {
        for current in [SubmissionStatus::Approved, SubmissionStatus::Rejected] {
            assert_eq!(
                decide(current, &Decision::Approve),
                Err(ModerationError::AlreadyDecided(current))
            );
        }
    }

    #[test]
    fn rejection_needs_a_reason() {
        assert_eq!(Decision::reject(None), Err(ModerationError::MissingReason));
        assert_eq!(
            Decision::reject(Some("   ".into())),
            Err(ModerationError::MissingReason)
        );
        let decision = Decision::reject(Some("  duplicado ".into())).unwrap();
        assert_eq!(decision.reason(), Some("duplicado"));
    }

    #[test]
    fn only_pending_is_mutable() {
        assert!(ensure_mutable(SubmissionStatus::Pending).is_ok());
        assert_eq!(
            ensure_mutable(SubmissionStatus::Approved),
            Err(ModerationError::NotEditable(SubmissionStatus::Approved))
        );
    }

    #[test]
    fn resubmission_requires_a_decision() {
        assert_eq!(
            ensure_resubmittable(SubmissionStatus::Pending),
            Err(ModerationError::AlreadyPending)
        );
        assert!(ensure_resubmittable(SubmissionStatus::Rejected).is_ok());
        assert!(ensure_resubmittable(SubmissionStatus::Approved).is_ok());
    }
}
