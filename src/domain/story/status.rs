//! ReviewStageStatus enum for the review workflow.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Where a story is in the review workflow.
///
/// `AgileReview` and `TechnicalReview` mark a finished stage waiting for the
/// user's decision; the `UserReview*` states are entered once that decision
/// arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStageStatus {
    #[default]
    Pending,
    AgileReview,
    UserReviewAgile,
    TechnicalReview,
    UserReviewFinal,
    Complete,
    Error,
}

impl ReviewStageStatus {
    /// Returns true if the result is waiting on a user decision.
    pub fn awaits_feedback(&self) -> bool {
        matches!(
            self,
            ReviewStageStatus::AgileReview | ReviewStageStatus::TechnicalReview
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStageStatus::Pending => "pending",
            ReviewStageStatus::AgileReview => "agile_review",
            ReviewStageStatus::UserReviewAgile => "user_review_agile",
            ReviewStageStatus::TechnicalReview => "technical_review",
            ReviewStageStatus::UserReviewFinal => "user_review_final",
            ReviewStageStatus::Complete => "complete",
            ReviewStageStatus::Error => "error",
        }
    }
}

impl StateMachine for ReviewStageStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use ReviewStageStatus::*;
        match self {
            Pending => vec![AgileReview, Error],
            AgileReview => vec![UserReviewAgile, Error],
            UserReviewAgile => vec![TechnicalReview, Pending, Error],
            TechnicalReview => vec![UserReviewFinal, Error],
            UserReviewFinal => vec![Complete, Pending, Error],
            Complete | Error => vec![],
        }
    }
}

impl fmt::Display for ReviewStageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReviewStageStatus::*;

    #[test]
    fn default_is_pending() {
        assert_eq!(ReviewStageStatus::default(), Pending);
    }

    #[test]
    fn happy_path_is_valid() {
        let path = [
            Pending,
            AgileReview,
            UserReviewAgile,
            TechnicalReview,
            UserReviewFinal,
            Complete,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(&pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn only_decisions_loop_back_to_pending() {
        assert!(UserReviewAgile.can_transition_to(&Pending));
        assert!(UserReviewFinal.can_transition_to(&Pending));
        assert!(!AgileReview.can_transition_to(&Pending));
        assert!(!TechnicalReview.can_transition_to(&AgileReview));
        assert!(!TechnicalReview.can_transition_to(&Pending));
    }

    #[test]
    fn cannot_skip_user_decision() {
        assert!(!AgileReview.can_transition_to(&TechnicalReview));
        assert!(!TechnicalReview.can_transition_to(&Complete));
        assert!(AgileReview.transition_to(TechnicalReview).is_err());
    }

    #[test]
    fn every_live_state_can_fail() {
        for state in [Pending, AgileReview, UserReviewAgile, TechnicalReview, UserReviewFinal] {
            assert!(state.can_transition_to(&Error));
        }
    }

    #[test]
    fn complete_and_error_are_terminal() {
        assert!(Complete.is_terminal());
        assert!(Error.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn awaits_feedback_only_after_stages() {
        assert!(AgileReview.awaits_feedback());
        assert!(TechnicalReview.awaits_feedback());
        assert!(!Pending.awaits_feedback());
        assert!(!Complete.awaits_feedback());
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(serde_json::to_string(&AgileReview).unwrap(), "\"agile_review\"");
        assert_eq!(
            serde_json::from_str::<ReviewStageStatus>("\"user_review_final\"").unwrap(),
            UserReviewFinal
        );
        assert_eq!(UserReviewAgile.to_string(), "user_review_agile");
    }
}
