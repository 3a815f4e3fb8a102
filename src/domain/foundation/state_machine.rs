//! State machine trait for status enums.
//!
//! Gives lifecycle enums a single, validated way to move between states.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their legal transitions; `transition_to` and
/// `is_terminal` come for free.
///
/// # Example
///
/// ```ignore
/// let next = ReviewStageStatus::Pending.transition_to(ReviewStageStatus::AgileReview)?;
/// assert!(!next.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if a transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs the transition, returning an error if it is not allowed.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if the current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
