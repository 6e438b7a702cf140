//! Vote state machine for posts and comments.
//!
//! A vote is a closed three-state value. Every toggle produces a
//! [`VoteTransition`] carrying the score delta, and every transition has an
//! exact inverse so optimistic changes can be rolled back.

use serde::{Deserialize, Serialize};

/// The direction a user taps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteDirection {
    Upvote,
    Downvote,
}

/// The caller's current vote on an entity.
///
/// On the wire `None` is `null`, the others are `"UPVOTE"` / `"DOWNVOTE"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<VoteDirection>", into = "Option<VoteDirection>")]
pub enum VoteState {
    #[default]
    None,
    Upvote,
    Downvote,
}

impl From<Option<VoteDirection>> for VoteState {
    fn from(direction: Option<VoteDirection>) -> Self {
        match direction {
            None => VoteState::None,
            Some(VoteDirection::Upvote) => VoteState::Upvote,
            Some(VoteDirection::Downvote) => VoteState::Downvote,
        }
    }
}

impl From<VoteState> for Option<VoteDirection> {
    fn from(state: VoteState) -> Self {
        match state {
            VoteState::None => None,
            VoteState::Upvote => Some(VoteDirection::Upvote),
            VoteState::Downvote => Some(VoteDirection::Downvote),
        }
    }
}

impl VoteState {
    /// Computes the transition for tapping `direction` while in this state.
    pub fn toggle(self, direction: VoteDirection) -> VoteTransition {
        let (next, score_delta) = match (self, direction) {
            (VoteState::None, VoteDirection::Upvote) => (VoteState::Upvote, 1),
            (VoteState::None, VoteDirection::Downvote) => (VoteState::Downvote, -1),
            (VoteState::Upvote, VoteDirection::Upvote) => (VoteState::None, -1),
            (VoteState::Upvote, VoteDirection::Downvote) => (VoteState::Downvote, -2),
            (VoteState::Downvote, VoteDirection::Upvote) => (VoteState::Upvote, 2),
            (VoteState::Downvote, VoteDirection::Downvote) => (VoteState::None, 1),
        };

        VoteTransition {
            previous: self,
            next,
            score_delta,
        }
    }

    /// Contribution of this state to an entity's score.
    pub fn weight(self) -> i64 {
        match self {
            VoteState::None => 0,
            VoteState::Upvote => 1,
            VoteState::Downvote => -1,
        }
    }
}

/// A single step of the vote state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    pub previous: VoteState,
    pub next: VoteState,
    pub score_delta: i64,
}

impl VoteTransition {
    /// The transition that undoes this one.
    pub fn inverse(&self) -> VoteTransition {
        VoteTransition {
            previous: self.next,
            next: self.previous,
            score_delta: -self.score_delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [(VoteState, VoteDirection, VoteState, i64); 6] = [
        (VoteState::None, VoteDirection::Upvote, VoteState::Upvote, 1),
        (VoteState::None, VoteDirection::Downvote, VoteState::Downvote, -1),
        (VoteState::Upvote, VoteDirection::Upvote, VoteState::None, -1),
        (VoteState::Upvote, VoteDirection::Downvote, VoteState::Downvote, -2),
        (VoteState::Downvote, VoteDirection::Upvote, VoteState::Upvote, 2),
        (VoteState::Downvote, VoteDirection::Downvote, VoteState::None, 1),
    ];

    #[test]
    fn transition_table_matches() {
        for (current, direction, expected_state, expected_delta) in TABLE {
            let transition = current.toggle(direction);
            assert_eq!(transition.previous, current);
            assert_eq!(transition.next, expected_state, "{current:?} + {direction:?}");
            assert_eq!(transition.score_delta, expected_delta, "{current:?} + {direction:?}");
        }
    }

    #[test]
    fn delta_equals_weight_difference() {
        for (current, direction, _, _) in TABLE {
            let t = current.toggle(direction);
            assert_eq!(t.score_delta, t.next.weight() - t.previous.weight());
        }
    }

    #[test]
    fn inverse_restores_state_and_score() {
        for (current, direction, _, _) in TABLE {
            let score = 10;
            let t = current.toggle(direction);
            let undo = t.inverse();
            assert_eq!(undo.previous, t.next);
            assert_eq!(undo.next, current);
            assert_eq!(score + t.score_delta + undo.score_delta, score);
        }
    }

    #[test]
    fn wire_format() {
        assert_eq!(serde_json::to_string(&VoteState::Upvote).unwrap(), "\"UPVOTE\"");
        assert_eq!(serde_json::to_string(&VoteState::Downvote).unwrap(), "\"DOWNVOTE\"");
        assert_eq!(serde_json::to_string(&VoteState::None).unwrap(), "null");

        let parsed: VoteState = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, VoteState::None);
        let parsed: VoteState = serde_json::from_str("\"DOWNVOTE\"").unwrap();
        assert_eq!(parsed, VoteState::Downvote);
    }
}
