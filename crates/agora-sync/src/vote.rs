//! Optimistic vote toggling with rollback.
//!
//! A vote is applied to the entry's cells before the request leaves, and
//! the exact inverse is applied if the request fails:
//!
//! ```text
//! tap ─► auth? ──no──► LoginRequired
//!         │yes
//!         ▼
//!       claim id ──taken──► Busy (cells untouched)
//!         │
//!         ▼
//!       apply transition ─► send new state ─┬─ ok ──► Applied
//!                                           └─ err ─► apply inverse ─► RolledBack
//! ```

use std::future::Future;
use std::hash::Hash;

use agora_types::{DataError, DataResult, VoteDirection, VoteState, VoteTransition};
use tracing::{debug, warn};

use crate::cell::ObservableCell;
use crate::guard::InFlight;

/// An entity carrying a score and the caller's vote.
pub trait Votable {
    type Id: Eq + Hash + Clone + std::fmt::Display;

    fn vote_id(&self) -> &Self::Id;
    fn score(&self) -> &ObservableCell<i64>;
    fn vote_state(&self) -> &ObservableCell<VoteState>;
}

/// What happened to a vote tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The server accepted the new state; the cells keep it.
    Applied(VoteState),
    /// The server rejected the change; the cells are back where they were.
    RolledBack(DataError),
    /// No session; the UI should prompt for login.
    LoginRequired,
    /// A vote on the same entity is still in flight; the tap was dropped.
    Busy,
}

/// Serializes votes per entity id.
#[derive(Debug)]
pub struct VoteEngine<K> {
    in_flight: InFlight<K>,
}

impl<K: Eq + Hash + Clone> Default for VoteEngine<K> {
    fn default() -> Self {
        Self {
            in_flight: InFlight::new(),
        }
    }
}

fn apply<E: Votable>(entry: &E, transition: &VoteTransition) {
    entry.vote_state().set(transition.next);
    entry.score().update(|score| *score += transition.score_delta);
}

impl<K: Eq + Hash + Clone + std::fmt::Display> VoteEngine<K> {
    pub fn new() -> Self {
        Self {
            in_flight: InFlight::new(),
        }
    }

    /// Whether a vote on `id` is waiting for the server.
    pub fn is_in_flight(&self, id: &K) -> bool {
        self.in_flight.is_in_flight(id)
    }

    /// Toggle `direction` on `entry` and push the resulting state with `send`.
    ///
    /// If the returned future is dropped while `send` is pending the
    /// optimistic state stays and the id is released.
    pub async fn toggle<E, F, Fut>(
        &self,
        entry: &E,
        direction: VoteDirection,
        authenticated: bool,
        send: F,
    ) -> VoteOutcome
    where
        E: Votable<Id = K>,
        F: FnOnce(VoteState) -> Fut,
        Fut: Future<Output = DataResult<()>>,
    {
        if !authenticated {
            debug!(entity_id = %entry.vote_id(), "Vote requires login");
            return VoteOutcome::LoginRequired;
        }

        let Some(_permit) = self.in_flight.try_acquire(entry.vote_id()) else {
            warn!(entity_id = %entry.vote_id(), "Vote already in flight, dropping tap");
            return VoteOutcome::Busy;
        };

        let transition = entry.vote_state().get().toggle(direction);
        apply(entry, &transition);
        debug!(
            entity_id = %entry.vote_id(),
            state = ?transition.next,
            score_delta = transition.score_delta,
            "Vote applied optimistically"
        );

        match send(transition.next).await {
            Ok(()) => VoteOutcome::Applied(transition.next),
            Err(error) => {
                apply(entry, &transition.inverse());
                warn!(
                    entity_id = %entry.vote_id(),
                    error = %error,
                    "Vote rejected, rolled back"
                );
                VoteOutcome::RolledBack(error)
            }
        }
    }
}
