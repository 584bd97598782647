use chrono::{DateTime, Utc};
use dashmap::DashMap;

pub type UserId = u64;

/// Where a user is in the conversation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingCity { since: DateTime<Utc> },
}

#[derive(Debug, Default)]
pub struct Sessions {
    states: DashMap<UserId, SessionState>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, user: UserId) -> SessionState {
        self.states
            .get(&user)
            .map(|state| *state)
            .unwrap_or_default()
    }

    /// Idle -> AwaitingCity. Asking again just restarts the wait.
    pub fn await_city(&self, user: UserId, now: DateTime<Utc>) {
        self.states
            .insert(user, SessionState::AwaitingCity { since: now });
    }

    /// AwaitingCity -> Idle, returning when the city was asked for if a
    /// request was pending for the user.
    pub fn take_pending_city(&self, user: UserId) -> Option<DateTime<Utc>> {
        match self.states.insert(user, SessionState::Idle)? {
            SessionState::AwaitingCity { since } => Some(since),
            SessionState::Idle => None,
        }
    }

    /// Forgets idle users, returning how many entries were dropped.
    /// Pending city requests are kept however old they are.
    pub fn sweep(&self) -> usize {
        let before = self.states.len();
        self.states
            .retain(|_, state| matches!(state, SessionState::AwaitingCity { .. }));

        before.saturating_sub(self.states.len())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
