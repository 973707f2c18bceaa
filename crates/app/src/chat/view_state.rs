use crate::chat::message::ResponseId;

/// Pane arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Single chat pane. Initial state.
    Unified,
    /// Chat pane plus a dedicated response pane showing only the most
    /// recent response, flagged as latest.
    Split { latest: ResponseId },
}

impl ViewState {
    pub fn is_split(&self) -> bool {
        matches!(self, Self::Split { .. })
    }

    /// The response currently flagged latest, if split.
    pub fn latest(&self) -> Option<ResponseId> {
        match self {
            Self::Split { latest } => Some(*latest),
            Self::Unified => None,
        }
    }
}

/// What one transition did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEffect {
    /// Unified became split; the response carries the latest flag.
    EnteredSplit(ResponseId),
    /// Split stayed split; displayed content replaced and the latest flag
    /// moved off `previous`.
    ReplacedLatest {
        previous: ResponseId,
        current: ResponseId,
    },
    /// Split became unified; content purge is deferred until
    /// `finish_reset` so the exit transition can play.
    ResetDeferred,
    /// Re-entered the current state. Nothing to do.
    NoChange,
}

/// Deterministic unified/split state machine.
///
/// Only successful responses drive transitions into split; there is no
/// failure input by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewStateMachine {
    state: ViewState,
    pending_purge: bool,
}

impl Default for ViewStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStateMachine {
    pub fn new() -> Self {
        Self {
            state: ViewState::Unified,
            pending_purge: false,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn purge_pending(&self) -> bool {
        self.pending_purge
    }

    /// A successful response arrived.
    pub fn response_arrived(&mut self, response: ResponseId) -> ViewEffect {
        self.pending_purge = false;
        match self.state {
            ViewState::Unified => {
                self.state = ViewState::Split { latest: response };
                ViewEffect::EnteredSplit(response)
            }
            ViewState::Split { latest: previous } => {
                self.state = ViewState::Split { latest: response };
                ViewEffect::ReplacedLatest {
                    previous,
                    current: response,
                }
            }
        }
    }

    /// Explicit user action (new session, clear).
    pub fn user_reset(&mut self) -> ViewEffect {
        match self.state {
            ViewState::Split { .. } => {
                self.state = ViewState::Unified;
                self.pending_purge = true;
                ViewEffect::ResetDeferred
            }
            ViewState::Unified => ViewEffect::NoChange,
        }
    }

    /// Completes a deferred reset. Returns true when a purge was pending.
    pub fn finish_reset(&mut self) -> bool {
        std::mem::take(&mut self.pending_purge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_unified() {
        let machine = ViewStateMachine::new();
        assert_eq!(machine.state(), ViewState::Unified);
    }

    #[test]
    fn first_success_enters_split_with_latest_flag() {
        let mut machine = ViewStateMachine::new();

        let effect = machine.response_arrived(ResponseId::new(1));

        assert_eq!(effect, ViewEffect::EnteredSplit(ResponseId::new(1)));
        assert_eq!(machine.state().latest(), Some(ResponseId::new(1)));
    }

    #[test]
    fn subsequent_success_moves_the_latest_flag() {
        let mut machine = ViewStateMachine::new();
        machine.response_arrived(ResponseId::new(1));

        let effect = machine.response_arrived(ResponseId::new(2));

        assert_eq!(
            effect,
            ViewEffect::ReplacedLatest {
                previous: ResponseId::new(1),
                current: ResponseId::new(2),
            }
        );
        assert_eq!(machine.state().latest(), Some(ResponseId::new(2)));
    }

    #[test]
    fn reset_from_split_defers_the_purge() {
        let mut machine = ViewStateMachine::new();
        machine.response_arrived(ResponseId::new(1));

        assert_eq!(machine.user_reset(), ViewEffect::ResetDeferred);
        assert_eq!(machine.state(), ViewState::Unified);
        assert!(machine.purge_pending());

        assert!(machine.finish_reset());
        assert!(!machine.purge_pending());
        assert!(!machine.finish_reset());
    }

    #[test]
    fn reset_in_unified_is_a_no_op() {
        let mut machine = ViewStateMachine::new();
        assert_eq!(machine.user_reset(), ViewEffect::NoChange);
        assert_eq!(machine.state(), ViewState::Unified);
    }
}
