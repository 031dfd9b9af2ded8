use tokio::sync::watch;

use super::LoopState;
use crate::dom::MutationObserver;

/// Observation is suspended for as long as this guard lives.
///
/// Creating it disconnects the observer and reports [`LoopState::Idle`];
/// dropping it (also while unwinding) reconnects and reports
/// [`LoopState::Observing`].
pub struct ObservationPause<'a> {
    observer: &'a MutationObserver,
    state: &'a watch::Sender<LoopState>,
}

impl<'a> ObservationPause<'a> {
    pub fn new(observer: &'a MutationObserver, state: &'a watch::Sender<LoopState>) -> Self {
        observer.disconnect();
        state.send_replace(LoopState::Idle);
        Self { observer, state }
    }
}

impl Drop for ObservationPause<'_> {
    fn drop(&mut self) {
        self.observer.reconnect();
        self.state.send_replace(LoopState::Observing);
    }
}
