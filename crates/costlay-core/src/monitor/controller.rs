use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::debounce::Debouncer;
use super::pause::ObservationPause;
use super::pipeline::{panic_message, run_cycle, CycleReport};
use crate::config::Settings;
use crate::dom::MutationObserver;
use crate::page::{PageEvent, ReadyState, SharedPage};
use crate::render::{teardown, RenderState, TeardownReport};

/// Reactive loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopState {
    /// Observation paused: a cycle is running (or nothing is attached yet)
    Idle,
    /// Waiting for host mutations
    Observing,
    /// Debounce window running
    Pending,
    /// Controller disposed; the loop has ended
    Disposed,
}

/// Message sent from the overlay loop to its owner
#[derive(Debug)]
pub enum LoopMessage {
    /// A cycle ran to completion
    CycleCompleted(CycleReport),
    /// A cycle aborted; observation was restored
    CycleFailed(String),
    /// The page unloaded and the controller tore its targets down
    Disposed(TeardownReport),
}

/// Error type for a single cycle
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("controller is not attached to a page")]
    Detached,

    #[error("cycle panicked: {0}")]
    Panicked(String),
}

/// Receiving side of a started controller
pub struct OverlayHandle {
    pub messages: mpsc::Receiver<LoopMessage>,
    pub state: watch::Receiver<LoopState>,
    pub task: JoinHandle<()>,
}

/// Owns observation of one page and everything rendered into it
pub struct OverlayController {
    page: SharedPage,
    settings: Settings,
    observer: Option<MutationObserver>,
    events: Option<mpsc::UnboundedReceiver<PageEvent>>,
    render_state: RenderState,
    state_tx: watch::Sender<LoopState>,
    cycles: u64,
}

impl OverlayController {
    pub fn new(page: SharedPage, settings: Settings) -> Self {
        let (state_tx, _) = watch::channel(LoopState::Idle);
        Self {
            page,
            settings,
            observer: None,
            events: None,
            render_state: RenderState::new(),
            state_tx,
            cycles: 0,
        }
    }

    /// Start observing the page's document and lifecycle
    pub fn attach(&mut self) {
        if self.observer.is_some() {
            return;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let mutation_tx = tx.clone();
        let observer = MutationObserver::new(move |record| {
            let _ = mutation_tx.send(PageEvent::Mutation(record));
        });

        {
            let mut page = self.page.lock();
            observer.observe(&mut page.document);
            page.add_listener(tx);
        }

        self.observer = Some(observer);
        self.events = Some(rx);
        self.state_tx.send_replace(LoopState::Observing);
    }

    pub fn state(&self) -> watch::Receiver<LoopState> {
        self.state_tx.subscribe()
    }

    pub fn is_observing(&self) -> bool {
        self.observer.as_ref().is_some_and(|o| o.is_connected())
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    /// Number of cycles run so far (including failed ones)
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one cycle now with observation paused.
    ///
    /// Observation is restored afterwards even if a stage panics.
    pub fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        let observer = self.observer.as_ref().ok_or(CycleError::Detached)?;
        self.cycles += 1;

        // Pause and resume while holding the page, so no host write can land
        // between the two. `_pause` drops before `page`.
        let mut page = self.page.lock();
        let _pause = ObservationPause::new(observer, &self.state_tx);
        let settings = &self.settings;
        let render_state = &mut self.render_state;
        panic::catch_unwind(AssertUnwindSafe(|| run_cycle(&mut page, settings, render_state)))
            .map_err(|payload| CycleError::Panicked(panic_message(payload.as_ref())))
    }

    /// Stop observing, destroy the chart and remove every render target
    pub fn dispose(&mut self) -> TeardownReport {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.events = None;
        let report = {
            let mut page = self.page.lock();
            teardown(&mut page.document, &mut self.render_state, &self.settings)
        };
        self.state_tx.send_replace(LoopState::Disposed);
        info!("Overlay disposed after {} cycles", self.cycles);
        report
    }

    /// Attach if needed and run the loop in a background task
    pub fn start(mut self) -> OverlayHandle {
        self.attach();
        let (tx, rx) = mpsc::channel(32);
        let state = self.state();

        let task = tokio::spawn(async move {
            self.run(tx).await;
        });

        OverlayHandle {
            messages: rx,
            state,
            task,
        }
    }

    /// Run the observe/debounce/cycle loop until the page unloads
    async fn run(mut self, tx: mpsc::Sender<LoopMessage>) {
        let Some(mut events) = self.events.take() else {
            warn!("Overlay loop started without an attached page");
            return;
        };
        let mut debouncer = Debouncer::new(Duration::from_millis(self.settings.debounce_ms));

        let mut loaded = self.page.lock().ready_state() == ReadyState::Complete;
        if loaded {
            self.arm(&mut debouncer);
        } else {
            debug!("Page still loading; first cycle waits for load");
        }

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(PageEvent::Mutation(_)) => {
                        if loaded {
                            self.arm(&mut debouncer);
                        }
                    }
                    Some(PageEvent::Loaded) => {
                        loaded = true;
                        self.arm(&mut debouncer);
                    }
                    Some(PageEvent::Unloaded) | None => break,
                },
                _ = debouncer.fired() => {
                    // Notifications queued up to now are covered by this cycle
                    let mut unloaded = false;
                    while let Ok(event) = events.try_recv() {
                        match event {
                            PageEvent::Unloaded => unloaded = true,
                            PageEvent::Loaded => loaded = true,
                            PageEvent::Mutation(_) => {}
                        }
                    }
                    if unloaded {
                        break;
                    }

                    let message = match self.run_cycle() {
                        Ok(report) => LoopMessage::CycleCompleted(report),
                        Err(e) => {
                            error!("Overlay cycle failed: {}", e);
                            LoopMessage::CycleFailed(e.to_string())
                        }
                    };
                    if let Err(e) = tx.try_send(message) {
                        debug!("Cycle report dropped: {}", e);
                    }
                }
            }
        }

        let report = self.dispose();
        let _ = tx.try_send(LoopMessage::Disposed(report));
    }

    fn arm(&self, debouncer: &mut Debouncer) {
        debouncer.schedule();
        self.state_tx.send_replace(LoopState::Pending);
    }
}
