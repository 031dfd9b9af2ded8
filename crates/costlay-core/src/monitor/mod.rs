//! Reactive loop: observe host mutations, debounce, run a cycle with
//! observation paused, resume.

mod controller;
mod debounce;
mod pause;
mod pipeline;


pub use controller::{CycleError, LoopMessage, LoopState, OverlayController, OverlayHandle};
pub use debounce::Debouncer;
pub use pause::ObservationPause;
pub use pipeline::{run_cycle, CycleReport};
