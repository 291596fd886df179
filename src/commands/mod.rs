//! Command handler layer.
//!
//! `run.rs` owns the run lifecycle: cancellation scope, stage order and the
//! hand-off from verification to execution. Stage logic lives in `services/*`.

pub mod run;

pub use run::{handle_run, watch_interrupt, ProcessAnnounce};
