//! Shared data model layer (structs/constants only).
//!
//! ## Files
//! - `models.rs` — request, fetch, verification and execution records.
//! - `constants.rs` — defaults, environment variable names, embedded key ring.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network/process side effects.
//!
//! ## Compatibility note
//! `VerifyReport` is the `--json` output schema. Keep changes to it explicit.

pub mod constants;
pub mod models;
