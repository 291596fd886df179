//! Service layer: the fetch, verify and execute stages plus output helpers.
//!
//! ## Service map
//! - `fetch.rs` — bounded GETs, the concurrent content/signature fetch, size-limited bodies.
//! - `trust.rs` — embedded key ring + detached signature verification.
//! - `sandbox.rs` — running the verified script under a time limit.
//! - `output.rs` — signer lines and the JSON report.
//!
//! ## Conventions
//! - Every await point races the run's cancellation token.
//! - Side effects should be explicit and localized.
//! - Keep the orchestrator thin; stages live here.

pub mod fetch;
pub mod output;
pub mod sandbox;
pub mod trust;
