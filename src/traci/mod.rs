//! TraCI wire client for the external simulator
//!
//! Implements the subset of the TraCI protocol needed to rewrite signal
//! programs and read per-step metrics, behind the `SimControl` trait.

pub mod client;
pub mod constants;
mod launcher;
pub mod storage;

pub use client::TraciClient;
pub use launcher::{launch, CONNECT_ATTEMPTS, CONNECT_INTERVAL};
pub use storage::{Reader, Storage};
