//! Signal Tuner Library
//!
//! Drives an external traffic simulator over TraCI: rewrites traffic-light
//! timing programs and aggregates per-step vehicle metrics over a run.

pub mod simulation;
pub mod traci;
