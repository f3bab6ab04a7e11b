//! Signal-program editing and run aggregation
//!
//! This module holds the logic that sits on our side of the simulator's
//! control interface. It can be driven by any `SimControl` implementation,
//! which is how it is tested without a simulator installed.

mod aggregator;
mod config;
mod control;
mod error;
mod program_editor;
pub mod report;
mod session;
mod types;

pub use aggregator::{RunAggregator, RunState, RunStats, DEFAULT_STEP_BUDGET};
pub use config::{
    default_launch_options, LaunchOption, RunConfig, SumoHome, DEFAULT_CONFIG_FILE, SUMO_HOME_VAR,
};
pub use control::SimControl;
pub use error::{Result, SimError};
pub use program_editor::{
    retime_green_phases, AlternatingGreen, GreenDurationPolicy, PhaseInspection,
    ProgramInspection, ProgramRewrite, RewriteSummary, SignalProgramEditor, DEFAULT_EVEN_GREEN,
    DEFAULT_ODD_GREEN,
};
pub use session::Session;
pub use types::{
    ControlPointId, Phase, SignalClass, TimingProgram, VehicleId, VehicleSnapshot,
};
