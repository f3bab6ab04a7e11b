//! Core types for signal programs and vehicle metrics
//!
//! These mirror the data the simulator hands out through its control
//! interface. Nothing here talks to the simulator.

use std::fmt;

/// Identifier of a signal-controlled intersection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlPointId(pub String);

impl ControlPointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run-scoped identifier of a vehicle currently in the network
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VehicleId(pub String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification of a phase by its signal-state string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalClass {
    /// At least one movement has priority green (`G`) or yield green (`g`)
    Green,
    /// No green, at least one yellow
    Yellow,
    /// Everything else
    Red,
}

impl SignalClass {
    /// Classify a state string. Green wins over yellow.
    pub fn of(state: &str) -> Self {
        if state.chars().any(|c| c == 'G' || c == 'g') {
            SignalClass::Green
        } else if state.chars().any(|c| c == 'y' || c == 'Y') {
            SignalClass::Yellow
        } else {
            SignalClass::Red
        }
    }

    pub fn is_green(self) -> bool {
        self == SignalClass::Green
    }
}

/// One entry of a timing program's cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    /// Duration in seconds
    pub duration: f64,
    /// One character per controlled movement
    pub state: String,
    pub min_duration: f64,
    pub max_duration: f64,
    /// Indices of allowed successor phases (empty means "the next one")
    pub next: Vec<i32>,
    pub name: String,
}

impl Phase {
    /// A static phase whose min and max durations equal its duration
    pub fn new(duration: f64, state: impl Into<String>) -> Self {
        Self {
            duration,
            state: state.into(),
            min_duration: duration,
            max_duration: duration,
            next: Vec::new(),
            name: String::new(),
        }
    }

    pub fn class(&self) -> SignalClass {
        SignalClass::of(&self.state)
    }
}

/// The phase schedule for one control point
///
/// Phase order is the cycle order. Fields beyond the program id and phases
/// are carried so that a program can be written back exactly as it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingProgram {
    pub program_id: String,
    pub logic_type: i32,
    pub current_phase_index: i32,
    pub phases: Vec<Phase>,
    pub parameters: Vec<(String, String)>,
}

impl TimingProgram {
    pub fn new(program_id: impl Into<String>, phases: Vec<Phase>) -> Self {
        Self {
            program_id: program_id.into(),
            logic_type: 0,
            current_phase_index: 0,
            phases,
            parameters: Vec::new(),
        }
    }

    /// Sum of all phase durations
    pub fn cycle_time(&self) -> f64 {
        self.phases.iter().map(|p| p.duration).sum()
    }
}

/// Instantaneous per-vehicle readings at one step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VehicleSnapshot {
    /// Seconds spent below the halting speed since last moving
    pub waiting_time: f64,
    /// mg/s
    pub co2_emission: f64,
    /// mg/s
    pub fuel_consumption: f64,
    /// m/s
    pub speed: f64,
}
