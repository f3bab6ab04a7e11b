//! Signal-program rewriting and inspection
//!
//! The editor pulls the default (first) program of every control point,
//! overwrites the durations of its green phases with a per-control-point
//! target and pushes the program back. Yellow and red phases are never
//! touched.

use log::info;

use super::control::SimControl;
use super::error::{Result, SimError};
use super::session::Session;
use super::types::{ControlPointId, SignalClass, TimingProgram};

/// Green duration for control points at an even enumeration rank
pub const DEFAULT_EVEN_GREEN: f64 = 50.0;

/// Green duration for control points at an odd enumeration rank
pub const DEFAULT_ODD_GREEN: f64 = 80.0;

/// Chooses the green duration for a control point from its enumeration rank
pub trait GreenDurationPolicy {
    fn target_duration(&self, rank: usize) -> f64;
}

impl<F: Fn(usize) -> f64> GreenDurationPolicy for F {
    fn target_duration(&self, rank: usize) -> f64 {
        self(rank)
    }
}

/// Alternates between two durations by rank parity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlternatingGreen {
    pub even: f64,
    pub odd: f64,
}

impl Default for AlternatingGreen {
    fn default() -> Self {
        Self {
            even: DEFAULT_EVEN_GREEN,
            odd: DEFAULT_ODD_GREEN,
        }
    }
}

impl GreenDurationPolicy for AlternatingGreen {
    fn target_duration(&self, rank: usize) -> f64 {
        if rank % 2 == 0 {
            self.even
        } else {
            self.odd
        }
    }
}

/// Outcome of rewriting one control point
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramRewrite {
    pub control_point: ControlPointId,
    pub rank: usize,
    pub program_id: String,
    pub target_duration: f64,
    pub phases_changed: usize,
}

/// Per-control-point results, in enumeration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewriteSummary {
    pub rewrites: Vec<ProgramRewrite>,
}

impl RewriteSummary {
    pub fn phases_changed(&self, id: &ControlPointId) -> Option<usize> {
        self.rewrites
            .iter()
            .find(|r| &r.control_point == id)
            .map(|r| r.phases_changed)
    }

    pub fn total_phases_changed(&self) -> usize {
        self.rewrites.iter().map(|r| r.phases_changed).sum()
    }

    pub fn len(&self) -> usize {
        self.rewrites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewrites.is_empty()
    }
}

/// One phase as seen by the inspector
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseInspection {
    pub index: usize,
    pub duration: f64,
    pub state: String,
    pub class: SignalClass,
}

impl PhaseInspection {
    /// Only green phases are changed by a rewrite
    pub fn is_modifiable(&self) -> bool {
        self.class.is_green()
    }
}

/// Read-only view of a control point's default program
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramInspection {
    pub control_point: ControlPointId,
    pub program_id: String,
    pub cycle_time: f64,
    pub phases: Vec<PhaseInspection>,
}

/// Set the duration of every green phase to `target`.
/// Returns the number of phases changed.
pub fn retime_green_phases(program: &mut TimingProgram, target: f64) -> usize {
    let mut changed = 0;
    for phase in program.phases.iter_mut() {
        if phase.class().is_green() {
            phase.duration = target;
            changed += 1;
        }
    }
    changed
}

/// Pick the default program: the first one the simulator lists
fn default_program(id: &ControlPointId, programs: Vec<TimingProgram>) -> Result<TimingProgram> {
    programs
        .into_iter()
        .next()
        .ok_or_else(|| SimError::NoActiveProgram {
            control_point: id.to_string(),
        })
}

pub struct SignalProgramEditor<P: GreenDurationPolicy = AlternatingGreen> {
    policy: P,
}

impl Default for SignalProgramEditor<AlternatingGreen> {
    fn default() -> Self {
        Self::new(AlternatingGreen::default())
    }
}

impl<P: GreenDurationPolicy> SignalProgramEditor<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Rewrite the green phases of every control point's default program
    pub fn rewrite_all_programs<C: SimControl>(
        &self,
        session: &mut Session<C>,
    ) -> Result<RewriteSummary> {
        let control = session.control()?;
        let ids = control.control_point_ids()?;
        info!("Found {} traffic lights, applying new timings", ids.len());

        let mut summary = RewriteSummary::default();
        for (rank, id) in ids.into_iter().enumerate() {
            let target = self.policy.target_duration(rank);
            let mut program = default_program(&id, control.programs(&id)?)?;

            let changed = retime_green_phases(&mut program, target);
            control.set_program(&id, &program)?;

            info!(
                "[{}] TLS '{}' -> Set {} green phases to {}s",
                if rank % 2 == 0 { "EVEN" } else { "ODD" },
                id,
                changed,
                target
            );
            summary.rewrites.push(ProgramRewrite {
                control_point: id,
                rank,
                program_id: program.program_id,
                target_duration: target,
                phases_changed: changed,
            });
        }
        Ok(summary)
    }

    /// Describe every control point's default program without changing it
    pub fn inspect_programs<C: SimControl>(
        &self,
        session: &mut Session<C>,
    ) -> Result<Vec<ProgramInspection>> {
        let control = session.control()?;
        let ids = control.control_point_ids()?;

        let mut inspections = Vec::with_capacity(ids.len());
        for id in ids {
            let program = default_program(&id, control.programs(&id)?)?;
            let phases = program
                .phases
                .iter()
                .enumerate()
                .map(|(index, phase)| PhaseInspection {
                    index,
                    duration: phase.duration,
                    state: phase.state.clone(),
                    class: phase.class(),
                })
                .collect();
            inspections.push(ProgramInspection {
                cycle_time: program.cycle_time(),
                program_id: program.program_id,
                control_point: id,
                phases,
            });
        }
        Ok(inspections)
    }
}
