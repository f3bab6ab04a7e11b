//! Scripted stand-in for the simulator used by the integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use signal_tuner::simulation::{
    ControlPointId, Phase, Result, SimControl, SimError, TimingProgram, VehicleId,
    VehicleSnapshot,
};

/// What the fake observed, shared so it survives the session
#[derive(Debug, Default)]
pub struct CallLog {
    pub steps: u32,
    pub set_programs: Vec<(ControlPointId, TimingProgram)>,
    pub min_expected_queries: u32,
    pub closes: u32,
}

/// Readings the fake reports after one step
#[derive(Debug, Clone, Default)]
pub struct StepScript {
    pub arrived: u64,
    pub collided: u64,
    pub teleported: u64,
    pub vehicles: Vec<VehicleSnapshot>,
}

pub struct FakeSim {
    pub control_points: Vec<(ControlPointId, Vec<TimingProgram>)>,
    pub steps: Vec<StepScript>,
    /// Zero-based step index whose advance fails
    pub fail_on_step: Option<u32>,
    pub fail_close: bool,
    pub min_expected: u64,
    pub log: Rc<RefCell<CallLog>>,
    current: Option<usize>,
}

impl FakeSim {
    pub fn new() -> Self {
        Self {
            control_points: Vec::new(),
            steps: Vec::new(),
            fail_on_step: None,
            fail_close: false,
            min_expected: 0,
            log: Rc::new(RefCell::new(CallLog::default())),
            current: None,
        }
    }

    pub fn with_control_point(mut self, id: &str, programs: Vec<TimingProgram>) -> Self {
        self.control_points
            .push((ControlPointId::new(id), programs));
        self
    }

    pub fn with_steps(mut self, steps: Vec<StepScript>) -> Self {
        self.steps = steps;
        self
    }

    pub fn log(&self) -> Rc<RefCell<CallLog>> {
        Rc::clone(&self.log)
    }

    fn current_step(&self) -> Option<&StepScript> {
        self.current.and_then(|i| self.steps.get(i))
    }
}

/// The canonical four-phase program: two greens separated by yellows
pub fn four_phase_program(program_id: &str) -> TimingProgram {
    TimingProgram::new(
        program_id,
        vec![
            Phase::new(30.0, "GGrr"),
            Phase::new(4.0, "yyrr"),
            Phase::new(30.0, "rrGG"),
            Phase::new(4.0, "yyrr"),
        ],
    )
}

pub fn vehicle(waiting_time: f64, co2: f64, fuel: f64, speed: f64) -> VehicleSnapshot {
    VehicleSnapshot {
        waiting_time,
        co2_emission: co2,
        fuel_consumption: fuel,
        speed,
    }
}

impl SimControl for FakeSim {
    fn control_point_ids(&mut self) -> Result<Vec<ControlPointId>> {
        Ok(self
            .control_points
            .iter()
            .map(|(id, _)| id.clone())
            .collect())
    }

    fn programs(&mut self, id: &ControlPointId) -> Result<Vec<TimingProgram>> {
        self.control_points
            .iter()
            .find(|(cp, _)| cp == id)
            .map(|(_, programs)| programs.clone())
            .ok_or_else(|| SimError::communication(format!("unknown traffic light '{}'", id)))
    }

    fn set_program(&mut self, id: &ControlPointId, program: &TimingProgram) -> Result<()> {
        self.log
            .borrow_mut()
            .set_programs
            .push((id.clone(), program.clone()));
        let (_, programs) = self
            .control_points
            .iter_mut()
            .find(|(cp, _)| cp == id)
            .ok_or_else(|| SimError::communication(format!("unknown traffic light '{}'", id)))?;
        match programs
            .iter_mut()
            .find(|p| p.program_id == program.program_id)
        {
            Some(existing) => *existing = program.clone(),
            None => programs.push(program.clone()),
        }
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        let index = self.current.map_or(0, |i| i + 1);
        self.log.borrow_mut().steps += 1;
        if self.fail_on_step == Some(index as u32) {
            return Err(SimError::communication("connection reset by peer"));
        }
        self.current = Some(index);
        Ok(())
    }

    fn arrived_count(&mut self) -> Result<u64> {
        Ok(self.current_step().map_or(0, |s| s.arrived))
    }

    fn colliding_count(&mut self) -> Result<u64> {
        Ok(self.current_step().map_or(0, |s| s.collided))
    }

    fn starting_teleport_count(&mut self) -> Result<u64> {
        Ok(self.current_step().map_or(0, |s| s.teleported))
    }

    fn vehicle_ids(&mut self) -> Result<Vec<VehicleId>> {
        let count = self.current_step().map_or(0, |s| s.vehicles.len());
        Ok((0..count).map(|i| VehicleId(i.to_string())).collect())
    }

    fn vehicle_snapshot(&mut self, id: &VehicleId) -> Result<VehicleSnapshot> {
        let index: usize = id
            .as_str()
            .parse()
            .map_err(|_| SimError::communication(format!("unknown vehicle '{}'", id)))?;
        self.current_step()
            .and_then(|s| s.vehicles.get(index))
            .copied()
            .ok_or_else(|| SimError::communication(format!("unknown vehicle '{}'", id)))
    }

    fn min_expected_count(&mut self) -> Result<u64> {
        self.log.borrow_mut().min_expected_queries += 1;
        Ok(self.min_expected)
    }

    fn close(&mut self) -> Result<()> {
        self.log.borrow_mut().closes += 1;
        if self.fail_close {
            return Err(SimError::communication("broken pipe"));
        }
        Ok(())
    }
}
