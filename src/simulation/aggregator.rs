//! Step-loop driver and metric accumulation
//!
//! The aggregator advances the simulator one step at a time for a fixed
//! budget and folds the per-step readings into running totals. A failed
//! round-trip aborts the run and the partial totals are dropped.

use std::time::{Duration, Instant};

use log::{debug, info};

use super::control::SimControl;
use super::error::Result;
use super::session::Session;

/// Default number of steps for a run
pub const DEFAULT_STEP_BUDGET: u32 = 1000;

/// Final metrics of one simulation run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunStats {
    /// Sum over steps and vehicles of instantaneous waiting time
    pub total_waiting_time: f64,
    pub total_co2_emissions: f64,
    pub total_fuel_consumption: f64,
    /// Sum of per-step mean speeds divided by the number of steps
    pub mean_network_speed: f64,
    pub total_arrived_vehicles: u64,
    pub total_collisions: u64,
    pub total_teleported: u64,
    /// Running plus not-yet-inserted vehicles at the end of the run
    pub vehicles_not_arrived: u64,
    pub steps_simulated: u32,
    pub runtime: Duration,
}

/// Lifecycle of a run before finalization.
///
/// Finalizing consumes the aggregator, so a finalized run exists only as its
/// [`RunStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Stepping { step: u32 },
}

/// Running totals while stepping
#[derive(Debug, Default)]
struct Totals {
    waiting_time: f64,
    co2_emissions: f64,
    fuel_consumption: f64,
    speed_mean_sum: f64,
    arrived: u64,
    collisions: u64,
    teleported: u64,
}

pub struct RunAggregator {
    step_budget: u32,
    state: RunState,
    totals: Totals,
    started_at: Option<Instant>,
}

impl RunAggregator {
    pub fn new(step_budget: u32) -> Self {
        Self {
            step_budget,
            state: RunState::NotStarted,
            totals: Totals::default(),
            started_at: None,
        }
    }

    pub fn step_budget(&self) -> u32 {
        self.step_budget
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn steps_done(&self) -> u32 {
        match self.state {
            RunState::NotStarted => 0,
            RunState::Stepping { step } => step,
        }
    }

    /// Whether the budget still allows another step
    pub fn has_remaining_steps(&self) -> bool {
        self.steps_done() < self.step_budget
    }

    /// Advance the simulator one step and accumulate its readings.
    /// Returns `false` without touching the simulator once the budget is spent.
    pub fn advance<C: SimControl>(&mut self, control: &mut C) -> Result<bool> {
        if !self.has_remaining_steps() {
            return Ok(false);
        }
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
        let step = self.steps_done();

        control.step()?;
        self.totals.arrived += control.arrived_count()?;
        self.totals.collisions += control.colliding_count()?;
        self.totals.teleported += control.starting_teleport_count()?;

        let vehicle_ids = control.vehicle_ids()?;
        let vehicle_count = vehicle_ids.len();
        debug!("Step {}: {} vehicles on the network", step, vehicle_count);

        if vehicle_count > 0 {
            let mut speed_sum = 0.0;
            for id in &vehicle_ids {
                let snapshot = control.vehicle_snapshot(id)?;
                self.totals.waiting_time += snapshot.waiting_time;
                self.totals.co2_emissions += snapshot.co2_emission;
                self.totals.fuel_consumption += snapshot.fuel_consumption;
                speed_sum += snapshot.speed;
            }
            self.totals.speed_mean_sum += speed_sum / vehicle_count as f64;
        }

        self.state = RunState::Stepping { step: step + 1 };
        Ok(true)
    }

    /// Sample the not-arrived count and compute the final means.
    ///
    /// The mean speed is divided by every simulated step, including steps
    /// that had no vehicles.
    pub fn finalize<C: SimControl>(self, control: &mut C) -> Result<RunStats> {
        let steps = self.steps_done();
        let vehicles_not_arrived = control.min_expected_count()?;
        let runtime = self
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or_default();

        let mean_network_speed = if steps > 0 {
            self.totals.speed_mean_sum / steps as f64
        } else {
            0.0
        };

        Ok(RunStats {
            total_waiting_time: self.totals.waiting_time,
            total_co2_emissions: self.totals.co2_emissions,
            total_fuel_consumption: self.totals.fuel_consumption,
            mean_network_speed,
            total_arrived_vehicles: self.totals.arrived,
            total_collisions: self.totals.collisions,
            total_teleported: self.totals.teleported,
            vehicles_not_arrived,
            steps_simulated: steps,
            runtime,
        })
    }

    /// Step through the whole budget and finalize
    pub fn run<C: SimControl>(mut self, session: &mut Session<C>) -> Result<RunStats> {
        let control = session.control()?;
        info!("Starting simulation run of {} steps", self.step_budget);
        self.started_at = Some(Instant::now());

        while self.advance(control)? {}

        let stats = self.finalize(control)?;
        info!(
            "Simulation finished after {} steps in {:.2}s",
            stats.steps_simulated,
            stats.runtime.as_secs_f64()
        );
        Ok(stats)
    }
}
