//! The request/response interface to the external simulator
//!
//! Everything non-trivial (routing, signal execution, vehicle dynamics)
//! happens on the other side of this trait. Each method is one blocking
//! round-trip; implementations must not retry.

use super::error::Result;
use super::types::{ControlPointId, TimingProgram, VehicleId, VehicleSnapshot};

pub trait SimControl {
    /// All control point ids in the simulator's enumeration order
    fn control_point_ids(&mut self) -> Result<Vec<ControlPointId>>;

    /// Every timing program known for a control point, simulator order
    fn programs(&mut self, id: &ControlPointId) -> Result<Vec<TimingProgram>>;

    /// Replace the program with the same program id
    fn set_program(&mut self, id: &ControlPointId, program: &TimingProgram) -> Result<()>;

    /// Advance exactly one discrete step
    fn step(&mut self) -> Result<()>;

    /// Vehicles that completed their route during the last step
    fn arrived_count(&mut self) -> Result<u64>;

    /// Vehicles newly involved in a collision during the last step
    fn colliding_count(&mut self) -> Result<u64>;

    /// Vehicles that started teleporting during the last step
    fn starting_teleport_count(&mut self) -> Result<u64>;

    /// Vehicles currently in the network
    fn vehicle_ids(&mut self) -> Result<Vec<VehicleId>>;

    fn vehicle_snapshot(&mut self, id: &VehicleId) -> Result<VehicleSnapshot>;

    /// Running vehicles plus vehicles loaded but not yet inserted
    fn min_expected_count(&mut self) -> Result<u64>;

    fn close(&mut self) -> Result<()>;
}
