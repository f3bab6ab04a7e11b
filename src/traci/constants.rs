//! TraCI codes used by this crate

// Commands
pub const CMD_GETVERSION: u8 = 0x00;
pub const CMD_SIMSTEP: u8 = 0x02;
pub const CMD_CLOSE: u8 = 0x7F;

pub const CMD_GET_TL_VARIABLE: u8 = 0xa2;
pub const CMD_SET_TL_VARIABLE: u8 = 0xc2;
pub const CMD_GET_VEHICLE_VARIABLE: u8 = 0xa4;
pub const CMD_GET_SIM_VARIABLE: u8 = 0xab;

/// Offset from a get command to its response command
pub const RESPONSE_OFFSET: u8 = 0x10;

// Variables
pub const TRACI_ID_LIST: u8 = 0x00;
pub const TL_COMPLETE_DEFINITION_RYG: u8 = 0x2b;
pub const TL_COMPLETE_PROGRAM_RYG: u8 = 0x2c;

pub const VAR_SPEED: u8 = 0x40;
pub const VAR_CO2EMISSION: u8 = 0x60;
pub const VAR_FUELCONSUMPTION: u8 = 0x65;
pub const VAR_WAITING_TIME: u8 = 0x7a;

pub const VAR_TELEPORT_STARTING_VEHICLES_NUMBER: u8 = 0x75;
pub const VAR_ARRIVED_VEHICLES_NUMBER: u8 = 0x79;
pub const VAR_MIN_EXPECTED_VEHICLES: u8 = 0x7d;
pub const VAR_COLLIDING_VEHICLES_NUMBER: u8 = 0x80;

// Value types
pub const TYPE_INTEGER: u8 = 0x09;
pub const TYPE_DOUBLE: u8 = 0x0B;
pub const TYPE_STRING: u8 = 0x0C;
pub const TYPE_STRINGLIST: u8 = 0x0E;
pub const TYPE_COMPOUND: u8 = 0x0F;

// Status results
pub const RTYPE_OK: u8 = 0x00;
pub const RTYPE_NOTIMPLEMENTED: u8 = 0x01;
pub const RTYPE_ERR: u8 = 0xFF;
