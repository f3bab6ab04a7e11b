//! Blocking TraCI client
//!
//! Every request is one framed message carrying one command; the reply is
//! read in full before the next request goes out. Failed requests are
//! reported and never repeated.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::process::Child;

use log::{debug, info, warn};

use super::constants::*;
use super::storage::{Reader, Storage};
use crate::simulation::{
    ControlPointId, Result, SimControl, SimError, TimingProgram, VehicleId, VehicleSnapshot,
};

/// Longest command length that fits the one-byte length field
const MAX_SHORT_COMMAND_LEN: usize = 255;

/// Frame a single command into a complete message
pub fn encode_message(command: u8, payload: &[u8]) -> Storage {
    let short_len = 1 + 1 + payload.len();
    let mut message = Storage::new();
    if short_len <= MAX_SHORT_COMMAND_LEN {
        message.put_int((4 + short_len) as i32);
        message.put_ubyte(short_len as u8);
    } else {
        let long_len = short_len + 4;
        message.put_int((4 + long_len) as i32);
        message.put_ubyte(0);
        message.put_int(long_len as i32);
    }
    message.put_ubyte(command);
    message.put_slice(payload);
    message
}

/// Consume a command length, which is one byte or a zero byte plus an `i32`
fn read_command_len(reader: &mut Reader) -> Result<usize> {
    match reader.read_ubyte()? {
        0 => reader.read_len(),
        len => Ok(len as usize),
    }
}

/// Check the status block that opens every reply
pub fn read_status(reader: &mut Reader, command: u8) -> Result<()> {
    read_command_len(reader)?;
    let id = reader.read_ubyte()?;
    let result = reader.read_ubyte()?;
    let description = reader.read_string()?;
    if id != command {
        return Err(SimError::communication(format!(
            "status for command 0x{:02x} received while waiting for 0x{:02x}",
            id, command
        )));
    }
    match result {
        RTYPE_OK => Ok(()),
        RTYPE_NOTIMPLEMENTED => Err(SimError::communication(format!(
            "command 0x{:02x} not implemented: {}",
            command, description
        ))),
        RTYPE_ERR => Err(SimError::communication(format!(
            "command 0x{:02x} failed: {}",
            command, description
        ))),
        other => Err(SimError::communication(format!(
            "command 0x{:02x} returned unknown status 0x{:02x}: {}",
            command, other, description
        ))),
    }
}

pub struct TraciClient {
    stream: TcpStream,
    process: Option<Child>,
    api_version: i32,
    server_version: String,
}

impl TraciClient {
    /// Connect to a running simulator and check its version
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Self::from_stream(stream)
    }

    pub(crate) fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        let mut client = Self {
            stream,
            process: None,
            api_version: 0,
            server_version: String::new(),
        };
        client.handshake()?;
        Ok(client)
    }

    /// Make the client responsible for the simulator process
    pub(crate) fn attach_process(&mut self, process: Child) {
        self.process = Some(process);
    }

    pub fn api_version(&self) -> i32 {
        self.api_version
    }

    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    fn handshake(&mut self) -> Result<()> {
        let mut reply = self.request(CMD_GETVERSION, &[])?;
        read_command_len(&mut reply)?;
        let id = reply.read_ubyte()?;
        if id != CMD_GETVERSION {
            return Err(SimError::communication(format!(
                "unexpected version response id 0x{:02x}",
                id
            )));
        }
        self.api_version = reply.read_int()?;
        self.server_version = reply.read_string()?;
        info!(
            "Connected to {} (TraCI API {})",
            self.server_version, self.api_version
        );
        Ok(())
    }

    fn send(&mut self, command: u8, payload: &[u8]) -> Result<()> {
        let message = encode_message(command, payload);
        self.stream.write_all(message.as_slice())?;
        self.stream.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<Reader> {
        let mut header = [0u8; 4];
        self.stream.read_exact(&mut header)?;
        let total = i32::from_be_bytes(header);
        let body_len = usize::try_from(total)
            .ok()
            .and_then(|t| t.checked_sub(4))
            .ok_or_else(|| SimError::communication(format!("invalid message length {}", total)))?;
        let mut body = vec![0u8; body_len];
        self.stream.read_exact(&mut body)?;
        Ok(Reader::new(body))
    }

    /// Send one command and return the reply positioned after its status
    fn request(&mut self, command: u8, payload: &[u8]) -> Result<Reader> {
        self.send(command, payload)?;
        let mut reply = self.receive()?;
        read_status(&mut reply, command)?;
        Ok(reply)
    }

    /// Query a variable and return the reply positioned at the value's type byte
    fn get_variable(&mut self, command: u8, variable: u8, object_id: &str) -> Result<Reader> {
        let mut payload = Storage::new();
        payload.put_ubyte(variable);
        payload.put_string(object_id);
        let mut reply = self.request(command, payload.as_slice())?;

        read_command_len(&mut reply)?;
        let response = reply.read_ubyte()?;
        let returned_variable = reply.read_ubyte()?;
        let returned_object = reply.read_string()?;
        if response != command.wrapping_add(RESPONSE_OFFSET)
            || returned_variable != variable
            || returned_object != object_id
        {
            return Err(SimError::communication(format!(
                "mismatched response 0x{:02x}/0x{:02x}/'{}' for query 0x{:02x}/0x{:02x}/'{}'",
                response, returned_variable, returned_object, command, variable, object_id
            )));
        }
        Ok(reply)
    }

    fn get_int(&mut self, command: u8, variable: u8, object_id: &str) -> Result<i32> {
        self.get_variable(command, variable, object_id)?
            .read_typed_int()
    }

    fn get_count(&mut self, command: u8, variable: u8) -> Result<u64> {
        let value = self.get_int(command, variable, "")?;
        u64::try_from(value)
            .map_err(|_| SimError::communication(format!("negative count {}", value)))
    }

    fn get_double(&mut self, command: u8, variable: u8, object_id: &str) -> Result<f64> {
        self.get_variable(command, variable, object_id)?
            .read_typed_double()
    }

    fn get_string_list(&mut self, command: u8, variable: u8) -> Result<Vec<String>> {
        self.get_variable(command, variable, "")?
            .read_typed_string_list()
    }

    fn set_variable(
        &mut self,
        command: u8,
        variable: u8,
        object_id: &str,
        value: &Storage,
    ) -> Result<()> {
        let mut payload = Storage::new();
        payload.put_ubyte(variable);
        payload.put_string(object_id);
        payload.put_slice(value.as_slice());
        self.request(command, payload.as_slice())?;
        Ok(())
    }

    /// Wait for the simulator to exit, killing it first if it may still be stepping
    fn reap_process(&mut self, kill: bool) {
        if let Some(mut process) = self.process.take() {
            if kill {
                if let Err(e) = process.kill() {
                    debug!("Simulator process already gone: {}", e);
                }
            }
            match process.wait() {
                Ok(status) => debug!("Simulator exited with {}", status),
                Err(e) => warn!("Failed to wait for simulator process: {}", e),
            }
        }
    }
}

impl SimControl for TraciClient {
    fn control_point_ids(&mut self) -> Result<Vec<ControlPointId>> {
        let ids = self.get_string_list(CMD_GET_TL_VARIABLE, TRACI_ID_LIST)?;
        Ok(ids.into_iter().map(ControlPointId).collect())
    }

    fn programs(&mut self, id: &ControlPointId) -> Result<Vec<TimingProgram>> {
        let mut reply =
            self.get_variable(CMD_GET_TL_VARIABLE, TL_COMPLETE_DEFINITION_RYG, id.as_str())?;
        let count = reply.read_compound(None)?;
        let mut programs = Vec::with_capacity(count.min(16));
        for _ in 0..count {
            programs.push(reply.read_program()?);
        }
        Ok(programs)
    }

    fn set_program(&mut self, id: &ControlPointId, program: &TimingProgram) -> Result<()> {
        let mut value = Storage::new();
        value.put_program(program);
        self.set_variable(
            CMD_SET_TL_VARIABLE,
            TL_COMPLETE_PROGRAM_RYG,
            id.as_str(),
            &value,
        )
    }

    fn step(&mut self) -> Result<()> {
        let mut payload = Storage::new();
        payload.put_double(0.0);
        let mut reply = self.request(CMD_SIMSTEP, payload.as_slice())?;
        // Subscription results follow; this client never subscribes.
        reply.read_int()?;
        Ok(())
    }

    fn arrived_count(&mut self) -> Result<u64> {
        self.get_count(CMD_GET_SIM_VARIABLE, VAR_ARRIVED_VEHICLES_NUMBER)
    }

    fn colliding_count(&mut self) -> Result<u64> {
        self.get_count(CMD_GET_SIM_VARIABLE, VAR_COLLIDING_VEHICLES_NUMBER)
    }

    fn starting_teleport_count(&mut self) -> Result<u64> {
        self.get_count(CMD_GET_SIM_VARIABLE, VAR_TELEPORT_STARTING_VEHICLES_NUMBER)
    }

    fn vehicle_ids(&mut self) -> Result<Vec<VehicleId>> {
        let ids = self.get_string_list(CMD_GET_VEHICLE_VARIABLE, TRACI_ID_LIST)?;
        Ok(ids.into_iter().map(VehicleId).collect())
    }

    fn vehicle_snapshot(&mut self, id: &VehicleId) -> Result<VehicleSnapshot> {
        let id = id.as_str();
        Ok(VehicleSnapshot {
            waiting_time: self.get_double(CMD_GET_VEHICLE_VARIABLE, VAR_WAITING_TIME, id)?,
            co2_emission: self.get_double(CMD_GET_VEHICLE_VARIABLE, VAR_CO2EMISSION, id)?,
            fuel_consumption: self.get_double(CMD_GET_VEHICLE_VARIABLE, VAR_FUELCONSUMPTION, id)?,
            speed: self.get_double(CMD_GET_VEHICLE_VARIABLE, VAR_SPEED, id)?,
        })
    }

    fn min_expected_count(&mut self) -> Result<u64> {
        self.get_count(CMD_GET_SIM_VARIABLE, VAR_MIN_EXPECTED_VEHICLES)
    }

    fn close(&mut self) -> Result<()> {
        let result = self.request(CMD_CLOSE, &[]).map(|_| ());
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            debug!("Socket shutdown after close: {}", e);
        }
        self.reap_process(result.is_err());
        result
    }
}

impl Drop for TraciClient {
    fn drop(&mut self) {
        self.reap_process(true);
    }
}
