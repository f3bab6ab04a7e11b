//! Big-endian encoding of TraCI values
//!
//! `Storage` builds outgoing payloads, `Reader` walks an incoming message.
//! Reads are length-checked; a short or malformed buffer becomes a
//! communication error instead of a panic.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::constants::{TYPE_COMPOUND, TYPE_DOUBLE, TYPE_INTEGER, TYPE_STRING, TYPE_STRINGLIST};
use crate::simulation::{Phase, Result, SimError, TimingProgram};

/// Fields in a complete program compound
const PROGRAM_COMPONENTS: usize = 5;

/// Fields in a phase compound
const PHASE_COMPONENTS: usize = 6;

#[derive(Debug, Default)]
pub struct Storage {
    buf: BytesMut,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn put_ubyte(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn put_int(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    pub fn put_double(&mut self, value: f64) {
        self.buf.put_f64(value);
    }

    pub fn put_string(&mut self, value: &str) {
        self.buf.put_i32(value.len() as i32);
        self.buf.put_slice(value.as_bytes());
    }

    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn put_typed_int(&mut self, value: i32) {
        self.put_ubyte(TYPE_INTEGER);
        self.put_int(value);
    }

    pub fn put_typed_double(&mut self, value: f64) {
        self.put_ubyte(TYPE_DOUBLE);
        self.put_double(value);
    }

    pub fn put_typed_string(&mut self, value: &str) {
        self.put_ubyte(TYPE_STRING);
        self.put_string(value);
    }

    pub fn put_typed_string_list(&mut self, values: &[&str]) {
        self.put_ubyte(TYPE_STRINGLIST);
        self.put_int(values.len() as i32);
        for value in values {
            self.put_string(value);
        }
    }

    pub fn put_compound(&mut self, components: usize) {
        self.put_ubyte(TYPE_COMPOUND);
        self.put_int(components as i32);
    }

    /// Encode a program in the layout of `TL_COMPLETE_PROGRAM_RYG`
    pub fn put_program(&mut self, program: &TimingProgram) {
        self.put_compound(PROGRAM_COMPONENTS);
        self.put_typed_string(&program.program_id);
        self.put_typed_int(program.logic_type);
        self.put_typed_int(program.current_phase_index);

        self.put_compound(program.phases.len());
        for phase in &program.phases {
            self.put_compound(PHASE_COMPONENTS);
            self.put_typed_double(phase.duration);
            self.put_typed_string(&phase.state);
            self.put_typed_double(phase.min_duration);
            self.put_typed_double(phase.max_duration);
            self.put_compound(phase.next.len());
            for next in &phase.next {
                self.put_typed_int(*next);
            }
            self.put_typed_string(&phase.name);
        }

        self.put_compound(program.parameters.len());
        for (key, value) in &program.parameters {
            self.put_typed_string_list(&[key.as_str(), value.as_str()]);
        }
    }
}

pub struct Reader {
    buf: Bytes,
}

impl Reader {
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self { buf: buf.into() }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn has_remaining(&self) -> bool {
        self.buf.has_remaining()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(SimError::communication(format!(
                "truncated message: needed {} bytes, {} left",
                needed,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    pub fn read_ubyte(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_int(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn read_double(&mut self) -> Result<f64> {
        self.ensure(8)?;
        Ok(self.buf.get_f64())
    }

    /// Read an `i32` that must be a count or length
    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.read_int()?;
        usize::try_from(len)
            .map_err(|_| SimError::communication(format!("negative length {}", len)))
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;
        self.ensure(len)?;
        let raw = self.buf.split_to(len);
        String::from_utf8(raw.to_vec())
            .map_err(|e| SimError::communication(format!("invalid UTF-8 in string: {}", e)))
    }

    pub fn read_string_list(&mut self) -> Result<Vec<String>> {
        let count = self.read_len()?;
        let mut values = Vec::with_capacity(count.min(self.remaining() / 4));
        for _ in 0..count {
            values.push(self.read_string()?);
        }
        Ok(values)
    }

    pub fn expect_type(&mut self, expected: u8) -> Result<()> {
        let found = self.read_ubyte()?;
        if found != expected {
            return Err(SimError::communication(format!(
                "expected value type 0x{:02x}, found 0x{:02x}",
                expected, found
            )));
        }
        Ok(())
    }

    pub fn read_typed_int(&mut self) -> Result<i32> {
        self.expect_type(TYPE_INTEGER)?;
        self.read_int()
    }

    pub fn read_typed_double(&mut self) -> Result<f64> {
        self.expect_type(TYPE_DOUBLE)?;
        self.read_double()
    }

    pub fn read_typed_string(&mut self) -> Result<String> {
        self.expect_type(TYPE_STRING)?;
        self.read_string()
    }

    pub fn read_typed_string_list(&mut self) -> Result<Vec<String>> {
        self.expect_type(TYPE_STRINGLIST)?;
        self.read_string_list()
    }

    /// Read a compound header. With `expected` set, the component count
    /// must match it.
    pub fn read_compound(&mut self, expected: Option<usize>) -> Result<usize> {
        self.expect_type(TYPE_COMPOUND)?;
        let count = self.read_len()?;
        match expected {
            Some(n) if n != count => Err(SimError::communication(format!(
                "expected compound of {} components, found {}",
                n, count
            ))),
            _ => Ok(count),
        }
    }

    /// Decode one program of a `TL_COMPLETE_DEFINITION_RYG` reply
    pub fn read_program(&mut self) -> Result<TimingProgram> {
        self.read_compound(Some(PROGRAM_COMPONENTS))?;
        let program_id = self.read_typed_string()?;
        let logic_type = self.read_typed_int()?;
        let current_phase_index = self.read_typed_int()?;

        let phase_count = self.read_compound(None)?;
        let mut phases = Vec::with_capacity(phase_count.min(64));
        for _ in 0..phase_count {
            self.read_compound(Some(PHASE_COMPONENTS))?;
            let duration = self.read_typed_double()?;
            let state = self.read_typed_string()?;
            let min_duration = self.read_typed_double()?;
            let max_duration = self.read_typed_double()?;
            let next_count = self.read_compound(None)?;
            let mut next = Vec::with_capacity(next_count.min(64));
            for _ in 0..next_count {
                next.push(self.read_typed_int()?);
            }
            let name = self.read_typed_string()?;
            phases.push(Phase {
                duration,
                state,
                min_duration,
                max_duration,
                next,
                name,
            });
        }

        let param_count = self.read_compound(None)?;
        let mut parameters = Vec::with_capacity(param_count.min(64));
        for _ in 0..param_count {
            let pair = self.read_typed_string_list()?;
            match <[String; 2]>::try_from(pair) {
                Ok([key, value]) => parameters.push((key, value)),
                Err(pair) => {
                    return Err(SimError::communication(format!(
                        "program parameter must be a key/value pair, got {} strings",
                        pair.len()
                    )))
                }
            }
        }

        Ok(TimingProgram {
            program_id,
            logic_type,
            current_phase_index,
            phases,
            parameters,
        })
    }
}
