use std::collections::BTreeMap;

use crate::{Error, Result};
use crate::regs::labjack as regs;

/// In-memory stand-in for a device: a register file preloaded with analog inputs and a device
/// temperature, which records every write it receives.
#[derive(Debug, Clone)]
pub struct SimDriver {
    registers: BTreeMap<u16, u16>,
    writes: Vec<(u16, Vec<u16>)>,
    connected: bool,
}

impl Default for SimDriver {
    fn default() -> Self {
        let mut driver = SimDriver {
            registers: BTreeMap::new(),
            writes: Vec::new(),
            connected: true,
        };
        for channel in 0..regs::AIN_COUNT {
            driver.set_analog_input(channel, 0.0);
        }
        driver.set_internal_temperature(298.0);
        driver
    }
}

impl SimDriver {
    pub fn new() -> SimDriver {
        Self::default()
    }

    pub fn set_analog_input(&mut self, channel: u8, volts: f32) {
        let addr = regs::ain_address(channel).expect("analog input out of range");
        self.store_f32(addr, volts);
    }

    pub fn set_internal_temperature(&mut self, kelvin: f32) {
        self.store_f32(regs::ADDR_TEMPERATURE_DEVICE_K, kelvin);
    }

    /// Makes every subsequent access fail as if the cable was pulled.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    pub fn writes(&self) -> &[(u16, Vec<u16>)] {
        &self.writes
    }

    fn store_f32(&mut self, addr: u16, value: f32) {
        let [high, low] = regs::f32_to_words(value);
        self.registers.insert(addr, high);
        self.registers.insert(addr + 1, low);
    }
}

impl super::Driver for SimDriver {
    fn read_registers(&mut self, addr: u16, data: &mut [u16]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotFound)
        }
        for (offset, word) in data.iter_mut().enumerate() {
            let reg_addr = addr.wrapping_add(offset as u16);
            *word = *self.registers.get(&reg_addr).ok_or_else(||
                Error::DeviceRead(format!("register {} is not readable", reg_addr)))?;
        }
        log::trace!("sim: read_registers({}) = {:04x?}", addr, data);
        Ok(())
    }

    fn write_registers(&mut self, addr: u16, data: &[u16]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotFound)
        }
        log::trace!("sim: write_registers({}, {:04x?})", addr, data);
        for (offset, &word) in data.iter().enumerate() {
            self.registers.insert(addr.wrapping_add(offset as u16), word);
        }
        self.writes.push((addr, data.to_vec()));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.connected {
            return Err(Error::NotFound)
        }
        log::trace!("sim: close");
        self.connected = false;
        Ok(())
    }
}
