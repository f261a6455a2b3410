use crate::Error;

/// Register-level access to a data acquisition device.
///
/// Registers are 16 bits wide; 32-bit quantities span two consecutive registers, most
/// significant word first.
pub trait Driver {
    fn read_registers(&mut self, addr: u16, data: &mut [u16]) -> Result<(), Error>;
    fn write_registers(&mut self, addr: u16, data: &[u16]) -> Result<(), Error>;

    /// Releases the device. Any later access fails with `Error::NotFound`.
    fn close(&mut self) -> Result<(), Error>;
}

mod sim;

pub use sim::SimDriver;
