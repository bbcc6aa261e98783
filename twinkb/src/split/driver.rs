use embedded_hal::i2c::{Error as _, I2c};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SplitDriverError {
    /// The transport reported a failed transaction
    BusError,
    /// The transport moved fewer or more bytes than a packet holds
    WrongLength(usize),
}

/// Blocking bus primitive the master uses to reach the peer half.
///
/// Retries, clocking and timeouts belong to the transport. Both methods return the number of
/// bytes moved.
pub trait SplitBus {
    fn read_packet(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, SplitDriverError>;

    fn write_packet(&mut self, address: u8, data: &[u8]) -> Result<usize, SplitDriverError>;
}

impl<T: I2c> SplitBus for T {
    fn read_packet(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, SplitDriverError> {
        self.read(address, buf).map_err(|e| {
            debug!("I2c read from {:#x} failed: {:?}", address, e.kind());
            SplitDriverError::BusError
        })?;
        Ok(buf.len())
    }

    fn write_packet(&mut self, address: u8, data: &[u8]) -> Result<usize, SplitDriverError> {
        self.write(address, data).map_err(|e| {
            debug!("I2c write to {:#x} failed: {:?}", address, e.kind());
            SplitDriverError::BusError
        })?;
        Ok(data.len())
    }
}
