//! The two ways an encoded frame reaches the strip: the hardware SPI
//! peripheral, or manual clock/data toggling on a pair of GPIOs.

use embedded_hal::digital::OutputPin;
use log::{info, warn};
use rppal::gpio::Gpio;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use crate::error::StripError;

// BCM numbering of the pins the SPI0 peripheral drives.
const SPI0_SCLK: u8 = 11;
const SPI0_MOSI: u8 = 10;

/// Sink for an encoded frame region.
pub trait Transmit {
    fn send(&mut self, bytes: &[u8]) -> Result<(), StripError>;
}

/// Transmission capability, fixed at acquisition time.
pub enum Transport {
    /// Hardware SPI; the kernel driver clocks the transfer out, so the
    /// physical strip may still be updating when a write returns.
    Spi(Spi),
    /// Synchronous bit-bang on two GPIO outputs. The rate is bounded only
    /// by instruction timing.
    BitBang {
        clock: rppal::gpio::OutputPin,
        data: rppal::gpio::OutputPin,
    },
}

impl Transport {
    /// Claim the SPI bus when the requested pins are its SCLK/MOSI pair,
    /// otherwise claim both pins as plain outputs for bit-banging. Fails
    /// only when neither path is available.
    pub fn acquire(clock_pin: u8, data_pin: u8, baudrate: u32) -> Result<Self, StripError> {
        if clock_pin == SPI0_SCLK && data_pin == SPI0_MOSI {
            match Spi::new(Bus::Spi0, SlaveSelect::Ss0, baudrate, Mode::Mode0) {
                Ok(spi) => {
                    info!("using hardware spi at {} hz", baudrate);
                    return Ok(Transport::Spi(spi));
                }
                Err(err) => warn!("spi bus unavailable ({}), falling back to bit-bang", err),
            }
        }
        let gpio = Gpio::new()?;
        let mut clock = gpio.get(clock_pin)?.into_output();
        let data = gpio.get(data_pin)?.into_output();
        clock.set_low();
        info!(
            "bit-banging on gpio {} (clock) / {} (data)",
            clock_pin, data_pin
        );
        Ok(Transport::BitBang { clock, data })
    }
}

impl Transmit for Transport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), StripError> {
        match self {
            Transport::Spi(spi) => {
                spi.write(bytes)?;
                Ok(())
            }
            Transport::BitBang { clock, data } => clock_out(clock, data, bytes),
        }
    }
}

/// Shift a byte range out MSB first: clock high, data to the bit, clock
/// low. The clock is left low once the range is done.
pub(crate) fn clock_out<C, D>(clock: &mut C, data: &mut D, bytes: &[u8]) -> Result<(), StripError>
where
    C: OutputPin,
    D: OutputPin,
{
    for &byte in bytes {
        for bit in (0..8).rev() {
            clock.set_high().map_err(|_| StripError::PinWrite)?;
            if byte & (1 << bit) != 0 {
                data.set_high().map_err(|_| StripError::PinWrite)?;
            } else {
                data.set_low().map_err(|_| StripError::PinWrite)?;
            }
            clock.set_low().map_err(|_| StripError::PinWrite)?;
        }
    }
    clock.set_low().map_err(|_| StripError::PinWrite)
}
