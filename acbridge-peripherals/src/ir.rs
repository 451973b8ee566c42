pub mod tcl;

use std::thread::sleep;
use std::time::Duration;

use rppal::gpio::{Gpio, OutputPin};
use thiserror::Error;

use acbridge_core::ac::AcState;
use acbridge_core::actuator::Actuator;

use crate::GpioError;

const IR_OUTPUT_PIN: u8 = 4;

// 38kHz carrier
const CARRIER_PERIOD: Duration = Duration::from_micros(26);
const CARRIER_PULSE_WIDTH: Duration = Duration::from_micros(13);

/// One mark or space, in microseconds.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct IrPulse(pub u64);

impl IrPulse {
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

/// Alternating mark/space durations, starting with a mark.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IrSequence(pub Vec<IrPulse>);

impl IrSequence {
    pub fn into_inner(self) -> Vec<IrPulse> {
        self.0
    }
}

impl AsRef<[IrPulse]> for IrSequence {
    fn as_ref(&self) -> &[IrPulse] {
        &self.0
    }
}

#[derive(Error, Debug)]
pub enum IrOutError {
    #[error(transparent)]
    Gpio(#[from] GpioError),
    #[error("Could not drive pwm carrier")]
    Pwm(#[source] rppal::gpio::Error),
}

pub type Result<T> = std::result::Result<T, IrOutError>;

/// Infrared transmitter on a gpio pin. Marks are modulated with the
/// carrier through software pwm, spaces leave the pin idle.
pub struct IrOut {
    pin: OutputPin,
    last_applied: Option<AcState>,
}

impl IrOut {
    pub fn new(pin: u8) -> Result<IrOut> {
        let pin = Gpio::new()
            .map_err(|_| GpioError::Initialization)?
            .get(pin)
            .map_err(|_| GpioError::Pin(pin))?
            .into_output_low();
        Ok(IrOut {
            pin,
            last_applied: None,
        })
    }

    pub fn default_pin() -> Result<IrOut> {
        Self::new(IR_OUTPUT_PIN)
    }

    pub fn send(&mut self, sequence: &IrSequence) -> Result<()> {
        for (i, pulse) in sequence.as_ref().iter().enumerate() {
            let length = Duration::from_micros(pulse.into_inner());
            if i % 2 == 0 {
                self.pin
                    .set_pwm(CARRIER_PERIOD, CARRIER_PULSE_WIDTH)
                    .map_err(IrOutError::Pwm)?;
                sleep(length);
                self.pin.clear_pwm().map_err(IrOutError::Pwm)?;
            } else {
                sleep(length);
            }
        }
        Ok(())
    }

    /// What was last pushed to the device.
    pub fn last_applied(&self) -> Option<&AcState> {
        self.last_applied.as_ref()
    }
}

impl Actuator for IrOut {
    fn render(&mut self, state: &AcState) {
        let frame = tcl::frame(state);
        debug!("sending frame [{}] for {:?}", tcl::hex(&frame), state);
        if let Err(e) = self.send(&tcl::encode(state)) {
            error!("could not send ir sequence: {}", e);
        }
        self.last_applied = Some(state.clone());
    }
}
