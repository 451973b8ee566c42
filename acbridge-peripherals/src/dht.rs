use std::thread::sleep;
use std::time::{Duration, Instant};

use rppal::gpio::{Gpio, IoPin, Mode};
use thiserror::Error;

use acbridge_core::climate::{ClimateSensor, SensorSample};

use crate::GpioError;

const DHT_PIN: u8 = 12;

const START_LOW: Duration = Duration::from_millis(18);
const START_RELEASE: Duration = Duration::from_micros(30);
const EDGE_TIMEOUT: Duration = Duration::from_millis(2);
// a one bit holds the line high for ~70us, a zero for ~26us
const ONE_THRESHOLD: Duration = Duration::from_micros(48);
// the sensor cannot be strobed faster than once a second
const MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum DhtError {
    #[error(transparent)]
    Gpio(#[from] GpioError),
    #[error("Sensor did not respond in time")]
    Timeout,
    #[error("Checksum mismatch in sensor payload")]
    Checksum,
}

pub type Result<T> = std::result::Result<T, DhtError>;

/// Single-wire temperature and humidity sensor. Reads are paced to the
/// device minimum interval; within that window the previous sample is
/// returned unchanged.
pub struct Dht11 {
    pin: IoPin,
    last: Option<(Instant, SensorSample)>,
}

impl Dht11 {
    pub fn new(pin: u8) -> Result<Dht11> {
        let mut pin = Gpio::new()
            .map_err(|_| GpioError::Initialization)?
            .get(pin)
            .map_err(|_| GpioError::Pin(pin))?
            .into_io(Mode::Output);
        pin.set_high();
        Ok(Dht11 { pin, last: None })
    }

    pub fn default_pin() -> Result<Dht11> {
        Self::new(DHT_PIN)
    }

    /// Waits out the current level, returning how long it was held.
    fn level_length(&self, high: bool, timeout: Duration) -> Result<Duration> {
        let start = Instant::now();
        while self.pin.is_high() == high {
            if start.elapsed() > timeout {
                return Err(DhtError::Timeout);
            }
        }
        Ok(start.elapsed())
    }

    fn read_raw(&mut self) -> Result<[u8; 5]> {
        self.pin.set_mode(Mode::Output);
        self.pin.set_low();
        sleep(START_LOW);
        self.pin.set_high();
        let release = Instant::now();
        while release.elapsed() < START_RELEASE {}
        self.pin.set_mode(Mode::Input);

        // response preamble: ~80us low, ~80us high
        self.level_length(true, EDGE_TIMEOUT)?;
        self.level_length(false, EDGE_TIMEOUT)?;
        self.level_length(true, EDGE_TIMEOUT)?;

        let mut bytes = [0u8; 5];
        for i in 0..40 {
            self.level_length(false, EDGE_TIMEOUT)?;
            let held = self.level_length(true, EDGE_TIMEOUT)?;
            bytes[i / 8] <<= 1;
            if held > ONE_THRESHOLD {
                bytes[i / 8] |= 1;
            }
        }

        let sum = bytes[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        if sum != bytes[4] {
            return Err(DhtError::Checksum);
        }
        Ok(bytes)
    }
}

impl ClimateSensor for Dht11 {
    type Error = DhtError;

    fn sample(&mut self) -> std::result::Result<SensorSample, DhtError> {
        if let Some((at, sample)) = self.last {
            if at.elapsed() < MIN_INTERVAL {
                trace!("returning paced sample {}", sample);
                return Ok(sample);
            }
        }

        let bytes = self.read_raw()?;
        let sample = SensorSample {
            humidity: bytes[0],
            temperature: bytes[2],
        };
        debug!("sampled {}", sample);
        self.last = Some((Instant::now(), sample));
        Ok(sample)
    }
}
