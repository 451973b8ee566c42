use std::fmt::{Display, Formatter};

/// Most recent successful ambient reading. A failed read surfaces as an
/// error at the call site, never as zeroed values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SensorSample {
    pub temperature: u8,
    pub humidity: u8,
}

impl Display for SensorSample {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ temperature: {}, humidity: {} }}",
            self.temperature, self.humidity
        )
    }
}

pub trait ClimateSensor {
    type Error: std::error::Error;

    fn sample(&mut self) -> Result<SensorSample, Self::Error>;
}
