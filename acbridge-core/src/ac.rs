use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;
use thiserror::Error;

/// Operating mode of the appliance. Tokens are matched case-sensitively;
/// the wire contract with the operator is the exact literal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, Serialize, Deserialize)]
pub enum Mode {
    Auto,
    Cool,
    Heat,
    Dry,
}

#[derive(Error, Debug)]
#[error("Unknown mode token")]
pub struct InvalidMode;

impl FromStr for Mode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Auto" => Ok(Mode::Auto),
            "Cool" => Ok(Mode::Cool),
            "Heat" => Ok(Mode::Heat),
            "Dry" => Ok(Mode::Dry),
            _ => Err(InvalidMode),
        }
    }
}

impl Mode {
    pub fn token(&self) -> &'static str {
        match self {
            Mode::Auto => "Auto",
            Mode::Cool => "Cool",
            Mode::Heat => "Heat",
            Mode::Dry => "Dry",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Auto => "AUTO",
            Mode::Cool => "COOL",
            Mode::Heat => "HEAT",
            Mode::Dry => "DRY",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, Serialize, Deserialize)]
pub enum FanSpeed {
    Auto,
    Low,
    Medium,
    High,
}

#[derive(Error, Debug)]
#[error("Unknown fan speed token")]
pub struct InvalidFanSpeed;

impl FromStr for FanSpeed {
    type Err = InvalidFanSpeed;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fan_Auto" => Ok(FanSpeed::Auto),
            "Fan_Low" => Ok(FanSpeed::Low),
            "Fan_Med" => Ok(FanSpeed::Medium),
            "Fan_High" => Ok(FanSpeed::High),
            _ => Err(InvalidFanSpeed),
        }
    }
}

impl FanSpeed {
    pub fn token(&self) -> &'static str {
        match self {
            FanSpeed::Auto => "Fan_Auto",
            FanSpeed::Low => "Fan_Low",
            FanSpeed::Medium => "Fan_Med",
            FanSpeed::High => "Fan_High",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FanSpeed::Auto => "AUTO",
            FanSpeed::Low => "LOW",
            FanSpeed::Medium => "MEDIUM",
            FanSpeed::High => "HIGH",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, Serialize, Deserialize)]
pub enum Swing {
    On,
    Off,
}

#[derive(Error, Debug)]
#[error("Unknown swing token")]
pub struct InvalidSwing;

impl FromStr for Swing {
    type Err = InvalidSwing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "swing_on" => Ok(Swing::On),
            "swing_off" => Ok(Swing::Off),
            _ => Err(InvalidSwing),
        }
    }
}

impl Swing {
    pub fn token(&self) -> &'static str {
        match self {
            Swing::On => "swing_on",
            Swing::Off => "swing_off",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Swing::On => "ON",
            Swing::Off => "OFF",
        }
    }
}

/// Target temperature in whole degrees. Values outside 16..=31 are
/// unrepresentable.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "i64")]
pub struct Temperature(u8);

impl Temperature {
    pub const MIN: u8 = 16;
    pub const MAX: u8 = 31;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Temperature(26)
    }
}

#[derive(Error, Debug)]
#[error("Temperature out of range")]
pub struct TemperatureOutOfRange;

impl TryFrom<i64> for Temperature {
    type Error = TemperatureOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Temperature(value as u8))
        } else {
            Err(TemperatureOutOfRange)
        }
    }
}

impl From<Temperature> for u8 {
    fn from(t: Temperature) -> Self {
        t.0
    }
}

impl Display for Temperature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical state of the one controlled appliance. Every field always
/// holds a valid value; mutation goes through the typed setters only.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AcState {
    temperature: Temperature,
    fan: FanSpeed,
    mode: Mode,
    swing: Swing,
    power: bool,
}

impl Default for AcState {
    fn default() -> Self {
        AcState {
            temperature: Temperature::default(),
            fan: FanSpeed::Auto,
            mode: Mode::Cool,
            swing: Swing::Off,
            power: false,
        }
    }
}

impl AcState {
    pub fn new(power_on_start: bool) -> AcState {
        AcState {
            power: power_on_start,
            ..AcState::default()
        }
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    pub fn fan(&self) -> FanSpeed {
        self.fan
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn swing(&self) -> Swing {
        self.swing
    }

    pub fn power(&self) -> bool {
        self.power
    }

    pub fn set_temperature(&mut self, temperature: Temperature) {
        self.temperature = temperature;
    }

    pub fn set_fan(&mut self, fan: FanSpeed) {
        self.fan = fan;
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn set_swing(&mut self, swing: Swing) {
        self.swing = swing;
    }

    pub fn set_power(&mut self, power: bool) {
        self.power = power;
    }
}
