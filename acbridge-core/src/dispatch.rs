use std::convert::TryFrom;
use std::str::FromStr;

use strum::IntoEnumIterator;
use thiserror::Error;

use crate::ac::{AcState, FanSpeed, Mode, Swing, Temperature};
use crate::actuator::Actuator;
use crate::climate::ClimateSensor;
use crate::report;
use crate::store::{PersistedState, StateStore};

const POWER_ON_TOKEN: &str = "AC_ON";
const POWER_OFF_TOKEN: &str = "AC_OFF";
const REPORT_TOKEN: &str = "State";
const RESTART_TOKENS: [&str; 2] = ["/restart", "/reset"];

const ACK_TEXT: &str = "Ok";
const DENIED_TEXT: &str = "Ваш ID в списке разрешенных отсутствует";
const TEMPERATURE_RANGE_TEXT: &str =
    "Неверное значение температуры. Введите от 16 до 31 градуса";

/// One inbound message. Lives for the duration of a single dispatch.
#[derive(Clone, Debug)]
pub struct CommandRecord {
    pub sender: String,
    pub from_name: String,
    pub text: String,
}

/// The fixed token table. Literal tokens are tried before the integer
/// fallback, so a literal that parses as an integer cannot exist.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Power(bool),
    Fan(FanSpeed),
    Mode(Mode),
    Swing(Swing),
    Temperature(i64),
    Report,
    Restart,
}

#[derive(Error, Debug)]
#[error("Failed to parse {0} as command")]
pub struct CommandParseError(String);

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            POWER_ON_TOKEN => return Ok(Command::Power(true)),
            POWER_OFF_TOKEN => return Ok(Command::Power(false)),
            REPORT_TOKEN => return Ok(Command::Report),
            _ if RESTART_TOKENS.contains(&s) => return Ok(Command::Restart),
            _ => {}
        }
        if let Ok(fan) = s.parse::<FanSpeed>() {
            return Ok(Command::Fan(fan));
        }
        if let Ok(mode) = s.parse::<Mode>() {
            return Ok(Command::Mode(mode));
        }
        if let Ok(swing) = s.parse::<Swing>() {
            return Ok(Command::Swing(swing));
        }
        if let Ok(value) = s.parse::<i64>() {
            return Ok(Command::Temperature(value));
        }
        Err(CommandParseError(s.to_string()))
    }
}

/// Keyboard rows offered to the operator, one row per command family.
pub fn keyboard_rows() -> Vec<Vec<String>> {
    vec![
        vec![POWER_ON_TOKEN.to_string(), POWER_OFF_TOKEN.to_string()],
        FanSpeed::iter().map(|f| f.token().to_string()).collect(),
        Mode::iter().map(|m| m.token().to_string()).collect(),
        Swing::iter().map(|s| s.token().to_string()).collect(),
        vec![REPORT_TOKEN.to_string()],
    ]
}

#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Ack,
    Denied,
    TemperatureRange,
    Report(String),
    Welcome { from_name: String },
    /// Acknowledged; the transport should commit its inbound offset and
    /// restart the process.
    Restart,
}

impl Reply {
    pub fn text(&self) -> String {
        match self {
            Reply::Ack | Reply::Restart => ACK_TEXT.to_string(),
            Reply::Denied => DENIED_TEXT.to_string(),
            Reply::TemperatureRange => TEMPERATURE_RANGE_TEXT.to_string(),
            Reply::Report(report) => report.clone(),
            Reply::Welcome { from_name } => format!(
                "Welcome to AC Remote Control, {}.\nUse the keyboard below or send a target temperature between {} and {}.",
                from_name,
                Temperature::MIN,
                Temperature::MAX
            ),
        }
    }

    pub fn with_keyboard(&self) -> bool {
        matches!(self, Reply::Welcome { .. })
    }
}

/// Handles one command at a time: authorize, mutate, render, persist,
/// reply. Owns the canonical state and all three adapters.
pub struct Dispatcher<A, C, S> {
    state: AcState,
    authorized: String,
    actuator: A,
    sensor: C,
    store: S,
}

impl<A, C, S> Dispatcher<A, C, S>
where
    A: Actuator,
    C: ClimateSensor,
    S: StateStore,
{
    pub fn new(
        state: AcState,
        authorized: impl Into<String>,
        actuator: A,
        sensor: C,
        store: S,
    ) -> Self {
        Dispatcher {
            state,
            authorized: authorized.into(),
            actuator,
            sensor,
            store,
        }
    }

    pub fn state(&self) -> &AcState {
        &self.state
    }

    pub fn dispatch(&mut self, record: &CommandRecord) -> Reply {
        // the one gate that must never be bypassed
        if record.sender != self.authorized {
            info!("denied command from {}", record.sender);
            return Reply::Denied;
        }

        let command = match record.text.parse::<Command>() {
            Ok(command) => command,
            Err(_) => {
                return Reply::Welcome {
                    from_name: record.from_name.clone(),
                }
            }
        };
        debug!("dispatching {:?}", command);

        match command {
            Command::Power(on) => {
                self.state.set_power(on);
                // the off frame is itself the "turn off" signal, so power
                // commands render regardless of the powered guard below
                self.actuator.render(&self.state);
                self.persist();
                return Reply::Ack;
            }
            Command::Report => {
                let sample = match self.sensor.sample() {
                    Ok(sample) => Some(sample),
                    Err(e) => {
                        warn!("could not sample climate sensor: {}", e);
                        None
                    }
                };
                return Reply::Report(report::render(&self.state, sample.as_ref()));
            }
            Command::Restart => {
                self.persist();
                return Reply::Restart;
            }
            Command::Fan(fan) => self.state.set_fan(fan),
            Command::Mode(mode) => self.state.set_mode(mode),
            Command::Swing(swing) => self.state.set_swing(swing),
            Command::Temperature(raw) => match Temperature::try_from(raw) {
                Ok(temperature) => self.state.set_temperature(temperature),
                Err(_) => return Reply::TemperatureRange,
            },
        }

        self.persist();
        if self.state.power() {
            self.actuator.render(&self.state);
        }
        Reply::Ack
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&PersistedState::from(&self.state)) {
            warn!("could not persist ac state: {}", e);
        }
    }
}
