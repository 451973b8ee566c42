use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ac::{AcState, FanSpeed, Mode, Swing, Temperature};

/// The on-disk record. Power is deliberately absent: it is re-derived
/// from the deployment default on every startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub mode: Mode,
    pub temperature: Temperature,
    #[serde(rename = "swingVertical")]
    pub swing_vertical: Swing,
    pub fan: FanSpeed,
}

impl From<&AcState> for PersistedState {
    fn from(state: &AcState) -> Self {
        PersistedState {
            mode: state.mode(),
            temperature: state.temperature(),
            swing_vertical: state.swing(),
            fan: state.fan(),
        }
    }
}

impl PersistedState {
    pub fn restore(&self, power_on_start: bool) -> AcState {
        let mut state = AcState::new(power_on_start);
        state.set_mode(self.mode);
        state.set_temperature(self.temperature);
        state.set_swing(self.swing_vertical);
        state.set_fan(self.fan);
        state
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not access state file")]
    Io(#[from] io::Error),
    #[error("Could not decode state file")]
    Deserialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub trait StateStore {
    /// An absent record is not an error: startup falls back to defaults.
    fn load(&self) -> Result<Option<PersistedState>>;
    fn save(&mut self, state: &PersistedState) -> Result<()>;
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> FileStore {
        FileStore { path: path.into() }
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        let bytes = match fs::read(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            res => res?,
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&mut self, state: &PersistedState) -> Result<()> {
        fs::write(&self.path, serde_json::to_vec(state)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;

    fn sample_state() -> AcState {
        let mut state = AcState::new(true);
        state.set_mode(Mode::Heat);
        state.set_temperature(Temperature::try_from(19).unwrap());
        state.set_swing(Swing::On);
        state.set_fan(FanSpeed::Low);
        state
    }

    #[test]
    fn round_trip_preserves_everything_but_power() {
        let state = sample_state();
        let json = serde_json::to_string(&PersistedState::from(&state)).unwrap();
        let record: PersistedState = serde_json::from_str(&json).unwrap();
        let restored = record.restore(false);

        assert_eq!(restored.mode(), state.mode());
        assert_eq!(restored.temperature(), state.temperature());
        assert_eq!(restored.swing(), state.swing());
        assert_eq!(restored.fan(), state.fan());
        // power came from the startup default, not the record
        assert!(state.power());
        assert!(!restored.power());
    }

    #[test]
    fn record_uses_the_legacy_field_names() {
        let json = serde_json::to_string(&PersistedState::from(&sample_state())).unwrap();
        assert!(json.contains("\"swingVertical\""));
        assert!(json.contains("\"mode\""));
        assert!(json.contains("\"temperature\""));
        assert!(json.contains("\"fan\""));
        assert!(!json.contains("power"));
    }

    #[test]
    fn out_of_range_persisted_temperature_is_rejected() {
        let res: std::result::Result<PersistedState, _> = serde_json::from_str(
            "{\"mode\":\"Cool\",\"temperature\":40,\"swingVertical\":\"Off\",\"fan\":\"Auto\"}",
        );
        assert!(res.is_err());
    }

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("acstate.json"));
        let record = PersistedState::from(&sample_state());

        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));
    }

    #[test]
    fn missing_file_loads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nope.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acstate.json");
        fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            FileStore::new(path).load(),
            Err(StoreError::Deserialize(_))
        ));
    }
}
