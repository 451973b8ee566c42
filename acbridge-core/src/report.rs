use serde_json::json;

use crate::ac::AcState;
use crate::climate::SensorSample;

const UNAVAILABLE: &str = "unavailable";

/// Renders the current state plus the latest ambient reading into the
/// message sent back on a state request. Pure; never touches the state.
pub fn render(state: &AcState, sample: Option<&SensorSample>) -> String {
    let report = json!({
        "powerStatus": bold(if state.power() { "ON" } else { "OFF" }),
        "mode": bold(state.mode().label()),
        "temperature": bold(&state.temperature().to_string()),
        "swingVertical": bold(state.swing().label()),
        "fan": bold(state.fan().label()),
        "currentTemperature": sample
            .map(|s| json!(s.temperature))
            .unwrap_or_else(|| json!(UNAVAILABLE)),
        "currentHumidity": sample
            .map(|s| json!(s.humidity))
            .unwrap_or_else(|| json!(UNAVAILABLE)),
    });
    report.to_string()
}

fn bold(text: &str) -> String {
    format!("<b>{}</b>", text)
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;
    use crate::ac::{FanSpeed, Mode, Swing, Temperature};

    #[test]
    fn report_labels_every_field() {
        let mut state = AcState::new(true);
        state.set_mode(Mode::Heat);
        state.set_fan(FanSpeed::Medium);
        state.set_swing(Swing::On);
        state.set_temperature(Temperature::try_from(22).unwrap());

        let report = render(
            &state,
            Some(&SensorSample {
                temperature: 24,
                humidity: 41,
            }),
        );

        assert!(report.contains("\"powerStatus\":\"<b>ON</b>\""));
        assert!(report.contains("\"mode\":\"<b>HEAT</b>\""));
        assert!(report.contains("\"fan\":\"<b>MEDIUM</b>\""));
        assert!(report.contains("\"swingVertical\":\"<b>ON</b>\""));
        assert!(report.contains("\"temperature\":\"<b>22</b>\""));
        assert!(report.contains("\"currentTemperature\":24"));
        assert!(report.contains("\"currentHumidity\":41"));
    }

    #[test]
    fn missing_sample_is_marked_unavailable() {
        let report = render(&AcState::new(false), None);
        assert!(report.contains("\"currentTemperature\":\"unavailable\""));
        assert!(report.contains("\"currentHumidity\":\"unavailable\""));
        assert!(!report.contains("\"currentTemperature\":0"));
    }

    #[test]
    fn power_off_is_labelled() {
        let report = render(&AcState::new(false), None);
        assert!(report.contains("\"powerStatus\":\"<b>OFF</b>\""));
    }
}
