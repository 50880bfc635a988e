use std::ops::RangeInclusive;

use crate::error::ConfigError;
use crate::instrument::Instrument;
use crate::keymap::KEYBOARD_SYMBOLS;
use crate::synth::DEFAULT_SAMPLE_RATE;

pub const MIN_OCTAVE_ATTRIBUTE: &str = "data-min-octave";
pub const MAX_OCTAVE_ATTRIBUTE: &str = "data-max-octave";
pub const INSTRUMENT_ATTRIBUTE: &str = "data-instrument";

/// Octaves the synthesizer can voice; wider ranges are rejected.
const OCTAVE_LIMIT: RangeInclusive<u8> = 0..=8;

/// Everything the keyboard needs to know that is not hard-wired into it.
#[derive(Debug, Clone, PartialEq)]
pub struct PianoConfig {
    pub min_octave: u8,
    pub max_octave: u8,
    pub instrument: Instrument,
    /// Physical key symbols, bound to natural keys in order.
    pub keyboard_symbols: String,
    /// Length budget of each played tone, in seconds.
    pub duration: f32,
    pub fade_interval_ms: u32,
    /// Volume removed per fade tick; also the floor at which playback stops.
    pub fade_step: f32,
    pub sample_rate: u32,
    pub container_id: String,
    pub volume_slider_id: String,
    pub volume_value_id: String,
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            min_octave: 1,
            max_octave: 7,
            instrument: Instrument::Piano,
            keyboard_symbols: KEYBOARD_SYMBOLS.to_string(),
            duration: 4.0,
            fade_interval_ms: 50,
            fade_step: 0.05,
            sample_rate: DEFAULT_SAMPLE_RATE,
            container_id: "piano".to_string(),
            volume_slider_id: "volumeSlider".to_string(),
            volume_value_id: "volumeValue".to_string(),
        }
    }
}

impl PianoConfig {
    pub fn octaves(&self) -> RangeInclusive<u8> {
        self.min_octave..=self.max_octave
    }

    /// Override settings from container attributes. Valid values are applied;
    /// each invalid one is returned and leaves the current value untouched.
    pub fn apply_attributes(
        &mut self,
        get_attribute: impl Fn(&str) -> Option<String>,
    ) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let min = parse_octave(MIN_OCTAVE_ATTRIBUTE, get_attribute(MIN_OCTAVE_ATTRIBUTE));
        let max = parse_octave(MAX_OCTAVE_ATTRIBUTE, get_attribute(MAX_OCTAVE_ATTRIBUTE));
        let min = match min {
            Ok(v) => v.unwrap_or(self.min_octave),
            Err(e) => {
                errors.push(e);
                self.min_octave
            }
        };
        let max = match max {
            Ok(v) => v.unwrap_or(self.max_octave),
            Err(e) => {
                errors.push(e);
                self.max_octave
            }
        };
        if min <= max {
            self.min_octave = min;
            self.max_octave = max;
        } else {
            errors.push(ConfigError::EmptyOctaveRange { min, max });
        }

        if let Some(name) = get_attribute(INSTRUMENT_ATTRIBUTE) {
            match Instrument::from_name(name.trim()) {
                Some(instrument) => self.instrument = instrument,
                None => errors.push(ConfigError::UnknownInstrument { name }),
            }
        }

        errors
    }
}

fn parse_octave(attribute: &str, value: Option<String>) -> Result<Option<u8>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().parse::<u8>() {
        Ok(octave) if OCTAVE_LIMIT.contains(&octave) => Ok(Some(octave)),
        _ => Err(ConfigError::InvalidOctave {
            attribute: attribute.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attrs(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_the_page() {
        let config = PianoConfig::default();
        assert_eq!(config.octaves(), 1..=7);
        assert_eq!(config.instrument, Instrument::Piano);
        assert_eq!(config.fade_interval_ms, 50);
        assert!((config.fade_step - 0.05).abs() < f32::EPSILON);
        assert!((config.duration - 4.0).abs() < f32::EPSILON);
        assert_eq!(config.keyboard_symbols.chars().count(), 47);
        assert_eq!(config.container_id, "piano");
        assert_eq!(config.volume_slider_id, "volumeSlider");
        assert_eq!(config.volume_value_id, "volumeValue");
    }

    #[test]
    fn no_attributes_keeps_defaults() {
        let mut config = PianoConfig::default();
        let errors = config.apply_attributes(attrs(&[]));
        assert!(errors.is_empty());
        assert_eq!(config, PianoConfig::default());
    }

    #[test]
    fn attributes_override_range_and_instrument() {
        let mut config = PianoConfig::default();
        let errors = config.apply_attributes(attrs(&[
            (MIN_OCTAVE_ATTRIBUTE, "3"),
            (MAX_OCTAVE_ATTRIBUTE, " 5 "),
            (INSTRUMENT_ATTRIBUTE, "Organ"),
        ]));
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        assert_eq!(config.octaves(), 3..=5);
        assert_eq!(config.instrument, Instrument::Organ);
    }

    #[test]
    fn invalid_octave_is_reported_and_ignored() {
        let mut config = PianoConfig::default();
        let errors = config.apply_attributes(attrs(&[
            (MIN_OCTAVE_ATTRIBUTE, "two"),
            (MAX_OCTAVE_ATTRIBUTE, "12"),
        ]));
        assert_eq!(errors.len(), 2);
        assert_eq!(config.octaves(), 1..=7);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut config = PianoConfig::default();
        let errors = config.apply_attributes(attrs(&[
            (MIN_OCTAVE_ATTRIBUTE, "6"),
            (MAX_OCTAVE_ATTRIBUTE, "2"),
        ]));
        assert_eq!(errors, vec![ConfigError::EmptyOctaveRange { min: 6, max: 2 }]);
        assert_eq!(config.octaves(), 1..=7);
    }

    #[test]
    fn single_octave_range_is_allowed() {
        let mut config = PianoConfig::default();
        let errors = config.apply_attributes(attrs(&[
            (MIN_OCTAVE_ATTRIBUTE, "4"),
            (MAX_OCTAVE_ATTRIBUTE, "4"),
        ]));
        assert!(errors.is_empty());
        assert_eq!(config.octaves(), 4..=4);
    }

    #[test]
    fn unknown_instrument_is_reported() {
        let mut config = PianoConfig::default();
        let errors = config.apply_attributes(attrs(&[(INSTRUMENT_ATTRIBUTE, "theremin")]));
        assert_eq!(
            errors,
            vec![ConfigError::UnknownInstrument {
                name: "theremin".to_string()
            }]
        );
        assert_eq!(config.instrument, Instrument::Piano);
    }
}
