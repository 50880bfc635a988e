/// Range of the volume slider.
pub const SLIDER_MAX: f64 = 100.0;

/// Parse the raw value of the volume slider. Non-numeric input is rejected,
/// out-of-range input is clamped.
pub fn parse_slider_value(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, SLIDER_MAX))
}

/// Last value seen on the volume slider, held on the page.
/// Each `change` event is compared against it so unchanged values are not
/// sent to the engine (a change re-renders every cached clip).
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeControl {
    pub value: Option<f64>,
    /// Text shown in the readout: the raw slider value.
    pub readout: String,
}

impl VolumeControl {
    pub fn new() -> Self {
        Self {
            value: None,
            readout: String::new(),
        }
    }

    /// Record a slider value. Returns the value to relay to the engine, or
    /// `None` if it did not change or could not be parsed.
    pub fn update(&mut self, raw: &str) -> Option<f64> {
        self.readout = raw.to_string();
        let value = parse_slider_value(raw)?;
        if self.value == Some(value) {
            return None;
        }
        self.value = Some(value);
        Some(value)
    }
}

impl Default for VolumeControl {
    fn default() -> Self {
        Self::new()
    }
}
