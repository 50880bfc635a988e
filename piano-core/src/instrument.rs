use crate::oscillator::Waveform;

/// Peak amplitude the dampening curves are tuned against (half of i16 range).
const REFERENCE_AMPLITUDE: f32 = 16384.0;

/// Sound profiles the synthesizer can render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Instrument {
    #[default]
    Piano,
    Organ,
    Acoustic,
    Edm,
}

impl Instrument {
    pub const VARIANTS: &'static [Instrument] = &[
        Instrument::Piano,
        Instrument::Organ,
        Instrument::Acoustic,
        Instrument::Edm,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Piano => "piano",
            Instrument::Organ => "organ",
            Instrument::Acoustic => "acoustic",
            Instrument::Edm => "edm",
        }
    }

    pub fn id(&self) -> usize {
        Self::VARIANTS
            .iter()
            .position(|i| i == self)
            .unwrap_or_default()
    }

    pub fn from_id(id: usize) -> Option<Self> {
        Self::VARIANTS.get(id).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|i| i.name().eq_ignore_ascii_case(name))
    }

    pub fn waveform(&self) -> Waveform {
        match self {
            Instrument::Piano => Waveform::Piano,
            Instrument::Organ => Waveform::Organ,
            Instrument::Acoustic => Waveform::Acoustic,
            Instrument::Edm => Waveform::Edm,
        }
    }

    /// Attack time in seconds.
    pub fn attack(&self) -> f32 {
        match self {
            Instrument::Organ => 0.3,
            _ => 0.002,
        }
    }

    /// Exponent of the decay curve. Higher notes die away faster on the piano
    /// and the organ.
    pub fn dampen(&self, sample_rate: f32, frequency: f32) -> f32 {
        match self {
            Instrument::Piano => {
                let x = (frequency * REFERENCE_AMPLITUDE / sample_rate).max(1.0);
                (0.5 * x.ln()).powi(2)
            }
            Instrument::Organ => 1.0 + frequency * 0.01,
            Instrument::Acoustic => 1.0,
            Instrument::Edm => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piano_is_instrument_zero() {
        assert_eq!(Instrument::from_id(0), Some(Instrument::Piano));
        assert_eq!(Instrument::Piano.id(), 0);
        assert_eq!(Instrument::default(), Instrument::Piano);
    }

    #[test]
    fn ids_round_trip() {
        for (i, instrument) in Instrument::VARIANTS.iter().enumerate() {
            assert_eq!(instrument.id(), i);
            assert_eq!(Instrument::from_id(i), Some(*instrument));
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert_eq!(Instrument::from_id(4), None);
        assert_eq!(Instrument::from_id(usize::MAX), None);
    }

    #[test]
    fn lookup_by_name_ignores_case() {
        assert_eq!(Instrument::from_name("piano"), Some(Instrument::Piano));
        assert_eq!(Instrument::from_name("Organ"), Some(Instrument::Organ));
        assert_eq!(Instrument::from_name("EDM"), Some(Instrument::Edm));
        assert_eq!(Instrument::from_name("harpsichord"), None);
    }

    #[test]
    fn organ_has_slow_attack() {
        assert!(Instrument::Organ.attack() > Instrument::Piano.attack());
    }

    #[test]
    fn piano_dampens_high_notes_harder() {
        let low = Instrument::Piano.dampen(44100.0, 65.4);
        let high = Instrument::Piano.dampen(44100.0, 2093.0);
        assert!(high > low, "low {} high {}", low, high);
        assert!(low > 0.0);
    }
}
