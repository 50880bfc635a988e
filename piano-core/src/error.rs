use std::fmt;

/// A tone string that does not match `[A-G]` optionally followed by `#` or `♭`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToneError {
    Empty,
    InvalidLetter { ch: char },
    InvalidAccidental { ch: char },
    TrailingInput { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    CapacityExceeded { capacity: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    UnknownInstrument { name: String },
    Wav(String),
    /// Failure reported by the host audio layer (DOM, Web Audio).
    Host(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidOctave { attribute: String, value: String },
    EmptyOctaveRange { min: u8, max: u8 },
    UnknownInstrument { name: String },
}

impl fmt::Display for ToneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneError::Empty => write!(f, "Empty tone"),
            ToneError::InvalidLetter { ch } => write!(f, "Invalid tone letter '{ch}'"),
            ToneError::InvalidAccidental { ch } => write!(f, "Invalid accidental '{ch}'"),
            ToneError::TrailingInput { text } => write!(f, "Unexpected trailing input '{text}'"),
        }
    }
}

impl std::error::Error for ToneError {}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::CapacityExceeded { capacity } => {
                write!(f, "No more keys available (all {capacity} bound)")
            }
        }
    }
}

impl std::error::Error for BindingError {}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::UnknownInstrument { name } => write!(f, "Unknown instrument '{name}'"),
            EngineError::Wav(e) => write!(f, "WAV encoding failed: {e}"),
            EngineError::Host(e) => write!(f, "Audio host error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<hound::Error> for EngineError {
    fn from(e: hound::Error) -> Self {
        EngineError::Wav(e.to_string())
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidOctave { attribute, value } => {
                write!(f, "Invalid octave '{value}' in {attribute}")
            }
            ConfigError::EmptyOctaveRange { min, max } => {
                write!(f, "Octave range {min}..={max} is empty")
            }
            ConfigError::UnknownInstrument { name } => write!(f, "Unknown instrument '{name}'"),
        }
    }
}

impl std::error::Error for ConfigError {}
