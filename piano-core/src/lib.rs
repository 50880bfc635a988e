//! Host-independent core of the virtual piano.
//!
//! The keyboard widget, its physical-key bindings and fade-out logic live here
//! together with the tone synthesizer that renders the clips it plays. Nothing
//! in this crate touches the DOM, so it builds and tests natively.

pub mod config;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod instrument;
pub mod keyboard;
pub mod keymap;
pub mod oscillator;
pub mod synth;
pub mod tone;

pub use config::PianoConfig;
pub use engine::{PlaybackHandle, SynthEngine};
pub use error::{BindingError, ConfigError, EngineError, ToneError};
pub use instrument::Instrument;
pub use keyboard::{FadeTick, Key, KeyId, KeyboardStatus, KeyboardWidget};
pub use keymap::{Binding, KeyBindings};
pub use synth::{ClipStore, SoundCache, SoundKey, ToneSynth};
pub use tone::{Letter, Tone};
