use std::collections::HashMap;

use crate::config::PianoConfig;
use crate::engine::{PlaybackHandle, SynthEngine};
use crate::instrument::Instrument;
use crate::keymap::{symbol_for_key_code, KeyBindings, PEDAL_KEY_CODE, SHARP_KEY_CODE};
use crate::tone::{Letter, Tone};

/// Index of a key in creation order.
pub type KeyId = usize;

/// Modifier toggles held on the physical keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardStatus {
    /// Sustain: fade ticks are skipped while held.
    pub pedal: bool,
    /// Physical keys resolve to the sharp of their bound tone.
    pub sharp: bool,
}

/// Outcome of one fade tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeTick {
    Continue,
    Done,
}

/// One (tone, octave) key and its playback state.
#[derive(Debug)]
pub struct Key<H> {
    tone: Tone,
    octave: u8,
    pressed: bool,
    fading: bool,
    current_tone: Option<H>,
}

impl<H> Key<H> {
    fn new(tone: Tone, octave: u8) -> Self {
        Self {
            tone,
            octave,
            pressed: false,
            fading: false,
            current_tone: None,
        }
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    /// True from press until the release fade has completed.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_fading(&self) -> bool {
        self.fading
    }

    pub fn is_sharp(&self) -> bool {
        self.tone.sharp
    }

    pub fn current_tone(&self) -> Option<&H> {
        self.current_tone.as_ref()
    }

    /// Button caption, e.g. `C#4`.
    pub fn label(&self) -> String {
        format!("{}{}", self.tone, self.octave)
    }
}

/// The virtual piano: keys, physical-key bindings and the modifier status,
/// playing through a [`SynthEngine`].
///
/// The widget is host independent. The host renders [`keys`](Self::keys),
/// forwards pointer and keyboard input, and drives one fade timer per key
/// whenever a release reports that a fade has begun.
pub struct KeyboardWidget<E: SynthEngine> {
    engine: E,
    config: PianoConfig,
    instrument: Instrument,
    keys: Vec<Key<E::Handle>>,
    index: HashMap<(Tone, u8), KeyId>,
    bindings: KeyBindings,
    status: KeyboardStatus,
}

impl<E: SynthEngine> KeyboardWidget<E> {
    pub fn new(mut engine: E, config: PianoConfig) -> Self {
        let instrument = match engine.create_instrument(config.instrument.id()) {
            Ok(instrument) => instrument,
            Err(e) => {
                log::warn!("{e}; falling back to {}", config.instrument.name());
                config.instrument
            }
        };
        let bindings = KeyBindings::new(&config.keyboard_symbols);
        let mut widget = Self {
            engine,
            config,
            instrument,
            keys: Vec::new(),
            index: HashMap::new(),
            bindings,
            status: KeyboardStatus::default(),
        };
        for octave in widget.config.octaves() {
            widget.create_octave(octave);
        }
        log::info!(
            "Built {} keys, {} bound to physical keys",
            widget.keys.len(),
            widget.bindings.len()
        );
        widget
    }

    fn create_octave(&mut self, octave: u8) {
        for letter in Letter::SCALE {
            let natural = Tone::natural(letter);
            self.add_key(natural, octave);
            if let Err(e) = self.bindings.bind(natural, octave) {
                log::warn!("{e}: {natural}{octave} has no physical key");
            }

            // Sharps are reached through the sharp modifier, never bound.
            if letter.has_sharp() {
                self.add_key(natural.sharpened(), octave);
            }
        }
    }

    fn add_key(&mut self, tone: Tone, octave: u8) {
        self.index.insert((tone, octave), self.keys.len());
        self.keys.push(Key::new(tone, octave));
    }

    pub fn keys(&self) -> &[Key<E::Handle>] {
        &self.keys
    }

    pub fn key(&self, id: KeyId) -> Option<&Key<E::Handle>> {
        self.keys.get(id)
    }

    pub fn find_key(&self, tone: Tone, octave: u8) -> Option<KeyId> {
        self.index.get(&(tone, octave)).copied()
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn status(&self) -> KeyboardStatus {
        self.status
    }

    pub fn config(&self) -> &PianoConfig {
        &self.config
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// Press the key for a tone string such as `"C#"` or `"E♭"`. Invalid tones
    /// and tones without a key are ignored.
    pub fn press_tone(&mut self, tone: &str, octave: u8) -> Option<KeyId> {
        let tone: Tone = match tone.parse() {
            Ok(tone) => tone,
            Err(e) => {
                log::debug!("Ignoring tone {tone:?}: {e}");
                return None;
            }
        };
        let Some(id) = self.find_key(tone, octave) else {
            log::debug!("No key for {tone}{octave}");
            return None;
        };
        self.press_key(id);
        Some(id)
    }

    /// Start playback on a key. A sound still sounding from an earlier press
    /// is stopped and its fade cancelled. Returns whether playback started.
    pub fn press_key(&mut self, id: KeyId) -> bool {
        let Some(key) = self.keys.get_mut(id) else {
            return false;
        };

        if let Some(mut previous) = key.current_tone.take() {
            previous.pause();
        }
        key.fading = false;

        match self.engine.play(
            self.instrument.name(),
            key.tone,
            key.octave,
            self.config.duration,
        ) {
            Ok(handle) => {
                key.current_tone = Some(handle);
                key.pressed = true;
                true
            }
            Err(e) => {
                log::warn!("Could not play {}: {e}", key.label());
                key.pressed = false;
                false
            }
        }
    }

    /// Begin the release fade of a key. Returns true if the host must start a
    /// fade timer calling [`fade_tick`](Self::fade_tick) for this key.
    pub fn release_key(&mut self, id: KeyId) -> bool {
        match self.keys.get_mut(id) {
            Some(key) if key.current_tone.is_some() && !key.fading => {
                key.fading = true;
                true
            }
            _ => false,
        }
    }

    /// One step of a key's release fade.
    pub fn fade_tick(&mut self, id: KeyId) -> FadeTick {
        let pedal = self.status.pedal;
        let step = self.config.fade_step;
        let Some(key) = self.keys.get_mut(id) else {
            return FadeTick::Done;
        };
        // Cancelled by a new press.
        if !key.fading {
            return FadeTick::Done;
        }

        let finished = match key.current_tone.as_mut() {
            None => true,
            Some(handle) if handle.ended() => true,
            Some(_) if pedal => return FadeTick::Continue,
            Some(handle) => {
                let volume = handle.volume();
                if volume > step {
                    handle.set_volume(volume - step);
                    false
                } else {
                    handle.pause();
                    true
                }
            }
        };

        if finished {
            key.current_tone = None;
            key.fading = false;
            key.pressed = false;
            FadeTick::Done
        } else {
            FadeTick::Continue
        }
    }

    /// Physical key-down. Returns the key that was pressed, if any.
    pub fn key_down(&mut self, code: u32) -> Option<KeyId> {
        match code {
            PEDAL_KEY_CODE => {
                self.status.pedal = true;
                None
            }
            SHARP_KEY_CODE => {
                self.status.sharp = true;
                None
            }
            _ => {
                let id = self.key_for_code(code)?;
                self.press_key(id);
                Some(id)
            }
        }
    }

    /// Physical key-up. Only a pressed key is released; returns it if its fade
    /// has begun.
    pub fn key_up(&mut self, code: u32) -> Option<KeyId> {
        match code {
            PEDAL_KEY_CODE => {
                self.status.pedal = false;
                None
            }
            SHARP_KEY_CODE => {
                self.status.sharp = false;
                None
            }
            _ => {
                let id = self.key_for_code(code)?;
                if !self.keys[id].pressed {
                    return None;
                }
                self.release_key(id).then_some(id)
            }
        }
    }

    fn key_for_code(&self, code: u32) -> Option<KeyId> {
        let binding = self.bindings.lookup(symbol_for_key_code(code)?)?;
        let tone = if self.status.sharp {
            binding.tone.sharpened()
        } else {
            binding.tone
        };
        self.find_key(tone, binding.octave)
    }

    /// Relay the volume slider (0–100) to the engine.
    pub fn set_volume(&mut self, slider_value: f64) {
        let volume = (slider_value / 100.0).clamp(0.0, 1.0) as f32;
        self.engine.set_volume(volume);
    }
}
