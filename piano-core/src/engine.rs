use crate::error::EngineError;
use crate::instrument::Instrument;
use crate::tone::Tone;

/// A sound that has been started by a [`SynthEngine`].
pub trait PlaybackHandle {
    /// Playback volume in [0, 1].
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn pause(&mut self);
    /// True once the clip has played to its end.
    fn ended(&self) -> bool;
}

/// The synthesis capability set the keyboard plays through.
pub trait SynthEngine {
    type Handle: PlaybackHandle;

    fn create_instrument(&mut self, id: usize) -> Result<Instrument, EngineError> {
        Instrument::from_id(id).ok_or(EngineError::UnknownInstrument {
            name: format!("#{id}"),
        })
    }

    /// Master volume in [0, 1].
    fn set_volume(&mut self, volume: f32);

    /// Start `tone` in `octave` on the named instrument. `duration` is the
    /// length budget of the sound in seconds.
    fn play(
        &mut self,
        instrument: &str,
        tone: Tone,
        octave: u8,
        duration: f32,
    ) -> Result<Self::Handle, EngineError>;
}

/// Resolve an instrument name the way engines are expected to.
pub fn instrument_by_name(name: &str) -> Result<Instrument, EngineError> {
    Instrument::from_name(name).ok_or_else(|| EngineError::UnknownInstrument {
        name: name.to_string(),
    })
}
