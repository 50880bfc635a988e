use std::collections::HashMap;
use std::io::Cursor;

use crate::envelope::Envelope;
use crate::error::EngineError;
use crate::instrument::Instrument;
use crate::oscillator::Oscillator;
use crate::tone::Tone;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Renders complete tone clips as 16-bit mono PCM.
///
/// Unlike a streaming voice, each clip is rendered up front for its whole
/// duration budget, so the host can hand it to any player that accepts a WAV
/// file. The master volume is baked into the samples.
#[derive(Debug, Clone)]
pub struct ToneSynth {
    sample_rate: u32,
    volume: f32,
}

impl ToneSynth {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            volume: 1.0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Returns true if the volume changed, meaning previously rendered clips
    /// are stale.
    pub fn set_volume(&mut self, volume: f32) -> bool {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        let changed = (volume - self.volume).abs() > f32::EPSILON;
        self.volume = volume;
        changed
    }

    pub fn render(&self, instrument: Instrument, tone: Tone, octave: u8, duration: f32) -> Vec<i16> {
        let sample_rate = self.sample_rate as f32;
        let frequency = tone.frequency(octave);

        let envelope = Envelope::from_seconds(
            instrument.attack(),
            duration,
            instrument.dampen(sample_rate, frequency),
            sample_rate,
        );
        let mut oscillator = Oscillator::new(instrument.waveform());
        oscillator.set_sample_rate(sample_rate);
        oscillator.set_frequency(frequency);

        let peak = self.volume * i16::MAX as f32;
        (0..envelope.total_samples())
            .map(|i| (oscillator.tick() * envelope.gain(i) * peak) as i16)
            .collect()
    }

    pub fn render_wav(
        &self,
        instrument: Instrument,
        tone: Tone,
        octave: u8,
        duration: f32,
    ) -> Result<Vec<u8>, EngineError> {
        let samples = self.render(instrument, tone, octave, duration);
        encode_wav(&samples, self.sample_rate)
    }
}

impl Default for ToneSynth {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

/// Encode mono 16-bit samples as a RIFF/WAVE file.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, EngineError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Identifies one rendered clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundKey {
    pub instrument: Instrument,
    pub tone: Tone,
    pub octave: u8,
    pub duration_ms: u32,
}

impl SoundKey {
    pub fn new(instrument: Instrument, tone: Tone, octave: u8, duration: f32) -> Self {
        Self {
            instrument,
            tone,
            octave,
            duration_ms: (duration.max(0.0) * 1000.0).round() as u32,
        }
    }
}

/// Memo of per-clip values (encoded bytes, object URLs, ...).
#[derive(Debug)]
pub struct SoundCache<V> {
    entries: HashMap<SoundKey, V>,
}

impl<V> SoundCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: SoundKey,
        make: impl FnOnce() -> Result<V, E>,
    ) -> Result<&V, E> {
        if !self.entries.contains_key(&key) {
            let value = make()?;
            self.entries.insert(key, value);
        }
        // Present: either found or just inserted.
        Ok(&self.entries[&key])
    }

    /// Drop every entry, handing the values back for cleanup.
    pub fn clear(&mut self) -> Vec<V> {
        self.entries.drain().map(|(_, v)| v).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for SoundCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Rendered clips keyed by [`SoundKey`], kept in step with the master volume.
///
/// `V` is whatever the host makes from the WAV bytes (an object URL, a decoded
/// buffer). Stale values are handed back on a volume change rather than
/// destroyed, since the host may still be playing them.
#[derive(Debug)]
pub struct ClipStore<V> {
    synth: ToneSynth,
    clips: SoundCache<V>,
}

impl<V> ClipStore<V> {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            synth: ToneSynth::new(sample_rate),
            clips: SoundCache::new(),
        }
    }

    pub fn volume(&self) -> f32 {
        self.synth.volume()
    }

    /// Set the master volume. If it changed, every cached clip is stale and is
    /// removed and returned.
    pub fn set_volume(&mut self, volume: f32) -> Vec<V> {
        if self.synth.set_volume(volume) {
            let stale = self.clips.clear();
            log::debug!("Volume now {}, dropped {} clips", self.synth.volume(), stale.len());
            stale
        } else {
            Vec::new()
        }
    }

    /// The value for a clip, rendering and converting it with `make` on a miss.
    pub fn get_or_try_insert_with(
        &mut self,
        instrument: Instrument,
        tone: Tone,
        octave: u8,
        duration: f32,
        make: impl FnOnce(&[u8]) -> Result<V, EngineError>,
    ) -> Result<&V, EngineError> {
        let key = SoundKey::new(instrument, tone, octave, duration);
        let synth = &self.synth;
        self.clips.get_or_try_insert_with(key, || {
            let wav = synth.render_wav(instrument, tone, octave, duration)?;
            make(&wav)
        })
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::Letter;
    use std::rc::Rc;

    fn c4() -> Tone {
        Tone::natural(Letter::C)
    }

    #[test]
    fn clip_length_matches_duration() {
        let synth = ToneSynth::new(8000);
        let samples = synth.render(Instrument::Piano, c4(), 4, 4.0);
        assert_eq!(samples.len(), 32_000);
    }

    #[test]
    fn clip_is_audible_and_fades_out() {
        let synth = ToneSynth::new(8000);
        let samples = synth.render(Instrument::Piano, c4(), 4, 1.0);
        let head = samples[..800].iter().map(|s| s.unsigned_abs()).max().unwrap();
        let tail = samples[7200..].iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(head > 1000, "head peak too quiet: {}", head);
        assert!(tail < head / 4, "tail {} not quieter than head {}", tail, head);
    }

    #[test]
    fn zero_volume_renders_silence() {
        let mut synth = ToneSynth::new(8000);
        synth.set_volume(0.0);
        let samples = synth.render(Instrument::Organ, c4(), 3, 0.5);
        assert!(samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn volume_is_clamped() {
        let mut synth = ToneSynth::default();
        synth.set_volume(1.7);
        assert_eq!(synth.volume(), 1.0);
        synth.set_volume(-0.2);
        assert_eq!(synth.volume(), 0.0);
        synth.set_volume(f32::NAN);
        assert_eq!(synth.volume(), 0.0);
    }

    #[test]
    fn set_volume_reports_change() {
        let mut synth = ToneSynth::default();
        assert!(!synth.set_volume(1.0));
        assert!(synth.set_volume(0.5));
        assert!(!synth.set_volume(0.5));
    }

    #[test]
    fn half_volume_halves_peak() {
        let mut synth = ToneSynth::new(8000);
        let full = synth.render(Instrument::Piano, c4(), 4, 0.25);
        synth.set_volume(0.5);
        let half = synth.render(Instrument::Piano, c4(), 4, 0.25);
        let peak = |s: &[i16]| s.iter().map(|x| x.unsigned_abs()).max().unwrap() as f32;
        let ratio = peak(&half) / peak(&full);
        assert!((ratio - 0.5).abs() < 0.01, "ratio was {}", ratio);
    }

    #[test]
    fn wav_header_describes_clip() {
        let synth = ToneSynth::new(22050);
        let bytes = synth.render_wav(Instrument::Piano, c4(), 4, 0.1).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 2205);
    }

    #[test]
    fn empty_clip_still_encodes() {
        let bytes = encode_wav(&[], 44100).unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.len(), 0);
    }

    #[test]
    fn sound_key_rounds_duration_to_milliseconds() {
        let key = SoundKey::new(Instrument::Piano, c4(), 4, 4.0);
        assert_eq!(key.duration_ms, 4000);
        assert_eq!(SoundKey::new(Instrument::Piano, c4(), 4, 0.0004).duration_ms, 0);
    }

    #[test]
    fn cache_renders_each_key_once() {
        let mut cache: SoundCache<u32> = SoundCache::new();
        let key = SoundKey::new(Instrument::Piano, c4(), 4, 4.0);
        let mut calls = 0;
        for _ in 0..3 {
            let v = cache
                .get_or_try_insert_with::<()>(key, || {
                    calls += 1;
                    Ok(7)
                })
                .unwrap();
            assert_eq!(*v, 7);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_failure_inserts_nothing() {
        let mut cache: SoundCache<u32> = SoundCache::new();
        let key = SoundKey::new(Instrument::Edm, c4(), 2, 1.0);
        let result = cache.get_or_try_insert_with(key, || Err("boom"));
        assert_eq!(result, Err("boom"));
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_clear_returns_values() {
        let mut cache: SoundCache<String> = SoundCache::new();
        for octave in 1..=3 {
            let key = SoundKey::new(Instrument::Piano, c4(), octave, 4.0);
            cache
                .get_or_try_insert_with::<()>(key, || Ok(format!("blob:{octave}")))
                .unwrap();
        }
        let mut values = cache.clear();
        values.sort();
        assert_eq!(values, vec!["blob:1", "blob:2", "blob:3"]);
        assert!(cache.is_empty());
    }

    fn fill(store: &mut ClipStore<Rc<String>>) {
        for octave in 1..=3 {
            store
                .get_or_try_insert_with(Instrument::Piano, c4(), octave, 0.01, |wav| {
                    Ok(Rc::new(format!("blob:{octave}:{}", wav.len())))
                })
                .unwrap();
        }
    }

    #[test]
    fn volume_change_empties_clip_store() {
        let mut store = ClipStore::new(8000);
        fill(&mut store);
        assert_eq!(store.len(), 3);

        assert_eq!(store.set_volume(0.5).len(), 3);
        assert!(store.is_empty());

        fill(&mut store);
        assert!(store.set_volume(0.5).is_empty(), "same volume must keep clips");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn clip_store_renders_at_current_volume() {
        let mut store: ClipStore<Vec<u8>> = ClipStore::new(8000);
        store.set_volume(0.0);
        let wav = store
            .get_or_try_insert_with(Instrument::Organ, c4(), 4, 0.1, |wav| Ok(wav.to_vec()))
            .unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(wav.clone())).unwrap();
        assert!(reader.samples::<i16>().all(|s| s.unwrap() == 0));
    }

    #[test]
    fn stale_clips_outlive_the_store_while_held() {
        let mut store = ClipStore::new(8000);
        fill(&mut store);
        let playing = Rc::clone(
            store
                .get_or_try_insert_with(Instrument::Piano, c4(), 2, 0.01, |_| unreachable!())
                .unwrap(),
        );
        assert_eq!(Rc::strong_count(&playing), 2);

        let stale = store.set_volume(0.25);
        drop(stale);
        assert_eq!(Rc::strong_count(&playing), 1);
        assert!(playing.starts_with("blob:2:"));
    }

    #[test]
    fn clip_store_failure_caches_nothing() {
        let mut store: ClipStore<String> = ClipStore::new(8000);
        let result = store.get_or_try_insert_with(Instrument::Edm, c4(), 4, 0.1, |_| {
            Err(EngineError::Host("blob refused".into()))
        });
        assert!(result.is_err());
        assert!(store.is_empty());
    }
}
