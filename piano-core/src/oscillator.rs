use core::f32::consts::PI;

/// Waveform shapes used by the instrument profiles.
///
/// All shapes are phase-modulated sines, so every sample stays in [-1, 1]
/// without normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Piano,
    Organ,
    Acoustic,
    Edm,
}

/// A phase-accumulator oscillator producing one of the instrument waveforms.
pub struct Oscillator {
    phase: f32,
    phase_delta: f32,
    sample_rate: f32,
    frequency: f32,
    waveform: Waveform,
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        let mut osc = Self {
            phase: 0.0,
            phase_delta: 0.0,
            sample_rate: 44100.0,
            frequency: 440.0,
            waveform,
        };
        osc.update_phase_delta();
        osc
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_phase_delta();
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.update_phase_delta();
    }

    /// Generate the next sample and advance the phase.
    pub fn tick(&mut self) -> f32 {
        let sample = match self.waveform {
            Waveform::Piano => generate_piano(self.phase),
            Waveform::Organ => generate_organ(self.phase),
            Waveform::Acoustic => generate_acoustic(self.phase),
            Waveform::Edm => generate_edm(self.phase),
        };

        self.phase += self.phase_delta;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        sample
    }

    fn update_phase_delta(&mut self) {
        self.phase_delta = self.frequency / self.sample_rate;
    }
}

// --- Waveform generators ---

/// Fundamental with a phase offset in radians.
fn base(phase: f32, offset: f32) -> f32 {
    (phase * 2.0 * PI + offset).sin()
}

/// Second harmonic carrier modulated by the fundamental.
fn carrier(phase: f32, modulation: f32) -> f32 {
    (phase * 4.0 * PI + modulation).sin()
}

/// Squared fundamental in the modulator gives the bright, hammer-like onset.
fn generate_piano(phase: f32) -> f32 {
    carrier(
        phase,
        base(phase, 0.0).powi(2) + 0.75 * base(phase, 0.25) + 0.1 * base(phase, 0.5),
    )
}

fn generate_organ(phase: f32) -> f32 {
    carrier(
        phase,
        base(phase, 0.0) + 0.5 * base(phase, 0.25) + 0.25 * base(phase, 0.5),
    )
}

fn generate_acoustic(phase: f32) -> f32 {
    base(phase, 0.5 * base(phase, 0.0) + 0.25 * carrier(phase, 0.0))
}

fn generate_edm(phase: f32) -> f32 {
    carrier(phase, 2.0 * base(phase, 0.0) * base(phase * 0.5, 0.0))
}
