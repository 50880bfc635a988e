/// Amplitude envelope of a rendered clip.
///
/// A linear attack up to full level, followed by a dampened decay that reaches
/// silence exactly at the end of the clip:
/// `gain = (1 - progress) ^ dampen`, where `progress` runs from 0 to 1 over the
/// samples after the attack.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    attack_samples: usize,
    total_samples: usize,
    dampen: f32,
}

impl Envelope {
    pub fn new(attack_samples: usize, total_samples: usize, dampen: f32) -> Self {
        Self {
            attack_samples: attack_samples.min(total_samples),
            total_samples,
            dampen: dampen.max(0.0),
        }
    }

    /// Build from times in seconds.
    pub fn from_seconds(attack: f32, duration: f32, dampen: f32, sample_rate: f32) -> Self {
        let total = (duration.max(0.0) * sample_rate) as usize;
        let attack = (attack.max(0.0) * sample_rate) as usize;
        Self::new(attack, total, dampen)
    }

    pub fn total_samples(&self) -> usize {
        self.total_samples
    }

    /// Gain in [0, 1] for sample `index`.
    pub fn gain(&self, index: usize) -> f32 {
        if index >= self.total_samples {
            return 0.0;
        }
        if index < self.attack_samples {
            return index as f32 / self.attack_samples as f32;
        }
        let decay_len = (self.total_samples - self.attack_samples) as f32;
        let progress = (index - self.attack_samples) as f32 / decay_len;
        (1.0 - progress).max(0.0).powf(self.dampen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_starts_at_zero_and_rises() {
        let env = Envelope::new(100, 1000, 2.0);
        assert_eq!(env.gain(0), 0.0);
        assert!((env.gain(50) - 0.5).abs() < 1e-6);
        for i in 1..100 {
            assert!(env.gain(i) > env.gain(i - 1), "attack not rising at {}", i);
        }
    }

    #[test]
    fn decay_starts_at_full_level() {
        let env = Envelope::new(100, 1000, 2.0);
        assert!((env.gain(100) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn decay_is_monotonically_decreasing() {
        let env = Envelope::new(10, 2000, 3.5);
        for i in 11..2000 {
            assert!(
                env.gain(i) <= env.gain(i - 1),
                "decay rose at {}: {} -> {}",
                i,
                env.gain(i - 1),
                env.gain(i)
            );
        }
    }

    #[test]
    fn silent_after_clip_end() {
        let env = Envelope::new(10, 100, 1.0);
        assert!(env.gain(99) < 0.02);
        assert_eq!(env.gain(100), 0.0);
        assert_eq!(env.gain(5000), 0.0);
    }

    #[test]
    fn higher_dampen_decays_faster() {
        let soft = Envelope::new(0, 1000, 1.0);
        let hard = Envelope::new(0, 1000, 6.0);
        assert!(hard.gain(300) < soft.gain(300));
    }

    #[test]
    fn attack_longer_than_clip_is_clamped() {
        let env = Envelope::new(500, 100, 1.0);
        assert!(env.gain(99) < 1.0);
        assert_eq!(env.gain(100), 0.0);
    }

    #[test]
    fn from_seconds_converts_with_sample_rate() {
        let env = Envelope::from_seconds(0.002, 4.0, 1.0, 44100.0);
        assert_eq!(env.total_samples(), 176_400);
    }

    #[test]
    fn zero_duration_is_empty() {
        let env = Envelope::from_seconds(0.002, 0.0, 1.0, 44100.0);
        assert_eq!(env.total_samples(), 0);
        assert_eq!(env.gain(0), 0.0);
    }
}
