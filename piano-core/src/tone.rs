use std::fmt;
use std::str::FromStr;

use crate::error::ToneError;

pub const SHARP: char = '#';
pub const FLAT: char = '♭';

/// Natural pitch letters in scale order, starting at C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub const SCALE: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    pub fn from_char(ch: char) -> Option<Self> {
        match ch.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    /// Semitones above C.
    pub fn semitone(self) -> u8 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// E and B have no black key above them.
    pub fn has_sharp(self) -> bool {
        !matches!(self, Letter::E | Letter::B)
    }

    /// The letter one step below in the natural scale. C wraps to B.
    pub fn previous(self) -> Self {
        let idx = Self::SCALE.iter().position(|&l| l == self).unwrap_or(0);
        Self::SCALE[(idx + Self::SCALE.len() - 1) % Self::SCALE.len()]
    }
}

/// A pitch letter, optionally sharped. Flats never survive parsing: they are
/// rewritten to the sharp of the letter below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tone {
    pub letter: Letter,
    pub sharp: bool,
}

impl Tone {
    pub fn natural(letter: Letter) -> Self {
        Self {
            letter,
            sharp: false,
        }
    }

    pub fn sharp(letter: Letter) -> Self {
        Self {
            letter,
            sharp: true,
        }
    }

    /// Same letter with the sharp marker applied.
    pub fn sharpened(self) -> Self {
        Self::sharp(self.letter)
    }

    pub fn is_natural(&self) -> bool {
        !self.sharp
    }

    pub fn semitone(&self) -> u8 {
        self.letter.semitone() + self.sharp as u8
    }

    /// MIDI note number, C4 = 60.
    pub fn midi_note(&self, octave: u8) -> i32 {
        (octave as i32 + 1) * 12 + self.semitone() as i32
    }

    pub fn frequency(&self, octave: u8) -> f32 {
        midi_note_to_freq(self.midi_note(octave))
    }
}

/// Convert a MIDI note number to frequency in Hz.
pub fn midi_note_to_freq(note: i32) -> f32 {
    440.0 * 2.0f32.powf((note as f32 - 69.0) / 12.0)
}

impl FromStr for Tone {
    type Err = ToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let first = chars.next().ok_or(ToneError::Empty)?;
        let letter = Letter::from_char(first).ok_or(ToneError::InvalidLetter { ch: first })?;

        let tone = match chars.next() {
            None => Tone::natural(letter),
            Some(SHARP) => Tone::sharp(letter),
            Some(FLAT) => Tone::sharp(letter.previous()),
            Some(ch) => return Err(ToneError::InvalidAccidental { ch }),
        };

        let rest: String = chars.collect();
        if !rest.is_empty() {
            return Err(ToneError::TrailingInput { text: rest });
        }
        Ok(tone)
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        if self.sharp {
            write!(f, "{SHARP}")?;
        }
        Ok(())
    }
}
