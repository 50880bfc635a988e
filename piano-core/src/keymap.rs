use crate::error::BindingError;
use crate::tone::Tone;

/// Characters produced by `String.fromCharCode(event.keyCode)` for the keys of
/// a US layout, in binding order: digit row, top row, home row, bottom row.
pub const KEYBOARD_SYMBOLS: &str = "1234567890½»QWERTYUIOPÝÛASDFGHJKLºÞÜÀZXCVBNM¼¾¿";

pub const PEDAL_KEY_CODE: u32 = 32;
pub const SHARP_KEY_CODE: u32 = 16;

/// The (tone, octave) a physical key plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub tone: Tone,
    pub octave: u8,
}

/// Physical symbol → tone table, filled in creation order until every
/// available symbol is taken.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    symbols: Vec<char>,
    bound: Vec<(char, Binding)>,
}

impl KeyBindings {
    pub fn new(symbols: &str) -> Self {
        Self {
            symbols: symbols.chars().collect(),
            bound: Vec::new(),
        }
    }

    /// Assign the next free symbol to (tone, octave) and return it.
    pub fn bind(&mut self, tone: Tone, octave: u8) -> Result<char, BindingError> {
        let symbol = *self
            .symbols
            .get(self.bound.len())
            .ok_or(BindingError::CapacityExceeded {
                capacity: self.capacity(),
            })?;
        self.bound.push((symbol, Binding { tone, octave }));
        Ok(symbol)
    }

    pub fn lookup(&self, symbol: char) -> Option<Binding> {
        self.bound
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|&(_, binding)| binding)
    }

    pub fn symbol_for(&self, tone: Tone, octave: u8) -> Option<char> {
        self.bound
            .iter()
            .find(|(_, b)| b.tone == tone && b.octave == octave)
            .map(|&(s, _)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, Binding)> + '_ {
        self.bound.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.symbols.len()
    }
}

/// Map a browser `keyCode` to the upper-cased symbol used by the table.
pub fn symbol_for_key_code(code: u32) -> Option<char> {
    char::from_u32(code).and_then(|c| c.to_uppercase().next())
}
