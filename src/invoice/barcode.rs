//! Code 39 barcode encoding for invoice order identifiers.
//!
//! Each symbol is nine elements (five bars, four spaces), three of them
//! wide. Symbols are separated by a narrow space and framed by the `*`
//! start/stop character. Output is a run-length module sequence the PDF
//! renderer turns into rectangles.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BarcodeError {
    #[error("character '{0}' cannot be encoded as Code 39")]
    UnsupportedChar(char),
}

/// One printed element: a bar or a space, one or three units wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Module {
    pub is_bar: bool,
    pub width: u8,
}

const NARROW: u8 = 1;
const WIDE: u8 = 3;

// Nine-element patterns, 'w' marking the wide elements. Elements alternate
// bar, space, bar, ... starting with a bar.
const SYMBOLS: &[(char, &str)] = &[
    ('0', "nnnwwnwnn"),
    ('1', "wnnwnnnnw"),
    ('2', "nnwwnnnnw"),
    ('3', "wnwwnnnnn"),
    ('4', "nnnwwnnnw"),
    ('5', "wnnwwnnnn"),
    ('6', "nnwwwnnnn"),
    ('7', "nnnwnnwnw"),
    ('8', "wnnwnnwnn"),
    ('9', "nnwwnnwnn"),
    ('A', "wnnnnwnnw"),
    ('B', "nnwnnwnnw"),
    ('C', "wnwnnwnnn"),
    ('D', "nnnnwwnnw"),
    ('E', "wnnnwwnnn"),
    ('F', "nnwnwwnnn"),
    ('G', "nnnnnwwnw"),
    ('H', "wnnnnwwnn"),
    ('I', "nnwnnwwnn"),
    ('J', "nnnnwwwnn"),
    ('K', "wnnnnnnww"),
    ('L', "nnwnnnnww"),
    ('M', "wnwnnnnwn"),
    ('N', "nnnnwnnww"),
    ('O', "wnnnwnnwn"),
    ('P', "nnwnwnnwn"),
    ('Q', "nnnnnnwww"),
    ('R', "wnnnnnwwn"),
    ('S', "nnwnnnwwn"),
    ('T', "nnnnwnwwn"),
    ('U', "wwnnnnnnw"),
    ('V', "nwwnnnnnw"),
    ('W', "wwwnnnnnn"),
    ('X', "nwnnwnnnw"),
    ('Y', "wwnnwnnnn"),
    ('Z', "nwwnwnnnn"),
    ('-', "nwnnnnwnw"),
    ('.', "wwnnnnwnn"),
    (' ', "nwwnnnwnn"),
    ('$', "nwnwnwnnn"),
    ('/', "nwnwnnnwn"),
    ('+', "nwnnnwnwn"),
    ('%', "nnnwnwnwn"),
    ('*', "nwnnwnwnn"),
];

fn pattern_for(c: char) -> Option<&'static str> {
    SYMBOLS.iter().find(|(s, _)| *s == c).map(|(_, p)| *p)
}

fn push_symbol(modules: &mut Vec<Module>, pattern: &str) {
    for (i, e) in pattern.chars().enumerate() {
        modules.push(Module {
            is_bar: i % 2 == 0,
            width: if e == 'w' { WIDE } else { NARROW },
        });
    }
}

/// Encode `text` (uppercased) including the `*` start/stop frames.
pub fn encode(text: &str) -> Result<Vec<Module>, BarcodeError> {
    let mut modules = Vec::new();

    push_symbol(&mut modules, pattern_for('*').unwrap());

    for c in text.to_ascii_uppercase().chars() {
        let pattern = pattern_for(c).ok_or(BarcodeError::UnsupportedChar(c))?;
        modules.push(Module {
            is_bar: false,
            width: NARROW,
        });
        push_symbol(&mut modules, pattern);
    }

    modules.push(Module {
        is_bar: false,
        width: NARROW,
    });
    push_symbol(&mut modules, pattern_for('*').unwrap());

    Ok(modules)
}

/// Total width of a module sequence in narrow-bar units.
pub fn total_units(modules: &[Module]) -> u32 {
    modules.iter().map(|m| u32::from(m.width)).sum()
}
