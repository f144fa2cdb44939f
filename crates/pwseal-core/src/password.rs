use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::rng::{RngError, SecureRandom};

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

pub const DEFAULT_LENGTH: NonZeroUsize = match NonZeroUsize::new(12) {
    Some(length) => length,
    None => NonZeroUsize::MIN,
};

/// Character-class constraints for one generation request.
///
/// Lowercase letters are always part of the alphabet, so the effective
/// alphabet is never empty. A non-zero length is required at the type level;
/// the generator itself has no failure path besides entropy exhaustion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub length: NonZeroUsize,
    pub include_upper: bool,
    pub include_digits: bool,
    pub include_symbols: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            include_upper: true,
            include_digits: true,
            include_symbols: true,
        }
    }
}

impl GeneratorConfig {
    fn alphabet(&self) -> String {
        let mut alphabet = String::from(LOWERCASE);
        if self.include_upper {
            alphabet.push_str(UPPERCASE);
        }
        if self.include_digits {
            alphabet.push_str(DIGITS);
        }
        if self.include_symbols {
            alphabet.push_str(SYMBOLS);
        }
        alphabet
    }
}

/// Draw a password of `config.length` characters, each sampled independently
/// and uniformly from the configured alphabet.
///
/// Characters may repeat, and no per-class minimum is enforced: a password
/// may by chance contain only lowercase letters even when other classes are
/// enabled.
pub fn generate_password(
    config: GeneratorConfig,
    rng: &mut dyn SecureRandom,
) -> Result<String, RngError> {
    let alphabet = config.alphabet();
    let characters = alphabet.as_bytes();

    let mut output = String::with_capacity(config.length.get());
    for _ in 0..config.length.get() {
        let index = rng.next_index(characters.len())?;
        output.push(char::from(characters[index]));
    }
    Ok(output)
}

/// Score a password 0–4: one point per character class present (lowercase,
/// uppercase, digit, ASCII punctuation), independent of any generator
/// configuration.
#[must_use]
pub fn password_strength(password: &str) -> u8 {
    let mut strength = 0;
    if password.chars().any(|character| character.is_ascii_lowercase()) {
        strength += 1;
    }
    if password.chars().any(|character| character.is_ascii_uppercase()) {
        strength += 1;
    }
    if password.chars().any(|character| character.is_ascii_digit()) {
        strength += 1;
    }
    if password
        .chars()
        .any(|character| character.is_ascii_punctuation())
    {
        strength += 1;
    }
    strength
}
