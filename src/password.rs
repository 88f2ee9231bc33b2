//! Random password generation.

use rand::Rng;
use rand::seq::SliceRandom;

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const NUMBERS: &str = "0123456789";
pub const SPECIAL: &str = "!@#$%^&*()-_=+[]{}|;:,.<>?";

/// Which character classes to draw from, and how many characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordOptions {
    pub length: usize,
    pub lowercase: bool,
    pub uppercase: bool,
    pub numbers: bool,
    pub special: bool,
}

impl PasswordOptions {
    /// All character classes enabled.
    pub fn with_length(length: usize) -> Self {
        Self {
            length,
            lowercase: true,
            uppercase: true,
            numbers: true,
            special: true,
        }
    }

    fn active_pools(&self) -> Vec<&'static [u8]> {
        [
            (self.lowercase, LOWERCASE),
            (self.uppercase, UPPERCASE),
            (self.numbers, NUMBERS),
            (self.special, SPECIAL),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, pool)| pool.as_bytes())
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("length must be greater than zero")]
    ZeroLength,
    #[error("select at least one character type")]
    NoCharacterType,
}

/// Generates a password from `options`.
///
/// When `length` allows it, every enabled class contributes at least one
/// character; shorter passwords use `length` distinct classes picked at random.
pub fn generate<R: Rng + ?Sized>(
    options: &PasswordOptions,
    rng: &mut R,
) -> Result<String, GenerateError> {
    if options.length == 0 {
        return Err(GenerateError::ZeroLength);
    }

    let pools = options.active_pools();
    if pools.is_empty() {
        return Err(GenerateError::NoCharacterType);
    }

    let mut chars: Vec<u8> = Vec::with_capacity(options.length);

    // one guaranteed character per selected pool
    let selected: Vec<&[u8]> = if options.length < pools.len() {
        pools
            .choose_multiple(rng, options.length)
            .copied()
            .collect()
    } else {
        pools.clone()
    };
    for pool in selected {
        if let Some(&c) = pool.choose(rng) {
            chars.push(c);
        }
    }

    let all: Vec<u8> = pools.concat();
    while chars.len() < options.length {
        if let Some(&c) = all.choose(rng) {
            chars.push(c);
        }
    }

    chars.shuffle(rng);

    // pools are ASCII
    Ok(chars.into_iter().map(char::from).collect())
}
