//! Random password generation

use log::debug;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 128;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>?/";

/// Characters easily confused when read or retyped
const AMBIGUOUS: &str = "Il1O0o";

fn default_length() -> usize {
    16
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordOptions {
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_true")]
    pub uppercase: bool,
    #[serde(default = "default_true")]
    pub digits: bool,
    #[serde(default = "default_true")]
    pub symbols: bool,
    #[serde(default)]
    pub exclude_ambiguous: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: default_length(),
            lowercase: true,
            uppercase: true,
            digits: true,
            symbols: true,
            exclude_ambiguous: false,
        }
    }
}

impl PasswordOptions {
    /// Character classes selected, ambiguous characters already removed
    fn classes(&self) -> Vec<Vec<char>> {
        [
            (self.lowercase, LOWERCASE),
            (self.uppercase, UPPERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ]
        .iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, set)| {
            set.chars()
                .filter(|c| !(self.exclude_ambiguous && AMBIGUOUS.contains(*c)))
                .collect()
        })
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPassword {
    pub password: String,
    /// length * log2(pool size)
    pub entropy_bits: f64,
}

/// Generate a password from the thread-local random source
pub fn generate_password(options: &PasswordOptions) -> CalcResult<GeneratedPassword> {
    generate_password_with(options, &mut thread_rng())
}

/// Generate a password from a caller-supplied random source
///
/// Every selected class contributes at least one character; the remaining
/// positions draw from the union of all classes and the result is shuffled.
pub fn generate_password_with<R: Rng + ?Sized>(
    options: &PasswordOptions,
    rng: &mut R,
) -> CalcResult<GeneratedPassword> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&options.length) {
        return Err(CalcError::invalid_input(
            "length",
            options.length,
            format!("must be between {} and {}", MIN_LENGTH, MAX_LENGTH),
        ));
    }

    let classes = options.classes();
    if classes.is_empty() {
        return Err(CalcError::invalid_input(
            "character_classes",
            "none",
            "select at least one character class",
        ));
    }

    let pool: Vec<char> = classes.iter().flatten().copied().collect();
    let mut chars: Vec<char> = Vec::with_capacity(options.length);

    for class in &classes {
        if let Some(&c) = class.choose(rng) {
            chars.push(c);
        }
    }
    while chars.len() < options.length {
        if let Some(&c) = pool.choose(rng) {
            chars.push(c);
        }
    }
    chars.shuffle(rng);

    let entropy_bits = options.length as f64 * (pool.len() as f64).log2();
    debug!(
        "generated {}-character password from a pool of {} ({:.1} bits)",
        options.length,
        pool.len(),
        entropy_bits
    );

    Ok(GeneratedPassword {
        password: chars.into_iter().collect(),
        entropy_bits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_default_options_cover_every_class() {
        let mut rng = seeded();
        for _ in 0..50 {
            let generated = generate_password_with(&PasswordOptions::default(), &mut rng).unwrap();
            let password = &generated.password;

            assert_eq!(password.chars().count(), 16);
            assert!(password.chars().any(|c| c.is_ascii_lowercase()));
            assert!(password.chars().any(|c| c.is_ascii_uppercase()));
            assert!(password.chars().any(|c| c.is_ascii_digit()));
            assert!(password.chars().any(|c| SYMBOLS.contains(c)));
        }
    }

    #[test]
    fn test_single_class() {
        let options = PasswordOptions {
            length: 12,
            lowercase: false,
            uppercase: false,
            symbols: false,
            ..PasswordOptions::default()
        };
        let generated = generate_password_with(&options, &mut seeded()).unwrap();

        assert!(generated.password.chars().all(|c| c.is_ascii_digit()));
        assert_abs_diff_eq!(generated.entropy_bits, 12.0 * 10f64.log2(), epsilon = 1e-12);
    }

    #[test]
    fn test_exclude_ambiguous() {
        let options = PasswordOptions {
            length: MAX_LENGTH,
            symbols: false,
            exclude_ambiguous: true,
            ..PasswordOptions::default()
        };
        let mut rng = seeded();
        for _ in 0..20 {
            let generated = generate_password_with(&options, &mut rng).unwrap();
            assert!(!generated.password.chars().any(|c| AMBIGUOUS.contains(c)));
        }
        // 26 + 26 + 10 minus the six ambiguous characters
        let generated = generate_password_with(&options, &mut rng).unwrap();
        assert_abs_diff_eq!(generated.entropy_bits, 128.0 * 56f64.log2(), epsilon = 1e-9);
    }

    #[test]
    fn test_minimum_length_with_all_classes() {
        let options = PasswordOptions {
            length: MIN_LENGTH,
            ..PasswordOptions::default()
        };
        let generated = generate_password_with(&options, &mut seeded()).unwrap();
        assert_eq!(generated.password.len(), 4);
        assert!(generated.password.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_invalid_options() {
        let too_short = PasswordOptions {
            length: 3,
            ..PasswordOptions::default()
        };
        assert!(generate_password(&too_short).is_err());

        let nothing = PasswordOptions {
            lowercase: false,
            uppercase: false,
            digits: false,
            symbols: false,
            ..PasswordOptions::default()
        };
        assert_eq!(generate_password(&nothing).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_serde_defaults() {
        let options: PasswordOptions =
            serde_json::from_str(r#"{"length": 20, "symbols": false}"#).unwrap();
        assert_eq!(options.length, 20);
        assert!(options.lowercase && options.uppercase && options.digits);
        assert!(!options.symbols && !options.exclude_ambiguous);
    }
}
