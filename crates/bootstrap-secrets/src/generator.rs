//! Secret material generation.
//!
//! All randomness comes from the operating system CSPRNG through
//! [`OsEntropy`]. When it fails the caller gets
//! [`BootstrapError::GenerationUnavailable`]; there is no fallback.

use bootstrap_types::{BootstrapError, EntropySource, Result, SecretKind};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

/// Characters a generated password is drawn from.
///
/// 65 symbols, so each character carries log2(65) ≈ 6.02 bits.
pub const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_.";

/// Bytes at or above this value are rejected so every symbol is equally likely.
const ACCEPT_BELOW: usize = 256 / PASSWORD_ALPHABET.len() * PASSWORD_ALPHABET.len();

/// Bytes requested from the entropy source per round.
const POOL_SIZE: usize = 64;

/// Consecutive rounds without a usable byte before the source is declared broken.
const MAX_STALLED_ROUNDS: usize = 8;

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| BootstrapError::GenerationUnavailable(e.to_string()))
    }
}

fn check_length(length: usize) -> Result<()> {
    if length == 0 {
        return Err(BootstrapError::Validation(
            "Secret length must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Generate a password of exactly `length` characters from [`PASSWORD_ALPHABET`].
pub fn password_from(entropy: &mut dyn EntropySource, length: usize) -> Result<String> {
    check_length(length)?;

    let mut password = String::with_capacity(length);
    let mut pool = Zeroizing::new([0u8; POOL_SIZE]);
    let mut stalled = 0;

    while password.len() < length {
        entropy.fill(&mut pool[..])?;

        let before = password.len();
        for &byte in pool.iter() {
            let byte = byte as usize;
            if byte < ACCEPT_BELOW {
                password.push(PASSWORD_ALPHABET[byte % PASSWORD_ALPHABET.len()] as char);
                if password.len() == length {
                    break;
                }
            }
        }

        if password.len() == before {
            stalled += 1;
            if stalled >= MAX_STALLED_ROUNDS {
                return Err(BootstrapError::GenerationUnavailable(
                    "entropy source produced no usable bytes".to_string(),
                ));
            }
        } else {
            stalled = 0;
        }
    }

    Ok(password)
}

/// Generate `byte_length` random bytes encoded as lowercase hex.
pub fn hex_key_from(entropy: &mut dyn EntropySource, byte_length: usize) -> Result<String> {
    check_length(byte_length)?;

    let mut bytes = Zeroizing::new(vec![0u8; byte_length]);
    entropy.fill(&mut bytes)?;
    Ok(hex::encode(&bytes[..]))
}

/// Generate a value of the given kind.
pub fn generate_from(entropy: &mut dyn EntropySource, kind: SecretKind, length: usize) -> Result<String> {
    match kind {
        SecretKind::PasswordAscii => password_from(entropy, length),
        SecretKind::HexKey => hex_key_from(entropy, length),
    }
}

/// Generate a password from the OS CSPRNG.
pub fn generate_password(length: usize) -> Result<String> {
    password_from(&mut OsEntropy, length)
}

/// Generate a hex key of `byte_length` bytes from the OS CSPRNG.
pub fn generate_hex_key(byte_length: usize) -> Result<String> {
    hex_key_from(&mut OsEntropy, byte_length)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Entropy source that always fails, like a system without a CSPRNG.
    pub struct NoEntropy;

    impl EntropySource for NoEntropy {
        fn fill(&mut self, _buf: &mut [u8]) -> Result<()> {
            Err(BootstrapError::GenerationUnavailable("getrandom: unsupported".to_string()))
        }
    }

    /// Deterministic byte counter.
    pub struct Counter(pub u8);

    impl EntropySource for Counter {
        fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
            for b in buf.iter_mut() {
                *b = self.0;
                self.0 = self.0.wrapping_add(1);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Counter, NoEntropy};
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_size() {
        assert_eq!(PASSWORD_ALPHABET.len(), 65);
        assert_eq!(ACCEPT_BELOW, 195);
        let unique: HashSet<u8> = PASSWORD_ALPHABET.iter().copied().collect();
        assert_eq!(unique.len(), PASSWORD_ALPHABET.len());
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(matches!(generate_password(0), Err(BootstrapError::Validation(_))));
        assert!(matches!(generate_hex_key(0), Err(BootstrapError::Validation(_))));
    }

    #[test]
    fn test_no_entropy_is_generation_unavailable() {
        assert!(matches!(
            password_from(&mut NoEntropy, 16),
            Err(BootstrapError::GenerationUnavailable(_))
        ));
        assert!(matches!(
            hex_key_from(&mut NoEntropy, 16),
            Err(BootstrapError::GenerationUnavailable(_))
        ));
    }

    #[test]
    fn test_stuck_source_does_not_loop_forever() {
        struct Stuck;
        impl EntropySource for Stuck {
            fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
                buf.fill(0xff);
                Ok(())
            }
        }
        assert!(matches!(
            password_from(&mut Stuck, 8),
            Err(BootstrapError::GenerationUnavailable(_))
        ));
    }

    #[test]
    fn test_rejection_sampling_skips_high_bytes() {
        // Bytes 0..=255 in order: 195 accepted, then 61 rejected.
        let password = password_from(&mut Counter(0), 200).unwrap();
        assert_eq!(password.len(), 200);
        assert_eq!(&password[..3], "ABC");
        // Byte 195 and onwards are skipped; the counter wraps to 0 => 'A' again.
        assert_eq!(password.as_bytes()[195], b'A');
    }

    #[test]
    fn test_hex_key_from_counter() {
        assert_eq!(hex_key_from(&mut Counter(0xfe), 3).unwrap(), "feff00");
    }

    #[test]
    fn test_uniqueness_over_many_trials() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_password(24).unwrap()));
            assert!(seen.insert(generate_hex_key(16).unwrap()));
        }
    }

    #[test]
    fn test_every_symbol_reachable() {
        let password = generate_password(20_000).unwrap();
        let used: HashSet<u8> = password.bytes().collect();
        assert_eq!(used.len(), PASSWORD_ALPHABET.len());
    }

    proptest! {
        #[test]
        fn password_has_exact_length_and_alphabet(length in 1usize..300) {
            let password = generate_password(length).unwrap();
            prop_assert_eq!(password.chars().count(), length);
            prop_assert!(password.bytes().all(|b| PASSWORD_ALPHABET.contains(&b)));
        }

        #[test]
        fn hex_key_is_lowercase_hex_of_double_length(byte_length in 1usize..256) {
            let key = generate_hex_key(byte_length).unwrap();
            prop_assert_eq!(key.len(), 2 * byte_length);
            prop_assert!(key.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        }
    }
}
