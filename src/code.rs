//! Access-code generation for Gatepass.
//!
//! Codes carry the `WINT365_` brand prefix followed by 30 characters drawn
//! uniformly from the 36-symbol `[A-Z0-9]` alphabet. At 36^30 the space is
//! large enough that collisions are practically impossible, but the service
//! layer still checks the store and regenerates before persisting.

use rand::Rng;

/// Brand prefix shared by every issued code.
pub const CODE_PREFIX: &str = "WINT365_";

/// Number of random characters after the prefix.
pub const CODE_RANDOM_LEN: usize = 30;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a new access code: `WINT365_` + 30 random `[A-Z0-9]` characters.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    let random_part: String = (0..CODE_RANDOM_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", CODE_PREFIX, random_part)
}

/// Validate that a string has the shape of an issued code.
///
/// This is a cheap check to reject garbage before hitting the store.
pub fn is_valid_code_format(s: &str) -> bool {
    let Some(random_part) = s.strip_prefix(CODE_PREFIX) else {
        return false;
    };

    random_part.len() == CODE_RANDOM_LEN
        && random_part
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
