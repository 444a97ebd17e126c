//! Suggested device codes (`GATE-7QX2`).
//!
//! Codes are only suggestions: the authority enforces uniqueness and may
//! reject any value, in which case the operator asks for a new one.

use gatehouse_common::DeviceType;
use rand::Rng;

const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Maximum length of the type-derived prefix.
pub const PREFIX_LEN: usize = 4;

/// Number of random base-36 characters after the dash.
pub const SUFFIX_LEN: usize = 4;

/// Uppercased first four letters of the type name (`PARK` for parking).
pub fn code_prefix(device_type: DeviceType) -> String {
    device_type
        .as_str()
        .chars()
        .take(PREFIX_LEN)
        .collect::<String>()
        .to_uppercase()
}

/// Suggests a code for a new device of `device_type`.
pub fn generate_device_code(device_type: DeviceType) -> String {
    generate_device_code_with(device_type, &mut rand::thread_rng())
}

/// Same as [`generate_device_code`] with a caller-supplied RNG.
pub fn generate_device_code_with<R: Rng + ?Sized>(device_type: DeviceType, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", code_prefix(device_type), suffix)
}

/// Whether `code` has the suggested shape: 1-4 letters, a dash, 4 of `A-Z0-9`.
///
/// Purely informational; the authority accepts other shapes too.
pub fn is_suggested_shape(code: &str) -> bool {
    let Some((prefix, suffix)) = code.split_once('-') else {
        return false;
    };
    (1..=PREFIX_LEN).contains(&prefix.len())
        && prefix.bytes().all(|b| b.is_ascii_uppercase())
        && suffix.len() == SUFFIX_LEN
        && suffix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
