//! One-time passcode generation.
//!
//! The gateway authenticates payers with a short numeric code. The code is
//! always generated here from the OS entropy source; any caller-supplied
//! value is ignored so weak or reused codes never reach the wire.

use rand::rngs::OsRng;
use rand::Rng;

const MIN_CODE: u16 = 1_000;
const MAX_CODE: u16 = 9_999;

/// Generate a fresh 4-digit passcode, uniform over `[1000, 9999]`.
pub fn generate() -> String {
    OsRng.gen_range(MIN_CODE..=MAX_CODE).to_string()
}
