// File: gzsurvey-core/src/services/reward_code.rs

use crate::crypto::random_bytes;
use crate::Error;

pub const REWARD_CODE_PREFIX: &str = "GZ";
pub const REWARD_CODE_LEN: usize = 14;
const RANDOM_BYTES: usize = 6;

/// `GZ` followed by 12 uppercase hex digits, from 48 bits of OS randomness.
pub fn generate_reward_code() -> Result<String, Error> {
    let bytes: [u8; RANDOM_BYTES] = random_bytes()?;
    let mut code = String::with_capacity(REWARD_CODE_LEN);
    code.push_str(REWARD_CODE_PREFIX);
    for b in bytes {
        code.push_str(&format!("{:02X}", b));
    }
    Ok(code)
}

/// Shape check for a code that has already been uppercased.
///
/// Looks at every byte regardless of earlier failures.
pub fn is_well_formed(code: &str) -> bool {
    let bytes = code.as_bytes();
    let mut ok = bytes.len() == REWARD_CODE_LEN;
    for (i, b) in bytes.iter().enumerate() {
        let valid = match i {
            0 => *b == b'G',
            1 => *b == b'Z',
            _ => b.is_ascii_digit() || (b'A'..=b'F').contains(b),
        };
        ok &= valid;
    }
    ok
}
