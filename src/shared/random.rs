use getrandom::getrandom;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_SPACE: u32 = 36 * 36 * 36 * 36;

pub fn base36_encode_u64(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

pub fn base36_encode_fixed_u32(mut value: u32, width: usize) -> String {
    let mut digits = vec![b'0'; width];
    let mut index = width;
    while value > 0 && index > 0 {
        index -= 1;
        digits[index] = BASE36_ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8(digits).unwrap_or_default()
}

fn compact_suffix() -> Result<String, String> {
    let mut bytes = [0_u8; 4];
    getrandom(&mut bytes).map_err(|err| format!("failed to gather randomness: {err}"))?;
    let sample = u32::from_le_bytes(bytes) % SUFFIX_SPACE;
    Ok(base36_encode_fixed_u32(sample, 4))
}

/// Compact wizard session id, unique enough to correlate analytics events.
pub fn session_id(now: i64) -> Result<String, String> {
    let timestamp =
        u64::try_from(now).map_err(|_| "session id requires a non-negative timestamp".to_string())?;
    let ts = base36_encode_u64(timestamp);
    let suffix = compact_suffix()?;
    Ok(format!("wiz-{ts}-{suffix}"))
}

/// Name proposed for a duplicated connector.
pub fn duplicate_name(base: &str) -> Result<String, String> {
    let suffix = compact_suffix()?;
    Ok(format!("{base}-copy-{suffix}"))
}
