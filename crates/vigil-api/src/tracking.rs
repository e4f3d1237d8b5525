use anyhow::Result;
use rand::TryRngCore;
use rand::rngs::OsRng;

/// RFC 4648 base32 alphabet.
const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

const CODE_CHARS: usize = 26;

/// Generate a tracking code for an anonymous complaint:
/// 130 bits from the OS CSPRNG, base32-encoded, formatted
/// `CR-<21 chars>-<5 chars>`. The UNIQUE index on the column is the
/// backstop against the negligible collision chance.
pub fn generate_tracking_code() -> Result<String> {
    let mut bytes = [0u8; 17];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| anyhow::anyhow!("OS RNG failure: {}", e))?;

    let chars = base32_chars(&bytes, CODE_CHARS);
    Ok(format!("CR-{}-{}", &chars[..21], &chars[21..]))
}

fn base32_chars(bytes: &[u8], count: usize) -> String {
    let mut out = String::with_capacity(count);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &b in bytes {
        acc = (acc << 8) | b as u32;
        bits += 8;
        while bits >= 5 && out.len() < count {
            bits -= 5;
            out.push(ALPHABET[((acc >> bits) & 0x1f) as usize] as char);
        }
        if out.len() == count {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn code_shape() {
        let code = generate_tracking_code().unwrap();
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "CR");
        assert_eq!(parts[1].len(), 21);
        assert_eq!(parts[2].len(), 5);
        for c in parts[1].chars().chain(parts[2].chars()) {
            assert!(ALPHABET.contains(&(c as u8)), "unexpected char {c:?} in {code}");
        }
    }

    #[test]
    fn codes_do_not_repeat() {
        let mut seen = HashSet::new();
        for _ in 0..500 {
            assert!(seen.insert(generate_tracking_code().unwrap()));
        }
    }

    #[test]
    fn base32_uses_whole_alphabet_range() {
        assert_eq!(base32_chars(&[0x00, 0x00], 3), "AAA");
        assert_eq!(base32_chars(&[0xff, 0xff], 3), "777");
    }
}
