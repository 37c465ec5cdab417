//! Percent-encoding and byte-string text forms.

use base64::Engine as _;

/// Characters that are never percent-encoded on output.
///
/// The URI unreserved set plus `+`, which the ARI grammar leaves free.
fn is_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'~' | b'+' | b'-')
}

/// Percent-encode a value segment.
pub fn percent_encode(text: &str, out: &mut String) {
    for &b in text.as_bytes() {
        if is_safe(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(hex_digit(b >> 4));
            out.push(hex_digit(b & 0x0F));
        }
    }
}

fn hex_digit(nibble: u8) -> char {
    char::from_digit(u32::from(nibble), 16).unwrap_or('0').to_ascii_uppercase()
}

/// A percent-decoding failure, with the byte offset inside the segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscapeError {
    /// Truncated or non-hex percent escape.
    BadPercent(usize),
    /// Decoded bytes are not valid UTF-8.
    BadUtf8(usize),
    /// Unknown backslash escape in a quoted string.
    BadBackslash(usize),
    /// Malformed byte-string payload.
    BadByteString,
}

/// Percent-decode a raw segment into text.
pub fn percent_decode(raw: &str) -> Result<String, EscapeError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut ix = 0;
    while ix < bytes.len() {
        let b = bytes[ix];
        if b == b'%' {
            let hi = bytes.get(ix + 1).and_then(|b| (*b as char).to_digit(16));
            let lo = bytes.get(ix + 2).and_then(|b| (*b as char).to_digit(16));
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    out.push((hi * 16 + lo) as u8);
                    ix += 3;
                }
                _ => return Err(EscapeError::BadPercent(ix)),
            }
        } else {
            out.push(b);
            ix += 1;
        }
    }
    String::from_utf8(out).map_err(|e| EscapeError::BadUtf8(e.utf8_error().valid_up_to()))
}

/// Resolve backslash escapes inside a quoted text or byte string body.
pub fn unescape(body: &str) -> Result<String, EscapeError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices();
    while let Some((ix, ch)) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some((_, '"')) => out.push('"'),
            Some((_, '\'')) => out.push('\''),
            Some((_, '\\')) => out.push('\\'),
            Some((_, '/')) => out.push('/'),
            Some((_, 'b')) => out.push('\u{0008}'),
            Some((_, 'f')) => out.push('\u{000C}'),
            Some((_, 'n')) => out.push('\n'),
            Some((_, 'r')) => out.push('\r'),
            Some((_, 't')) => out.push('\t'),
            Some((_, 'u')) => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = chars
                        .next()
                        .and_then(|(_, c)| c.to_digit(16))
                        .ok_or(EscapeError::BadBackslash(ix))?;
                    code = code * 16 + digit;
                }
                out.push(char::from_u32(code).ok_or(EscapeError::BadBackslash(ix))?);
            }
            _ => return Err(EscapeError::BadBackslash(ix)),
        }
    }
    Ok(out)
}

/// Escape `"` and `\` for a quoted text string body.
pub fn escape_quoted(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
}

/// Decode a `h'…'` hexadecimal payload (case-insensitive, whitespace-free).
pub fn decode_hex(body: &str) -> Result<Vec<u8>, EscapeError> {
    if body.len() % 2 != 0 {
        return Err(EscapeError::BadByteString);
    }
    let mut out = Vec::with_capacity(body.len() / 2);
    let bytes = body.as_bytes();
    for pair in bytes.chunks_exact(2) {
        let hi = (pair[0] as char).to_digit(16).ok_or(EscapeError::BadByteString)?;
        let lo = (pair[1] as char).to_digit(16).ok_or(EscapeError::BadByteString)?;
        out.push((hi * 16 + lo) as u8);
    }
    Ok(out)
}

/// Encode bytes as lowercase hexadecimal.
pub fn encode_hex(data: &[u8], out: &mut String) {
    for &b in data {
        out.push(char::from_digit(u32::from(b >> 4), 16).unwrap_or('0'));
        out.push(char::from_digit(u32::from(b & 0x0F), 16).unwrap_or('0'));
    }
}

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Decode a `b32'…'` payload (RFC 4648, case-insensitive, padding
/// optional).
pub fn decode_base32(body: &str) -> Result<Vec<u8>, EscapeError> {
    let trimmed = body.trim_end_matches('=');
    let mut acc: u64 = 0;
    let mut bits = 0u32;
    let mut out = Vec::with_capacity(trimmed.len() * 5 / 8);
    for ch in trimmed.chars() {
        let up = ch.to_ascii_uppercase();
        let val = BASE32_ALPHABET
            .iter()
            .position(|&a| a as char == up)
            .ok_or(EscapeError::BadByteString)? as u64;
        acc = (acc << 5) | val;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
        }
    }
    // leftover bits must be zero padding
    if bits > 0 && (acc & ((1 << bits) - 1)) != 0 {
        return Err(EscapeError::BadByteString);
    }
    Ok(out)
}

/// Decode a `b64'…'` payload (RFC 4648, padding optional).
pub fn decode_base64(body: &str) -> Result<Vec<u8>, EscapeError> {
    let trimmed = body.trim_end_matches('=');
    base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(trimmed)
        .map_err(|_| EscapeError::BadByteString)
}
