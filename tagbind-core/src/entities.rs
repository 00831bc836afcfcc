//! Entity and character reference decoding.
//!
//! Handles the five predefined entities (`&lt; &gt; &amp; &quot; &apos;`)
//! and numeric character references (`&#123;`, `&#x7B;`). Any other use of
//! `&` is malformed. Uses `Cow` so text without references stays borrowed.

use std::borrow::Cow;

use memchr::memchr;
use phf::phf_map;

use crate::error::{Error, Result};

/// Predefined entities.
static PREDEFINED: phf::Map<&'static str, char> = phf_map! {
    "lt" => '<',
    "gt" => '>',
    "amp" => '&',
    "quot" => '"',
    "apos" => '\'',
};

/// Longest reference body we look at before giving up (`#x10FFFF` is 8).
const MAX_REFERENCE_LEN: usize = 16;

/// Decode all references in `raw`.
///
/// `base` is the byte offset of `raw` in the document, used for error
/// positions.
pub fn decode(raw: &str, base: usize) -> Result<Cow<'_, str>> {
    let bytes = raw.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Ok(Cow::Borrowed(raw));
    };

    let mut out = String::with_capacity(raw.len());
    let mut pos = 0;
    let mut amp = first;
    loop {
        out.push_str(&raw[pos..amp]);
        let (ch, consumed) = decode_reference(&raw[amp..], base + amp)?;
        out.push(ch);
        pos = amp + consumed;

        match memchr(b'&', &bytes[pos..]) {
            Some(next) => amp = pos + next,
            None => break,
        }
    }
    out.push_str(&raw[pos..]);
    Ok(Cow::Owned(out))
}

/// Decode one reference at the start of `input` (which begins with `&`).
/// Returns the character and the number of bytes consumed including `;`.
fn decode_reference(input: &str, position: usize) -> Result<(char, usize)> {
    let window = &input.as_bytes()[1..input.len().min(MAX_REFERENCE_LEN + 2)];
    let Some(semi) = memchr(b';', window) else {
        return Err(Error::malformed("unescaped '&' in content", position));
    };
    let body = &input[1..1 + semi];
    let consumed = semi + 2;

    if let Some(numeric) = body.strip_prefix('#') {
        let ch = decode_numeric(numeric).ok_or_else(|| {
            Error::malformed(format!("invalid character reference '&{body};'"), position)
        })?;
        return Ok((ch, consumed));
    }

    match PREDEFINED.get(body) {
        Some(&ch) => Ok((ch, consumed)),
        None if body.is_empty() => Err(Error::malformed("unescaped '&' in content", position)),
        None => Err(Error::malformed(format!("unknown entity '&{body};'"), position)),
    }
}

/// Decode the part of a character reference after `#`.
fn decode_numeric(digits: &str) -> Option<char> {
    let code = match digits.strip_prefix('x') {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u32::from_str_radix(hex, 16).ok()?
        }
        Some(_) => return None,
        None if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits.parse().ok()?
        }
        None => return None,
    };
    // NUL is never a legal document character
    if code == 0 {
        return None;
    }
    char::from_u32(code)
}
