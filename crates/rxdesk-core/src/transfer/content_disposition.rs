//! Suggested file name from a `Content-Disposition` header.

/// `filename*=UTF-8''...` wins over `filename=`; quoted values may contain
/// `;` and backslash escapes. Returns None when neither yields a name.
pub fn suggested_file_name(header: &str) -> Option<String> {
    let mut plain = None;
    for (name, value) in params(header) {
        match name.to_ascii_lowercase().as_str() {
            "filename*" => {
                if let Some(decoded) = decode_ext_value(&value) {
                    if !decoded.is_empty() {
                        return Some(decoded);
                    }
                }
            }
            "filename" if !value.is_empty() && plain.is_none() => plain = Some(value),
            _ => {}
        }
    }
    plain
}

/// Splits `type; a=b; c="d;e"` into unquoted (name, value) pairs, skipping
/// the leading disposition type.
fn params(header: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut chars = header.chars().peekable();
    // disposition type
    for c in chars.by_ref() {
        if c == ';' {
            break;
        }
    }
    loop {
        let mut name = String::new();
        for c in chars.by_ref() {
            match c {
                '=' => break,
                ';' => name.clear(),
                other => name.push(other),
            }
        }
        let name = name.trim().to_string();
        if name.is_empty() {
            break;
        }
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => break,
                    other => value.push(other),
                }
            }
            for c in chars.by_ref() {
                if c == ';' {
                    break;
                }
            }
        } else {
            for c in chars.by_ref() {
                if c == ';' {
                    break;
                }
                value.push(c);
            }
            value = value.trim().to_string();
        }
        out.push((name, value));
    }
    out
}

/// RFC 5987 `charset'lang'percent-encoded`. UTF-8 and ISO-8859-1 only.
fn decode_ext_value(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?.to_ascii_lowercase();
    let _lang = parts.next()?;
    let encoded = parts.next()?;
    let bytes = percent_decode(encoded)?;
    match charset.as_str() {
        "utf-8" => String::from_utf8(bytes).ok(),
        "iso-8859-1" => Some(bytes.into_iter().map(char::from).collect()),
        _ => None,
    }
}

fn percent_decode(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(out)
}
