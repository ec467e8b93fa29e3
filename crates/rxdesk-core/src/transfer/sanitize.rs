//! Safe file names for saved exports.

/// Longest file name most filesystems accept, in bytes.
const NAME_MAX: usize = 255;

/// Makes a server-suggested name safe to create inside the download
/// directory: no path separators, control or reserved characters, no
/// leading dots. Returns None when nothing usable is left.
pub fn safe_file_name(name: &str) -> Option<String> {
    // Keep only the last path component of names like "../../x.xlsx".
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        let c = match c {
            c if c.is_control() => '_',
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c => c,
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    let trimmed = out.trim_matches(|c: char| c.is_whitespace() || c == '.');
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '_') {
        return None;
    }
    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    Some(trimmed[..end].to_string())
}
