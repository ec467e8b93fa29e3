//! Response header collection.

use std::collections::BTreeMap;

/// Response headers keyed by lower-cased name. Repeated headers keep the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap(BTreeMap<String, String>);

impl HeaderMap {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.0
            .insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse raw header lines as collected from curl's header callback.
///
/// With redirects curl reports one header block per response; only the block
/// belonging to the final response (the last status line) is kept.
pub fn parse_header_lines(lines: &[String]) -> HeaderMap {
    let mut map = HeaderMap::default();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            map = HeaderMap::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            map.insert(name, value);
        }
    }
    map
}
