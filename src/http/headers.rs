use std::collections::HashMap;

use crate::http::parser::ParseError;

/// Case-insensitive header map.
///
/// Names are normalized to lower-case on insertion, both when parsed off
/// the wire and when set by response code, so lookups never depend on the
/// casing the peer happened to send. A repeated name folds its values into
/// a single comma-separated list in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }

    /// Sets a header, replacing any existing value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.map.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Merges a header the way repeated field lines fold: an existing
    /// value is extended with `", "` plus the new value.
    pub fn add(&mut self, name: &str, value: &str) {
        let key = name.to_ascii_lowercase();
        match self.map.get_mut(&key) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => {
                self.map.insert(key, value.to_string());
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.map.remove(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consumes as many complete `CRLF`-terminated field lines from `data`
    /// as are present, merging them into the map.
    ///
    /// Returns `(bytes_consumed, block_complete)`. A buffer holding no
    /// complete line consumes nothing and is not an error; the caller
    /// re-invokes with more data. An empty line terminates the block and
    /// consumes its two bytes. Already-consumed bytes are never re-parsed:
    /// the caller advances its buffer by the returned count.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        let mut consumed = 0;

        loop {
            let rest = &data[consumed..];
            let Some(idx) = find_crlf(rest) else {
                return Ok((consumed, false));
            };

            if idx == 0 {
                return Ok((consumed + 2, true));
            }

            self.parse_field_line(&rest[..idx])?;
            consumed += idx + 2;
        }
    }

    fn parse_field_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or(ParseError::MissingColon)?;

        // "Host : x" is ambiguous framing and a request-smuggling vector
        if colon > 0 && (line[colon - 1] == b' ' || line[colon - 1] == b'\t') {
            return Err(ParseError::SpaceBeforeColon);
        }

        let raw_name = &line[..colon];
        let raw_value = &line[colon + 1..];

        if raw_name.is_empty() {
            return Err(ParseError::EmptyHeaderName);
        }
        if !raw_name.iter().all(|&b| is_token_char(b)) {
            return Err(ParseError::InvalidHeaderName);
        }
        if !raw_value.iter().all(|&b| is_value_char(b)) {
            return Err(ParseError::InvalidHeaderValue);
        }

        // Name bytes are all token characters here, so only the value can
        // carry surrounding whitespace.
        let name = std::str::from_utf8(raw_name).map_err(|_| ParseError::InvalidHeaderName)?;
        let value = std::str::from_utf8(raw_value)
            .map_err(|_| ParseError::InvalidHeaderValue)?
            .trim();

        self.add(name, value);
        Ok(())
    }
}

/// Position of the next `\r\n` in `data`. A bare `\n` never terminates a
/// line.
pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w == b"\r\n")
}

/// RFC 7230 token characters, the only bytes legal in a field name.
fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

/// Field values may hold printable ASCII and horizontal tab, nothing else.
fn is_value_char(b: u8) -> bool {
    b == b'\t' || (0x20..=0x7e).contains(&b)
}
