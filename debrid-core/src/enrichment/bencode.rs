//! Order-preserving bencode codec for torrent containers
//!
//! Dictionaries keep the key order they were decoded with, so a document that
//! is decoded, touched in a couple of keys and encoded again keeps every other
//! byte (including the `info` dictionary that the info hash covers).

use std::collections::HashSet;

/// Nesting limit for lists and dictionaries.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Errors produced while decoding bencoded data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BencodeError {
    #[error("Bencode data is empty")]
    Empty,

    #[error("Unexpected end of data at byte {position}")]
    UnexpectedEnd { position: usize },

    #[error("Invalid bencode at byte {position}: {reason}")]
    Malformed { position: usize, reason: String },

    #[error("Root element must be a dictionary")]
    RootNotDictionary,

    #[error("Trailing data after root dictionary at byte {position}")]
    TrailingData { position: usize },

    #[error("Nesting deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// A single bencoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BencodeValue {
    Bytes(Vec<u8>),
    Integer(i64),
    List(Vec<BencodeValue>),
    Dictionary(BencodeDict),
}

impl BencodeValue {
    /// Builds a byte string value from text.
    pub fn text(value: impl AsRef<str>) -> Self {
        BencodeValue::Bytes(value.as_ref().as_bytes().to_vec())
    }

    /// Returns the byte string payload, if this is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            BencodeValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[BencodeValue]> {
        match self {
            BencodeValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Dictionary that remembers insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BencodeDict {
    entries: Vec<(Vec<u8>, BencodeValue)>,
}

impl BencodeDict {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a key.
    pub fn get(&self, key: &[u8]) -> Option<&BencodeValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.as_slice() == key)
            .map(|(_, value)| value)
    }

    /// Replaces the value of an existing key in place, or appends a new key.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: BencodeValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Removes a key and returns its value.
    pub fn remove(&mut self, key: &[u8]) -> Option<BencodeValue> {
        let index = self
            .entries
            .iter()
            .position(|(existing, _)| existing.as_slice() == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns true when the key is present.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.iter().map(|(key, _)| key.as_slice())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decodes a document whose root is a dictionary.
///
/// Only canonical integers and lengths are accepted (no leading zeros, no
/// negative zero), which is what lets [`encode`] reproduce the input exactly.
///
/// # Errors
///
/// - `BencodeError::Empty` - Input has no bytes
/// - `BencodeError::RootNotDictionary` - Root value is not a dictionary
/// - `BencodeError::TrailingData` - Bytes remain after the root dictionary
/// - `BencodeError::Malformed` / `UnexpectedEnd` / `TooDeep` - Structural errors
pub fn decode(data: &[u8]) -> Result<BencodeDict, BencodeError> {
    if data.is_empty() {
        return Err(BencodeError::Empty);
    }
    if data[0] != b'd' {
        return Err(BencodeError::RootNotDictionary);
    }

    let mut decoder = Decoder { data, pos: 0 };
    let root = decoder.value(0)?;

    if decoder.pos != data.len() {
        return Err(BencodeError::TrailingData {
            position: decoder.pos,
        });
    }

    match root {
        BencodeValue::Dictionary(dict) => Ok(dict),
        _ => Err(BencodeError::RootNotDictionary),
    }
}

/// Encodes a dictionary, keys in insertion order.
pub fn encode(dict: &BencodeDict) -> Vec<u8> {
    let mut out = Vec::new();
    encode_dict(dict, &mut out);
    out
}

fn encode_value(value: &BencodeValue, out: &mut Vec<u8>) {
    match value {
        BencodeValue::Bytes(bytes) => encode_bytes(bytes, out),
        BencodeValue::Integer(number) => {
            out.push(b'i');
            out.extend_from_slice(number.to_string().as_bytes());
            out.push(b'e');
        }
        BencodeValue::List(items) => {
            out.push(b'l');
            for item in items {
                encode_value(item, out);
            }
            out.push(b'e');
        }
        BencodeValue::Dictionary(dict) => encode_dict(dict, out),
    }
}

fn encode_dict(dict: &BencodeDict, out: &mut Vec<u8>) {
    out.push(b'd');
    for (key, value) in &dict.entries {
        encode_bytes(key, out);
        encode_value(value, out);
    }
    out.push(b'e');
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(bytes);
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn value(&mut self, depth: usize) -> Result<BencodeValue, BencodeError> {
        match self.peek()? {
            b'i' => self.integer().map(BencodeValue::Integer),
            b'l' => {
                self.enter(depth)?;
                let mut items = Vec::new();
                while self.peek()? != b'e' {
                    items.push(self.value(depth + 1)?);
                }
                self.pos += 1;
                Ok(BencodeValue::List(items))
            }
            b'd' => {
                self.enter(depth)?;
                let mut dict = BencodeDict::new();
                let mut seen = HashSet::new();
                while self.peek()? != b'e' {
                    let key_position = self.pos;
                    let key = self.bytes()?;
                    if !seen.insert(key.clone()) {
                        return Err(self.malformed(key_position, "duplicate dictionary key"));
                    }
                    let value = self.value(depth + 1)?;
                    dict.entries.push((key, value));
                }
                self.pos += 1;
                Ok(BencodeValue::Dictionary(dict))
            }
            b'0'..=b'9' => self.bytes().map(BencodeValue::Bytes),
            other => Err(self.malformed(self.pos, &format!("unexpected byte 0x{other:02x}"))),
        }
    }

    fn enter(&mut self, depth: usize) -> Result<(), BencodeError> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(BencodeError::TooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.pos += 1;
        Ok(())
    }

    fn integer(&mut self) -> Result<i64, BencodeError> {
        let start = self.pos;
        self.pos += 1; // 'i'
        let digits = self.until(b'e')?;
        let text = std::str::from_utf8(digits)
            .map_err(|_| self.malformed(start, "integer is not ASCII"))?;

        let magnitude = text.strip_prefix('-').unwrap_or(text);
        let canonical = !magnitude.is_empty()
            && magnitude.bytes().all(|b| b.is_ascii_digit())
            && (magnitude == "0" || !magnitude.starts_with('0'))
            && text != "-0";
        if !canonical {
            return Err(self.malformed(start, "non-canonical integer"));
        }

        text.parse::<i64>()
            .map_err(|_| self.malformed(start, "integer out of range"))
    }

    fn bytes(&mut self) -> Result<Vec<u8>, BencodeError> {
        let start = self.pos;
        let digits = self.until(b':')?;
        if digits.is_empty()
            || !digits.iter().all(u8::is_ascii_digit)
            || (digits.len() > 1 && digits[0] == b'0')
        {
            return Err(self.malformed(start, "invalid string length"));
        }

        let length: usize = std::str::from_utf8(digits)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| self.malformed(start, "invalid string length"))?;

        let end = self
            .pos
            .checked_add(length)
            .filter(|end| *end <= self.data.len())
            .ok_or(BencodeError::UnexpectedEnd {
                position: self.data.len(),
            })?;

        let bytes = self.data[self.pos..end].to_vec();
        self.pos = end;
        Ok(bytes)
    }

    /// Returns the bytes before `terminator` and moves past it.
    fn until(&mut self, terminator: u8) -> Result<&'a [u8], BencodeError> {
        let data = self.data;
        let offset = data[self.pos..]
            .iter()
            .position(|b| *b == terminator)
            .ok_or(BencodeError::UnexpectedEnd {
                position: data.len(),
            })?;
        let slice = &data[self.pos..self.pos + offset];
        self.pos += offset + 1;
        Ok(slice)
    }

    fn peek(&self) -> Result<u8, BencodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(BencodeError::UnexpectedEnd { position: self.pos })
    }

    fn malformed(&self, position: usize, reason: &str) -> BencodeError {
        BencodeError::Malformed {
            position,
            reason: reason.to_string(),
        }
    }
}
