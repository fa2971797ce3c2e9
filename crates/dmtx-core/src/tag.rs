use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Point;

/// Which payload representation an engine produces and accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// Decimal identifiers.
    Numeric,
    /// Arbitrary strings.
    #[default]
    Text,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadKind::Numeric => f.write_str("numeric"),
            PayloadKind::Text => f.write_str("text"),
        }
    }
}

/// Content carried by a tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Numeric(u64),
    Text(String),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Numeric(_) => PayloadKind::Numeric,
            Payload::Text(_) => PayloadKind::Text,
        }
    }

    /// Byte message stored in the symbol: the decimal digits of a numeric id,
    /// the UTF-8 bytes of a text payload.
    pub fn to_message(&self) -> Vec<u8> {
        match self {
            Payload::Numeric(id) => id.to_string().into_bytes(),
            Payload::Text(s) => s.as_bytes().to_vec(),
        }
    }

    /// Interpret a decoded symbol message as a payload of `kind`.
    ///
    /// Numeric payloads must be a plain run of ASCII digits that fits in a
    /// `u64`. Text that is not valid UTF-8 is read as ISO-8859-1.
    pub fn from_message(kind: PayloadKind, message: &[u8]) -> Option<Payload> {
        match kind {
            PayloadKind::Numeric => {
                if message.is_empty() || !message.iter().all(u8::is_ascii_digit) {
                    return None;
                }
                std::str::from_utf8(message)
                    .ok()?
                    .parse::<u64>()
                    .ok()
                    .map(Payload::Numeric)
            }
            PayloadKind::Text => Some(Payload::Text(match std::str::from_utf8(message) {
                Ok(s) => s.to_owned(),
                Err(_) => message.iter().map(|&b| b as char).collect(),
            })),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Text(s) if s.is_empty())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Numeric(id) => write!(f, "{id}"),
            Payload::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Payload {
    fn from(id: u64) -> Self {
        Payload::Numeric(id)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_owned())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

/// One decoded tag: its payload and the quadrilateral it occupies.
///
/// `corner1` is the vertex of the finder "L" (the symbol's bottom-left in
/// its own frame); `corner2`, `corner3` and `corner4` follow anti-clockwise
/// as seen on screen. Drawing `corner1 → corner2 → corner3 → corner4 →
/// corner1` outlines the tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagResult {
    payload: Payload,
    corners: [Point; 4],
}

impl TagResult {
    pub fn new(payload: Payload, corners: [Point; 4]) -> Self {
        Self { payload, corners }
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    /// All four corners in order `corner1..=corner4`.
    #[inline]
    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    #[inline]
    pub fn corner1(&self) -> Point {
        self.corners[0]
    }

    #[inline]
    pub fn corner2(&self) -> Point {
        self.corners[1]
    }

    #[inline]
    pub fn corner3(&self) -> Point {
        self.corners[2]
    }

    #[inline]
    pub fn corner4(&self) -> Point {
        self.corners[3]
    }

    /// The four outline edges as `(from, to)` pairs, closing back on `corner1`.
    pub fn edges(&self) -> [(Point, Point); 4] {
        let c = &self.corners;
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }
}
