use crate::cursor::ByteCursor;
use crate::{Error, Result};
use ds_types::{FinderDate, FourCc, TypeCode};
use itertools::Itertools;
use std::fmt;

/// A decoded record value.
///
/// `shor` and `long` share [`Value::U32`]; `comp` and `dutc` share
/// [`Value::U64`]. The on-disk tag is not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U32(u32),
    U64(u64),
    Type(FourCc),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Decode one value of the given type at the cursor.
    ///
    /// Fails with [`Error::UnrecognizedType`] without consuming anything when
    /// the tag is unknown.
    pub fn read(cursor: &mut ByteCursor<'_>, type_code: FourCc) -> Result<Self> {
        let Some(kind) = TypeCode::from_four_cc(type_code) else {
            return Err(Error::UnrecognizedType(type_code));
        };

        let value = match kind {
            TypeCode::Bool => Value::Bool(cursor.read_u8()? != 0),
            TypeCode::Shor | TypeCode::Long => Value::U32(cursor.read_u32()?),
            TypeCode::Comp | TypeCode::Dutc => Value::U64(cursor.read_u64()?),
            TypeCode::Type => Value::Type(FourCc(cursor.read_array()?)),
            TypeCode::Ustr => {
                let units = cursor.read_u32()?;
                Value::Text(read_utf16_be(cursor, units)?)
            }
            TypeCode::Blob => {
                let length = cursor.read_u32()?;
                Value::Blob(cursor.read_bytes(length as usize)?.to_vec())
            }
        };
        Ok(value)
    }

    /// Interpret a 64-bit value as a `dutc` timestamp.
    pub fn as_date(&self) -> Option<FinderDate> {
        match self {
            Value::U64(raw) => Some(FinderDate(*raw)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::U32(n) => write!(f, "{n}"),
            Value::U64(n) => write!(f, "{n}"),
            Value::Type(code) => write!(f, "{code}"),
            Value::Text(text) => f.write_str(text),
            Value::Blob(bytes) => write!(f, "0x{}", hex(bytes)),
        }
    }
}

/// Lowercase hex, no separators.
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).join("")
}

/// Read `units` UTF-16BE code units and decode them. Unpaired surrogates
/// become U+FFFD.
pub(crate) fn read_utf16_be(cursor: &mut ByteCursor<'_>, units: u32) -> Result<String> {
    let byte_length = (units as usize)
        .checked_mul(2)
        .ok_or(Error::Truncated {
            offset: cursor.position(),
        })?;
    let bytes = cursor.read_bytes(byte_length)?;
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect_vec();
    Ok(String::from_utf16_lossy(&units))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(tag: &[u8; 4], bytes: &[u8]) -> (Result<Value>, u64) {
        let mut cursor = ByteCursor::new(bytes);
        let value = Value::read(&mut cursor, FourCc::new(tag));
        (value, cursor.position())
    }

    fn utf16_be(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_be_bytes).collect()
    }

    #[test]
    fn fixed_width_values() {
        assert_eq!(decode(b"bool", &[1]), (Ok(Value::Bool(true)), 1));
        assert_eq!(decode(b"bool", &[0]), (Ok(Value::Bool(false)), 1));
        assert_eq!(decode(b"bool", &[0x80]), (Ok(Value::Bool(true)), 1));
        assert_eq!(
            decode(b"shor", &[0, 0, 0, 0x30]),
            (Ok(Value::U32(0x30)), 4)
        );
        assert_eq!(
            decode(b"long", &[0, 1, 0, 0]),
            (Ok(Value::U32(0x1_0000)), 4)
        );
        assert_eq!(
            decode(b"comp", &[0, 0, 0, 0, 0, 0x10, 0, 0]),
            (Ok(Value::U64(0x10_0000)), 8)
        );
        assert_eq!(
            decode(b"dutc", &[0, 0, 0, 0xCE, 0x5B, 0x4A, 0, 0]),
            (Ok(Value::U64(0xCE_5B4A_0000)), 8)
        );
        assert_eq!(
            decode(b"type", b"icnv"),
            (Ok(Value::Type(FourCc::new(b"icnv"))), 4)
        );
    }

    #[test]
    fn ustr_decodes_utf16_be() {
        let text = "untitled folder";
        let mut bytes = (text.encode_utf16().count() as u32).to_be_bytes().to_vec();
        bytes.extend(utf16_be(text));

        let (value, position) = decode(b"ustr", &bytes);
        assert_eq!(value, Ok(Value::Text(text.to_string())));
        assert_eq!(position, bytes.len() as u64);
    }

    #[test]
    fn ustr_keeps_astral_characters() {
        let text = "Fotos 📷";
        let mut bytes = (text.encode_utf16().count() as u32).to_be_bytes().to_vec();
        bytes.extend(utf16_be(text));
        assert_eq!(decode(b"ustr", &bytes).0, Ok(Value::Text(text.to_string())));
    }

    #[test]
    fn blob_is_copied_verbatim() {
        let bytes = [0, 0, 0, 3, 0x01, 0x02, 0x03, 0xEE];
        assert_eq!(
            decode(b"blob", &bytes),
            (Ok(Value::Blob(vec![0x01, 0x02, 0x03])), 7)
        );
    }

    #[test]
    fn unknown_tag_consumes_nothing() {
        assert_eq!(
            decode(b"zzzz", &[1, 2, 3, 4]),
            (Err(Error::UnrecognizedType(FourCc::new(b"zzzz"))), 0)
        );
    }

    #[test]
    fn short_values_are_truncated() {
        assert!(matches!(
            decode(b"long", &[0, 0]).0,
            Err(Error::Truncated { .. })
        ));
        // Claims 8 code units, carries 2.
        assert_eq!(
            decode(b"ustr", &[0, 0, 0, 8, 0, b'a', 0, b'b']).0,
            Err(Error::Truncated { offset: 4 })
        );
        assert!(matches!(
            decode(b"blob", &[0xFF, 0xFF, 0xFF, 0xFF, 0]).0,
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn display_renders_blobs_as_hex() {
        assert_eq!(Value::Blob(vec![0x00, 0xAB, 0x10]).to_string(), "0x00ab10");
        assert_eq!(Value::Type(FourCc::new(b"Nlsv")).to_string(), "Nlsv");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }
}
