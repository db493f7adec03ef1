//! Text renderings of a [`RecordSet`]: an indented listing for people and
//! JSON Lines for tools.

use crate::value::hex;
use crate::{FinderDate, FourCc, Properties, RecordSet, StructId, Value};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use byteorder::{ByteOrder, LittleEndian};
use ds_types::BPLIST_MAGIC;
use log::debug;
use serde::{Serialize, Serializer};
use std::io::{self, Cursor, Write};
use time::OffsetDateTime;
use time::macros::format_description;

/// One line per filename, followed by one tab-indented line per property.
pub fn write_human(records: &RecordSet, out: &mut impl Write) -> io::Result<()> {
    for (filename, properties) in records {
        writeln!(out, "{filename}")?;
        for (struct_id, value) in properties {
            writeln!(out, "\t{}", describe(*struct_id, value))?;
        }
    }
    Ok(())
}

/// One JSON object per filename and line:
/// `{"filename": ..., "properties": {...}}`.
pub fn write_jsonl(records: &RecordSet, out: &mut impl Write) -> io::Result<()> {
    #[derive(Serialize)]
    struct Line<'a> {
        filename: &'a str,
        properties: &'a Properties,
    }

    for (filename, properties) in records {
        serde_json::to_writer(
            &mut *out,
            &Line {
                filename,
                properties,
            },
        )?;
        writeln!(out)?;
    }
    Ok(())
}

fn describe(struct_id: FourCc, value: &Value) -> String {
    interpret(struct_id, value).unwrap_or_else(|| match value {
        Value::Blob(_) => format!("{struct_id} (blob): {value}"),
        _ => format!("{struct_id}: {value}"),
    })
}

/// Presentation for struct IDs whose meaning is known.
fn interpret(struct_id: FourCc, value: &Value) -> Option<String> {
    let id = StructId::from_four_cc(struct_id)?;
    match value {
        Value::U64(raw) if id.is_modification_date() => {
            let date = format_date(FinderDate(*raw))?;
            Some(format!("Modification date: {date}"))
        }
        // Older files store the date as a little-endian blob.
        Value::Blob(bytes) if id.is_modification_date() && bytes.len() >= 8 => Some(format!(
            "Modification date (from blob): {}",
            LittleEndian::read_u64(bytes)
        )),
        Value::Blob(bytes) if id.holds_property_list() && bytes.starts_with(BPLIST_MAGIC) => {
            Some(match property_list_xml(bytes) {
                Some(xml) => format!(
                    "{struct_id} (Property List):\n\t\t{}",
                    xml.trim_end().replace('\n', "\n\t\t")
                ),
                None => format!(
                    "{struct_id} (Property List, {} bytes): 0x{}",
                    bytes.len(),
                    hex(bytes)
                ),
            })
        }
        _ => None,
    }
}

/// Decode an embedded binary property list and re-encode it as XML.
fn property_list_xml(bytes: &[u8]) -> Option<String> {
    let list = plist::Value::from_reader(Cursor::new(bytes))
        .map_err(|e| debug!("undecodable property list: {e}"))
        .ok()?;
    let mut xml = Vec::new();
    list.to_writer_xml(&mut xml)
        .map_err(|e| debug!("property list to XML: {e}"))
        .ok()?;
    String::from_utf8(xml).ok()
}

/// `None` when the date is outside what `time` can represent.
fn format_date(date: FinderDate) -> Option<String> {
    let format = format_description!(
        "[month repr:long] [day padding:none], [year] at [hour repr:12 padding:none]:[minute] [period]"
    );
    OffsetDateTime::from_unix_timestamp(date.unix_seconds())
        .ok()?
        .format(format)
        .ok()
}

/// Blobs become base64 strings, four-character codes plain strings.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::U32(n) => serializer.serialize_u32(*n),
            Value::U64(n) => serializer.serialize_u64(*n),
            Value::Type(code) => code.serialize(serializer),
            Value::Text(text) => serializer.serialize_str(text),
            Value::Blob(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        }
    }
}
