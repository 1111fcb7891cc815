//! CSV export of decoded fields, one row per field

use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use super::text::format_raw;
use crate::fields::{FieldError, FieldRegistry};

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Field error: {0}")]
    Field(#[from] FieldError),
}

pub type Result<T> = std::result::Result<T, CsvError>;

pub const CSV_HEADER: [&str; 7] = ["address", "name", "type", "start", "length", "value", "raw"];

/// Write every field of `registry` to `filename`
pub fn export_csv(filename: impl AsRef<Path>, registry: &FieldRegistry) -> Result<()> {
    let mut file = File::create(filename)?;
    write_csv(&mut file, registry)
}

/// Write the CSV rows to any writer
pub fn write_csv(out: &mut impl Write, registry: &FieldRegistry) -> Result<()> {
    writeln!(out, "{}", CSV_HEADER.join(","))?;

    for field in registry {
        let value = registry.value_of(field)?;
        let raw = field.raw_value(registry.buffer())?;
        let row = [
            field.format_address(),
            escape(field.name()),
            field.data_type().to_string(),
            field.start().to_string(),
            field.length().to_string(),
            escape(&value.to_string()),
            format_raw(&raw),
        ];
        writeln!(out, "{}", row.join(","))?;
    }

    Ok(())
}

/// Quote a cell when it would otherwise break the row
fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitwise::DataType;

    #[test]
    fn test_write_csv() {
        let mut registry = FieldRegistry::new(b"\x12\x34a,b".to_vec());
        registry.add(DataType::UInt, "testval", 8, 8).unwrap();
        registry.add(DataType::Ascii, "label", 16, 24).unwrap();

        let mut out = Vec::new();
        write_csv(&mut out, &registry).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "address,name,type,start,length,value,raw");
        assert_eq!(lines[1], "0001:0+8,testval,uint,8,8,52,0x34");
        assert_eq!(lines[2], "0002:0+24,label,ascii,16,24,\"a,b\",0x61 0x2c 0x62");
    }

    #[test]
    fn test_export_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.csv");

        let mut registry = FieldRegistry::new(vec![0xff]);
        registry.add(DataType::Bool, "top", 7, 1).unwrap();
        export_csv(&path, &registry).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("0000:7+1,top,bool,7,1,True,0x01\n"));
    }
}
