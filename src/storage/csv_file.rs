use super::{InventoryReader, StorageError};
use crate::inventory::rejects::parse_flag;
use crate::inventory::{Field, FieldValue, Record, ValueKind};
use chrono::{DateTime, NaiveDate};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only CSV adapter; the header row names fields by their keys.
#[derive(Debug, Clone)]
pub struct CsvInventory {
    path: PathBuf,
}

impl CsvInventory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Record>, StorageError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<Option<Field>> = csv_reader
            .headers()?
            .iter()
            .map(|header| Field::from_key(header).filter(|field| *field != Field::ErrorReason))
            .collect();

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let mut record = Record::new();
            for (column, cell) in columns.iter().zip(row.iter()) {
                let Some(field) = column else {
                    continue;
                };
                if cell.is_empty() {
                    continue;
                }
                record.insert_raw(*field, parse_cell(*field, cell));
            }
            records.push(record);
        }

        Ok(records)
    }
}

impl InventoryReader for CsvInventory {
    fn read_inventory(&self) -> Result<Vec<Record>, StorageError> {
        let records = Self::from_reader(File::open(&self.path)?)?;
        debug!(path = %self.path.display(), records = records.len(), "csv inventory read");
        Ok(records)
    }
}

/// Cells that do not parse as the field's kind stay as raw text so the
/// validator can report them.
fn parse_cell(field: Field, cell: &str) -> FieldValue {
    let raw = || FieldValue::Text(cell.to_string());
    match field.kind() {
        ValueKind::Long if field == Field::AcquisitionDate => cell
            .parse::<i64>()
            .ok()
            .or_else(|| parse_date_millis(cell))
            .map_or_else(raw, FieldValue::Long),
        ValueKind::Long => cell.parse::<i64>().map_or_else(|_| raw(), FieldValue::Long),
        ValueKind::Bool => parse_flag(cell).map_or_else(raw, FieldValue::Bool),
        ValueKind::Text | ValueKind::Failure => raw(),
    }
}

fn parse_date_millis(value: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}
