use super::{InventoryReader, InventoryWriter, StorageError};
use crate::inventory::{Field, FieldValue, InventoryError, Record};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const INVENTORY_KEY: &str = "car_inventory";

/// `{"car_inventory": [ {field_key: value, ...}, ... ]}`
#[derive(Debug, Clone)]
pub struct JsonInventory {
    path: PathBuf,
}

impl JsonInventory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Record>, StorageError> {
        let document: Value = serde_json::from_reader(reader)?;
        let entries = document
            .get(INVENTORY_KEY)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                StorageError::Malformed(format!("expected a top-level `{INVENTORY_KEY}` array"))
            })?;

        Ok(entries.iter().map(entry_to_record).collect())
    }

    pub fn to_writer<W: Write>(writer: W, records: &[Record]) -> Result<(), StorageError> {
        let entries: Vec<Value> = records.iter().map(record_to_entry).collect();
        let mut document = Map::new();
        document.insert(INVENTORY_KEY.to_string(), Value::Array(entries));
        serde_json::to_writer_pretty(writer, &Value::Object(document))?;
        Ok(())
    }
}

impl InventoryReader for JsonInventory {
    fn read_inventory(&self) -> Result<Vec<Record>, StorageError> {
        let file = File::open(&self.path)?;
        let records = Self::from_reader(BufReader::new(file))?;
        debug!(path = %self.path.display(), records = records.len(), "json inventory read");
        Ok(records)
    }
}

impl InventoryWriter for JsonInventory {
    fn write_inventory(&self, records: &[Record]) -> Result<(), StorageError> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        Self::to_writer(&mut writer, records)?;
        writer.flush()?;
        debug!(path = %self.path.display(), records = records.len(), "json inventory written");
        Ok(())
    }
}

fn entry_to_record(entry: &Value) -> Record {
    let mut record = Record::new();
    let Some(object) = entry.as_object() else {
        record.attach_error(InventoryError::MissingCriticalInfo(format!(
            "inventory entry is not an object: {entry}"
        )));
        return record;
    };

    for field in Field::ALL {
        if field == Field::ErrorReason {
            continue;
        }
        let Some(value) = object.get(field.key()) else {
            continue;
        };
        let converted = match value {
            Value::Null => continue,
            Value::String(text) => FieldValue::Text(text.clone()),
            Value::Bool(flag) => FieldValue::Bool(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(whole) => FieldValue::Long(whole),
                None => FieldValue::Text(number.to_string()),
            },
            other => FieldValue::Text(other.to_string()),
        };
        record.insert_raw(field, converted);
    }

    record
}

fn record_to_entry(record: &Record) -> Value {
    let mut object = Map::new();
    for (field, value) in record.iter() {
        let converted = match value {
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Long(number) => Value::from(*number),
            FieldValue::Bool(flag) => Value::Bool(*flag),
            FieldValue::Failure(_) => continue,
        };
        object.insert(field.key().to_string(), converted);
    }
    Value::Object(object)
}
