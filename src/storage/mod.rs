//! Format adapters that turn inventory files into records and back.

mod csv_file;
mod json_file;
mod xml_file;

pub use csv_file::CsvInventory;
pub use json_file::JsonInventory;
pub use xml_file::XmlInventory;

use crate::inventory::Record;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("inventory file {} does not exist", .0.display())]
    PathNotFound(PathBuf),
    #[error("{} has an unsupported extension for {mode}", .path.display())]
    UnsupportedExtension { path: PathBuf, mode: AccessMode },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),
    #[error("malformed inventory document: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => write!(f, "reading"),
            AccessMode::Write => write!(f, "writing"),
        }
    }
}

pub trait InventoryReader {
    fn read_inventory(&self) -> Result<Vec<Record>, StorageError>;
}

pub trait InventoryWriter {
    /// Replaces the whole file with `records`.
    fn write_inventory(&self, records: &[Record]) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFormat {
    Json,
    Csv,
    Xml,
}

impl StorageFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    pub const fn supports(self, mode: AccessMode) -> bool {
        match (self, mode) {
            (Self::Json, _) => true,
            (Self::Csv | Self::Xml, AccessMode::Read) => true,
            (Self::Csv | Self::Xml, AccessMode::Write) => false,
        }
    }
}

fn resolve(path: &Path, mode: AccessMode) -> Result<StorageFormat, StorageError> {
    StorageFormat::from_path(path)
        .filter(|format| format.supports(mode))
        .ok_or_else(|| StorageError::UnsupportedExtension {
            path: path.to_path_buf(),
            mode,
        })
}

/// Reader for an existing file, picked by extension.
pub fn open_reader(path: &Path) -> Result<Box<dyn InventoryReader>, StorageError> {
    let format = resolve(path, AccessMode::Read)?;
    if !path.exists() {
        return Err(StorageError::PathNotFound(path.to_path_buf()));
    }

    Ok(match format {
        StorageFormat::Json => Box::new(JsonInventory::new(path)),
        StorageFormat::Csv => Box::new(CsvInventory::new(path)),
        StorageFormat::Xml => Box::new(XmlInventory::new(path)),
    })
}

/// Writer for `path`, picked by extension; only JSON can be written.
pub fn open_writer(path: &Path) -> Result<Box<dyn InventoryWriter>, StorageError> {
    match resolve(path, AccessMode::Write)? {
        StorageFormat::Json => Ok(Box::new(JsonInventory::new(path))),
        StorageFormat::Csv | StorageFormat::Xml => Err(StorageError::UnsupportedExtension {
            path: path.to_path_buf(),
            mode: AccessMode::Write,
        }),
    }
}
