//! Field schema and the typed gate every record access goes through.

use super::error::InventoryError;
use std::collections::BTreeMap;

/// The value types a field may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Long,
    Bool,
    Failure,
}

impl ValueKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Long => "long",
            Self::Bool => "bool",
            Self::Failure => "failure",
        }
    }
}

/// Closed set of named fields a record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    DealershipId,
    DealershipName,
    DealershipReceivingStatus,
    DealershipRentingStatus,
    VehicleType,
    VehicleManufacturer,
    VehicleModel,
    VehicleId,
    VehicleRentalStatus,
    Price,
    PriceUnit,
    AcquisitionDate,
    ErrorReason,
}

impl Field {
    pub const ALL: [Self; 13] = [
        Self::DealershipId,
        Self::DealershipName,
        Self::DealershipReceivingStatus,
        Self::DealershipRentingStatus,
        Self::VehicleType,
        Self::VehicleManufacturer,
        Self::VehicleModel,
        Self::VehicleId,
        Self::VehicleRentalStatus,
        Self::Price,
        Self::PriceUnit,
        Self::AcquisitionDate,
        Self::ErrorReason,
    ];

    /// Key used by the persisted formats.
    pub const fn key(self) -> &'static str {
        match self {
            Self::DealershipId => "dealership_id",
            Self::DealershipName => "dealership_name",
            Self::DealershipReceivingStatus => "dealership_receiving_status",
            Self::DealershipRentingStatus => "dealership_rental_status",
            Self::VehicleType => "vehicle_type",
            Self::VehicleManufacturer => "vehicle_manufacturer",
            Self::VehicleModel => "vehicle_model",
            Self::VehicleId => "vehicle_id",
            Self::VehicleRentalStatus => "vehicle_rental_status",
            Self::Price => "price",
            Self::PriceUnit => "price_unit",
            Self::AcquisitionDate => "acquisition_date",
            Self::ErrorReason => "error_reason",
        }
    }

    pub const fn kind(self) -> ValueKind {
        match self {
            Self::DealershipId
            | Self::DealershipName
            | Self::VehicleType
            | Self::VehicleManufacturer
            | Self::VehicleModel
            | Self::VehicleId
            | Self::PriceUnit => ValueKind::Text,
            Self::DealershipReceivingStatus
            | Self::DealershipRentingStatus
            | Self::VehicleRentalStatus => ValueKind::Bool,
            Self::Price | Self::AcquisitionDate => ValueKind::Long,
            Self::ErrorReason => ValueKind::Failure,
        }
    }

    pub const fn required(self) -> bool {
        matches!(
            self,
            Self::DealershipId
                | Self::VehicleType
                | Self::VehicleModel
                | Self::VehicleId
                | Self::Price
        )
    }

    /// Fields that describe the dealership rather than a vehicle.
    pub const fn is_dealer_field(self) -> bool {
        matches!(
            self,
            Self::DealershipId
                | Self::DealershipName
                | Self::DealershipReceivingStatus
                | Self::DealershipRentingStatus
        )
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        let key = raw.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }
}

/// A single value held by a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Long(i64),
    Bool(bool),
    Failure(InventoryError),
}

impl FieldValue {
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Long(_) => ValueKind::Long,
            Self::Bool(_) => ValueKind::Bool,
            Self::Failure(_) => ValueKind::Failure,
        }
    }

    /// Plain rendering used by tables and the completeness pre-filter.
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Long(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Failure(error) => error.to_string(),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<InventoryError> for FieldValue {
    fn from(value: InventoryError) -> Self {
        Self::Failure(value)
    }
}

/// Rust types that can be read back out of a record.
pub trait FieldType: Sized {
    const KIND: ValueKind;

    fn extract(value: &FieldValue) -> Option<Self>;
}

impl FieldType for String {
    const KIND: ValueKind = ValueKind::Text;

    fn extract(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(text) => Some(text.clone()),
            _ => None,
        }
    }
}

impl FieldType for i64 {
    const KIND: ValueKind = ValueKind::Long;

    fn extract(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Long(number) => Some(*number),
            _ => None,
        }
    }
}

impl FieldType for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn extract(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }
}

impl FieldType for InventoryError {
    const KIND: ValueKind = ValueKind::Failure;

    fn extract(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Failure(error) => Some(error.clone()),
            _ => None,
        }
    }
}

/// Mapping from field to value used for both ingest and export.
///
/// Format adapters may place raw values of the wrong kind through
/// [`Record::insert_raw`] so the validator can report them, but
/// [`Record::get_typed`] never hands such a value out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<Field, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::put_valid`]; ill-typed values are dropped.
    pub fn with(mut self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.put_valid(field, value);
        self
    }

    /// Stores `value` only when its type matches the field's declared type.
    pub fn put_valid(&mut self, field: Field, value: impl Into<FieldValue>) -> bool {
        let value = value.into();
        if value.kind() != field.kind() {
            return false;
        }
        self.values.insert(field, value);
        true
    }

    /// Absent (`None`) values are never stored.
    pub fn put_valid_opt<V: Into<FieldValue>>(&mut self, field: Field, value: Option<V>) -> bool {
        match value {
            Some(value) => self.put_valid(field, value),
            None => false,
        }
    }

    pub fn insert_raw(&mut self, field: Field, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(field, value)
    }

    /// Returns the stored value as `T`, failing when the field is absent,
    /// holds another type, or does not declare `T`'s type.
    ///
    /// The error names the requested type and what is actually stored.
    pub fn get_typed<T: FieldType>(&self, field: Field) -> Result<T, InventoryError> {
        let stored = self.values.get(&field);
        let mismatch = || InventoryError::TypeMismatch {
            field: field.key(),
            expected: T::KIND.label(),
            found: stored.map_or("nothing", |value| value.kind().label()),
        };

        if T::KIND != field.kind() {
            return Err(mismatch());
        }

        stored.and_then(T::extract).ok_or_else(mismatch)
    }

    /// Like [`Record::get_typed`] but treats an absent field as `None`.
    pub fn get_optional<T: FieldType>(&self, field: Field) -> Result<Option<T>, InventoryError> {
        if !self.values.contains_key(&field) {
            return Ok(None);
        }
        self.get_typed(field).map(Some)
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn remove(&mut self, field: Field) -> Option<FieldValue> {
        self.values.remove(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.values.iter().map(|(field, value)| (*field, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copies every field of `other` into this record, overwriting clashes.
    pub fn merge(&mut self, other: &Record) {
        for (field, value) in other.iter() {
            self.values.insert(field, value.clone());
        }
    }

    /// A record naming a dealership and nothing else.
    pub fn is_dealer_profile(&self) -> bool {
        self.contains(Field::DealershipId) && self.values.keys().all(|field| field.is_dealer_field())
    }

    pub fn error_reason(&self) -> Option<InventoryError> {
        self.get_typed(Field::ErrorReason).ok()
    }

    pub fn attach_error(&mut self, error: InventoryError) {
        self.values.insert(Field::ErrorReason, FieldValue::Failure(error));
    }

    pub fn clear_error(&mut self) {
        self.values.remove(&Field::ErrorReason);
    }
}
