//! Records that failed ingestion, kept for correction within one run.

use super::company::{routing_dealer_id, Company};
use super::dealership::InventoryChannel;
use super::error::InventoryError;
use super::record::{Field, FieldValue, Record, ValueKind};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Stable identifier of a queued reject; never reused within a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RejectHandle(pub u64);

impl fmt::Display for RejectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Accepts both `#3` and `3`.
impl FromStr for RejectHandle {
    type Err = InventoryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        trimmed
            .strip_prefix('#')
            .unwrap_or(trimmed)
            .parse::<u64>()
            .map(RejectHandle)
            .map_err(|_| InventoryError::InvalidArgument(format!("'{raw}' is not a reject handle")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub handle: RejectHandle,
    pub record: Record,
}

impl RejectedRecord {
    pub fn reason(&self) -> Option<InventoryError> {
        self.record.error_reason()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResubmitSummary {
    pub applied: usize,
    pub still_rejected: usize,
}

#[derive(Debug, Default)]
pub struct RejectQueue {
    entries: Vec<RejectedRecord>,
    next_handle: u64,
}

impl RejectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) -> RejectHandle {
        self.next_handle += 1;
        let handle = RejectHandle(self.next_handle);
        debug!(%handle, reason = ?record.error_reason().map(|error| error.code()), "reject queued");
        self.entries.push(RejectedRecord { handle, record });
        handle
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) -> Vec<RejectHandle> {
        records.into_iter().map(|record| self.push(record)).collect()
    }

    pub fn get(&self, handle: RejectHandle) -> Option<&RejectedRecord> {
        self.entries.iter().find(|entry| entry.handle == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RejectedRecord> {
        self.entries.iter()
    }

    pub fn handles(&self) -> Vec<RejectHandle> {
        self.entries.iter().map(|entry| entry.handle).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn discard(&mut self, handle: RejectHandle) -> Option<Record> {
        let index = self.index_of(handle).ok()?;
        Some(self.entries.remove(index).record)
    }

    /// Replaces one field of a queued record with a well-typed value.
    pub fn edit(
        &mut self,
        handle: RejectHandle,
        field: Field,
        value: impl Into<FieldValue>,
    ) -> Result<(), InventoryError> {
        if field == Field::ErrorReason {
            return Err(InventoryError::InvalidArgument(
                "error_reason cannot be edited".to_string(),
            ));
        }

        let value = value.into();
        if value.kind() != field.kind() {
            return Err(InventoryError::TypeMismatch {
                field: field.key(),
                expected: field.kind().label(),
                found: value.kind().label(),
            });
        }

        let index = self.index_of(handle)?;
        self.entries[index].record.put_valid(field, value);
        Ok(())
    }

    /// Parses operator text into the field's kind; blank text clears the
    /// field. The record is left unchanged when parsing fails.
    pub fn edit_from_text(
        &mut self,
        handle: RejectHandle,
        field: Field,
        raw: &str,
    ) -> Result<(), InventoryError> {
        let index = self.index_of(handle)?;
        let trimmed = raw.trim();

        if trimmed.is_empty() && field != Field::ErrorReason {
            self.entries[index].record.remove(field);
            return Ok(());
        }

        let value = parse_text(field, trimmed)?;
        self.edit(handle, field, value)
    }

    /// Runs the completeness pre-filter, then the validated add path.
    ///
    /// Success removes the entry; failure stores the new reason and keeps it
    /// queued.
    pub fn resubmit(
        &mut self,
        handle: RejectHandle,
        company: &mut Company,
    ) -> Result<InventoryChannel, InventoryError> {
        let index = self.index_of(handle)?;

        let outcome = prepare_resubmission(&self.entries[index].record).and_then(|record| {
            let dealer_id = routing_dealer_id(&record)?;
            company.manual_vehicle_add(&record, &dealer_id)
        });

        match outcome {
            Ok(channel) => {
                self.entries.remove(index);
                info!(%handle, channel = channel.label(), "reject resubmitted");
                Ok(channel)
            }
            Err(error) => {
                debug!(%handle, code = error.code(), "resubmission still rejected");
                self.entries[index].record.attach_error(error.clone());
                Err(error)
            }
        }
    }

    pub fn resubmit_all(&mut self, company: &mut Company) -> ResubmitSummary {
        let mut summary = ResubmitSummary::default();
        for handle in self.handles() {
            match self.resubmit(handle, company) {
                Ok(_) => summary.applied += 1,
                Err(_) => summary.still_rejected += 1,
            }
        }
        summary
    }

    fn index_of(&self, handle: RejectHandle) -> Result<usize, InventoryError> {
        self.entries
            .iter()
            .position(|entry| entry.handle == handle)
            .ok_or_else(|| InventoryError::InvalidArgument(format!("no rejected record {handle}")))
    }
}

/// Completeness pre-filter: dealership id, vehicle id, model and price must
/// be non-empty and the price must read as a whole number.
pub fn check_completeness(record: &Record) -> Result<(), InventoryError> {
    let required = [
        Field::DealershipId,
        Field::VehicleId,
        Field::VehicleModel,
        Field::Price,
    ];

    let missing: Vec<&str> = required
        .into_iter()
        .filter(|field| {
            record
                .get(*field)
                .map_or(true, |value| value.display_text().trim().is_empty())
        })
        .map(Field::key)
        .collect();

    if !missing.is_empty() {
        return Err(InventoryError::MissingCriticalInfo(format!(
            "required fields are empty: {}",
            missing.join(", ")
        )));
    }

    match record.get(Field::Price) {
        Some(FieldValue::Long(_)) => Ok(()),
        Some(FieldValue::Text(raw)) if raw.trim().parse::<i64>().is_ok() => Ok(()),
        _ => Err(InventoryError::MissingCriticalInfo(
            "price must be a whole number".to_string(),
        )),
    }
}

fn prepare_resubmission(record: &Record) -> Result<Record, InventoryError> {
    check_completeness(record)?;

    let mut prepared = record.clone();
    prepared.clear_error();
    if let Some(FieldValue::Text(raw)) = record.get(Field::Price) {
        if let Ok(price) = raw.trim().parse::<i64>() {
            prepared.put_valid(Field::Price, price);
        }
    }
    Ok(prepared)
}

fn parse_text(field: Field, raw: &str) -> Result<FieldValue, InventoryError> {
    let invalid = || InventoryError::TypeMismatch {
        field: field.key(),
        expected: field.kind().label(),
        found: "text",
    };

    match field.kind() {
        ValueKind::Text => Ok(FieldValue::Text(raw.to_string())),
        ValueKind::Long => raw.parse::<i64>().map(FieldValue::Long).map_err(|_| invalid()),
        ValueKind::Bool => parse_flag(raw).map(FieldValue::Bool).ok_or_else(invalid),
        ValueKind::Failure => Err(InventoryError::InvalidArgument(
            "error_reason cannot be edited".to_string(),
        )),
    }
}

pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}
