//! Application context: the single owner of inventory state for one run.

use crate::config::StorageConfig;
use crate::error::AppError;
use crate::inventory::company::routing_dealer_id;
use crate::inventory::{
    create_from_record, Company, Dealership, Field, InventoryChannel, InventoryError, Record,
    RejectHandle, RejectQueue, ResubmitSummary, TransferMode,
};
use crate::storage::{open_reader, open_writer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of reading a batch of records into the company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub read: usize,
    pub applied: usize,
    pub rejected: Vec<RejectHandle>,
}

/// Owns the company, the reject queue and the persistence target.
///
/// Every successful mutation rewrites the whole inventory file. A failed
/// write is returned to the caller; the in-memory change stays applied.
#[derive(Debug)]
pub struct InventoryContext {
    company: Company,
    rejects: RejectQueue,
    inventory_path: PathBuf,
    transfer_mode: TransferMode,
}

impl InventoryContext {
    pub fn new(inventory_path: impl Into<PathBuf>, transfer_mode: TransferMode) -> Self {
        Self {
            company: Company::new(),
            rejects: RejectQueue::new(),
            inventory_path: inventory_path.into(),
            transfer_mode,
        }
    }

    /// Builds the context and restores any inventory already on disk.
    pub fn open(config: &StorageConfig) -> Result<Self, AppError> {
        let mut context = Self::new(config.inventory_path.clone(), config.transfer_mode);
        context.load()?;
        Ok(context)
    }

    /// A missing file is a first run and leaves the company empty.
    pub fn load(&mut self) -> Result<ImportOutcome, AppError> {
        if !self.inventory_path.exists() {
            info!(
                path = %self.inventory_path.display(),
                "no saved inventory found; starting empty"
            );
            return Ok(ImportOutcome {
                read: 0,
                applied: 0,
                rejected: Vec::new(),
            });
        }

        let records = open_reader(&self.inventory_path)?.read_inventory()?;
        let read = records
            .iter()
            .filter(|record| !record.is_dealer_profile())
            .count();
        let rejects = self.company.restore_from_records(records);
        let outcome = self.queue_rejects(read, rejects);
        info!(
            path = %self.inventory_path.display(),
            dealerships = self.company.len(),
            vehicles = outcome.applied,
            rejected = outcome.rejected.len(),
            "inventory restored"
        );
        Ok(outcome)
    }

    pub fn company(&self) -> &Company {
        &self.company
    }

    pub fn rejects(&self) -> &RejectQueue {
        &self.rejects
    }

    pub fn inventory_path(&self) -> &Path {
        &self.inventory_path
    }

    pub fn transfer_mode(&self) -> TransferMode {
        self.transfer_mode
    }

    pub fn persist(&self) -> Result<(), AppError> {
        let records = self.company.calc_data_map();
        let result = open_writer(&self.inventory_path)
            .and_then(|writer| writer.write_inventory(&records));

        if let Err(err) = &result {
            warn!(
                path = %self.inventory_path.display(),
                %err,
                "inventory could not be saved; in-memory changes are kept"
            );
        }
        result.map_err(AppError::from)
    }

    /// Reads a file into existing dealerships; failures join the reject queue.
    ///
    /// Profile records carry no vehicle and are skipped.
    pub fn import(&mut self, path: &Path) -> Result<ImportOutcome, AppError> {
        let mut records = open_reader(path)?.read_inventory()?;
        let total = records.len();
        records.retain(|record| !record.is_dealer_profile());
        if records.len() < total {
            debug!(
                path = %path.display(),
                skipped = total - records.len(),
                "dealership profile records skipped on import"
            );
        }
        let read = records.len();
        let rejects = self.company.data_to_inventory(records);
        let outcome = self.queue_rejects(read, rejects);
        self.persist()?;
        Ok(outcome)
    }

    pub fn export(&self, path: &Path) -> Result<usize, AppError> {
        let records = self.company.calc_data_map();
        open_writer(path)?.write_inventory(&records)?;
        info!(path = %path.display(), records = records.len(), "inventory exported");
        Ok(records.len())
    }

    pub fn add_dealership(&mut self, dealer_id: &str, name: &str) -> Result<(), AppError> {
        let dealer_id = dealer_id.trim();
        if dealer_id.is_empty() {
            return Err(InventoryError::InvalidArgument("dealership id is blank".to_string()).into());
        }

        self.company
            .add_dealership(Dealership::new(dealer_id, name.trim()));
        info!(dealer_id, "dealership added");
        self.persist()
    }

    pub fn rename_dealership(&mut self, dealer_id: &str, name: &str) -> Result<(), AppError> {
        self.company.dealership_mut(dealer_id)?.rename(name.trim());
        self.persist()
    }

    pub fn set_receiving(&mut self, dealer_id: &str, accepting: bool) -> Result<(), AppError> {
        self.company
            .dealership_mut(dealer_id)?
            .set_accepting_vehicles(accepting);
        info!(dealer_id, accepting, "receiving status updated");
        self.persist()
    }

    pub fn set_renting(&mut self, dealer_id: &str, renting: bool) -> Result<(), AppError> {
        self.company
            .dealership_mut(dealer_id)?
            .set_renting_vehicles(renting);
        info!(dealer_id, renting, "rental service status updated");
        self.persist()
    }

    /// Single manual entry; the record names its own dealership.
    pub fn manual_vehicle_add(&mut self, record: &Record) -> Result<InventoryChannel, AppError> {
        let dealer_id = routing_dealer_id(record)?;
        let channel = self.company.manual_vehicle_add(record, &dealer_id)?;
        self.persist()?;
        Ok(channel)
    }

    /// Returns whether a vehicle was actually removed.
    pub fn remove_vehicle(&mut self, dealer_id: &str, vehicle_id: &str) -> Result<bool, AppError> {
        let removed = self
            .company
            .dealership_mut(dealer_id)?
            .remove_from_inventory(vehicle_id)?;

        match removed {
            Some(vehicle) => {
                info!(dealer_id, vehicle_id = vehicle.id(), "vehicle removed");
                self.persist()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn toggle_rental(
        &mut self,
        dealer_id: &str,
        vehicle_id: &str,
    ) -> Result<InventoryChannel, AppError> {
        let channel = self
            .company
            .dealership_mut(dealer_id)?
            .update_vehicle_rental(vehicle_id)?;
        self.persist()?;
        Ok(channel)
    }

    /// Builds a vehicle from `record`, marks it rentable and adds it straight
    /// to the dealership's rental inventory.
    pub fn add_rental_vehicle(&mut self, dealer_id: &str, record: &Record) -> Result<(), AppError> {
        let dealership = self.company.dealership_mut(dealer_id)?;
        let mut vehicle = create_from_record(record)?;
        vehicle.set_rentable(true)?;
        dealership.add_rental_vehicle(vehicle)?;
        self.persist()
    }

    /// The inventory is saved whatever the outcome, since a refused transfer
    /// may already have taken the vehicle out of the sender.
    pub fn transfer_vehicle(
        &mut self,
        sender_id: &str,
        receiver_id: &str,
        vehicle_id: &str,
    ) -> Result<InventoryChannel, AppError> {
        let outcome =
            self.company
                .transfer_vehicle(sender_id, receiver_id, vehicle_id, self.transfer_mode);
        let saved = self.persist();

        match (outcome, saved) {
            (Ok(channel), Ok(())) => Ok(channel),
            (Err(error), Ok(())) => Err(error.into()),
            (Ok(_), Err(err)) => Err(err),
            (Err(error), Err(err)) => {
                warn!(%error, "transfer failed before the inventory save also failed");
                Err(err)
            }
        }
    }

    pub fn edit_reject(
        &mut self,
        handle: RejectHandle,
        field: Field,
        raw: &str,
    ) -> Result<(), AppError> {
        self.rejects.edit_from_text(handle, field, raw)?;
        Ok(())
    }

    pub fn discard_reject(&mut self, handle: RejectHandle) -> Option<Record> {
        self.rejects.discard(handle)
    }

    pub fn resubmit_reject(&mut self, handle: RejectHandle) -> Result<InventoryChannel, AppError> {
        let channel = self.rejects.resubmit(handle, &mut self.company)?;
        self.persist()?;
        Ok(channel)
    }

    pub fn resubmit_all_rejects(&mut self) -> Result<ResubmitSummary, AppError> {
        let summary = self.rejects.resubmit_all(&mut self.company);
        if summary.applied > 0 {
            self.persist()?;
        }
        Ok(summary)
    }

    fn queue_rejects(&mut self, read: usize, rejects: Vec<Record>) -> ImportOutcome {
        let applied = read - rejects.len();
        for reject in &rejects {
            if let Some(reason) = reject.error_reason() {
                warn!(code = reason.code(), %reason, "record rejected");
            }
        }
        let rejected = self.rejects.extend(rejects);
        ImportOutcome {
            read,
            applied,
            rejected,
        }
    }
}
