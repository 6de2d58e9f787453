use super::dealership::{Dealership, DealershipSummary, InventoryChannel};
use super::error::InventoryError;
use super::record::{Field, Record};
use std::collections::HashMap;
use tracing::{info, warn};

/// Registry of every dealership, in insertion order.
#[derive(Debug, Default)]
pub struct Company {
    dealerships: Vec<Dealership>,
}

impl Company {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends without checking ids; lookups resolve to the first match.
    pub fn add_dealership(&mut self, dealership: Dealership) {
        if self.find_dealership(dealership.dealer_id()).is_some() {
            warn!(
                dealer_id = dealership.dealer_id(),
                "dealership id already registered; lookups keep resolving to the first entry"
            );
        }
        self.dealerships.push(dealership);
    }

    pub fn dealerships(&self) -> &[Dealership] {
        &self.dealerships
    }

    pub fn len(&self) -> usize {
        self.dealerships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dealerships.is_empty()
    }

    pub fn find_dealership(&self, dealer_id: &str) -> Option<&Dealership> {
        self.position(dealer_id).map(|index| &self.dealerships[index])
    }

    pub fn find_dealership_mut(&mut self, dealer_id: &str) -> Option<&mut Dealership> {
        match self.position(dealer_id) {
            Some(index) => Some(&mut self.dealerships[index]),
            None => None,
        }
    }

    pub fn dealership(&self, dealer_id: &str) -> Result<&Dealership, InventoryError> {
        self.find_dealership(dealer_id)
            .ok_or_else(|| InventoryError::DealershipNotFound(dealer_id.to_string()))
    }

    pub fn dealership_mut(&mut self, dealer_id: &str) -> Result<&mut Dealership, InventoryError> {
        self.find_dealership_mut(dealer_id)
            .ok_or_else(|| InventoryError::DealershipNotFound(dealer_id.to_string()))
    }

    /// Index of the first dealership whose id equals `dealer_id` exactly.
    pub(crate) fn position(&self, dealer_id: &str) -> Option<usize> {
        self.dealerships
            .iter()
            .position(|dealership| dealership.dealer_id() == dealer_id)
    }

    pub(crate) fn require_position(&self, dealer_id: &str) -> Result<usize, InventoryError> {
        self.position(dealer_id)
            .ok_or_else(|| InventoryError::DealershipNotFound(dealer_id.to_string()))
    }

    pub(crate) fn dealership_at_mut(&mut self, index: usize) -> &mut Dealership {
        &mut self.dealerships[index]
    }

    pub fn dealership_ids(&self) -> Vec<String> {
        self.dealerships
            .iter()
            .map(|dealership| dealership.dealer_id().to_string())
            .collect()
    }

    pub fn renting_dealership_ids(&self) -> Vec<String> {
        self.dealerships
            .iter()
            .filter(|dealership| dealership.is_renting_vehicles())
            .map(|dealership| dealership.dealer_id().to_string())
            .collect()
    }

    pub fn is_dealership_renting_enabled(&self, dealer_id: &str) -> Result<bool, InventoryError> {
        self.dealership(dealer_id)
            .map(Dealership::is_renting_vehicles)
    }

    pub fn summaries(&self) -> Vec<DealershipSummary> {
        self.dealerships.iter().map(Dealership::summary).collect()
    }

    /// Every vehicle of every dealership as a record.
    ///
    /// A dealership without vehicles is written as a single profile record
    /// (dealership fields only) so it survives a reload.
    pub fn calc_data_map(&self) -> Vec<Record> {
        self.dealerships
            .iter()
            .flat_map(|dealership| {
                let records = dealership.calc_data_map();
                if records.is_empty() {
                    vec![dealership.dealer_record()]
                } else {
                    records
                }
            })
            .collect()
    }

    /// Routes each record to its dealership and returns the rejects.
    ///
    /// One bad record never aborts the batch. Records arriving with an
    /// `error_reason` already set are rejected untouched.
    pub fn data_to_inventory(&mut self, records: Vec<Record>) -> Vec<Record> {
        let total = records.len();
        let mut rejects = Vec::new();

        for mut record in records {
            if record.error_reason().is_some() {
                rejects.push(record);
                continue;
            }

            let dealer_id = match routing_dealer_id(&record) {
                Ok(dealer_id) => dealer_id,
                Err(error) => {
                    record.attach_error(error);
                    rejects.push(record);
                    continue;
                }
            };

            match self.find_dealership_mut(&dealer_id) {
                Some(dealership) => {
                    if !dealership.data_to_inventory(&mut record) {
                        rejects.push(record);
                    }
                }
                None => {
                    record.attach_error(InventoryError::DealershipNotFound(dealer_id));
                    rejects.push(record);
                }
            }
        }

        info!(
            records = total,
            applied = total - rejects.len(),
            rejected = rejects.len(),
            "records ingested"
        );
        rejects
    }

    /// Rebuilds dealerships and inventory from persisted records.
    ///
    /// Dealerships are created on first sight, taking name and flags from
    /// that first record. Profile records only register their dealership.
    /// The renting flag is applied before any vehicle is routed and the
    /// receiving flag after, so a non-receiving dealership still gets its
    /// stock back.
    pub fn restore_from_records(&mut self, records: Vec<Record>) -> Vec<Record> {
        let mut receiving: HashMap<String, bool> = HashMap::new();
        let mut vehicles = Vec::with_capacity(records.len());

        for mut record in records {
            if record.error_reason().is_some() {
                vehicles.push(record);
                continue;
            }

            let dealer_id = match routing_dealer_id(&record) {
                Ok(dealer_id) => dealer_id,
                Err(error) => {
                    record.attach_error(error);
                    vehicles.push(record);
                    continue;
                }
            };

            if !receiving.contains_key(&dealer_id) {
                let accepting = record
                    .get_typed::<bool>(Field::DealershipReceivingStatus)
                    .unwrap_or(true);
                self.register_restored(&dealer_id, &record);
                receiving.insert(dealer_id, accepting);
            }

            if !record.is_dealer_profile() {
                vehicles.push(record);
            }
        }

        let rejects = self.data_to_inventory(vehicles);

        for (dealer_id, accepting) in receiving {
            if let Some(dealership) = self.find_dealership_mut(&dealer_id) {
                dealership.set_accepting_vehicles(accepting);
            }
        }

        rejects
    }

    fn register_restored(&mut self, dealer_id: &str, record: &Record) {
        let renting = record
            .get_typed::<bool>(Field::DealershipRentingStatus)
            .unwrap_or(false);

        if self.find_dealership(dealer_id).is_none() {
            let name = record
                .get_typed::<String>(Field::DealershipName)
                .unwrap_or_default();
            self.add_dealership(Dealership::new(dealer_id, name));
        }

        if let Some(dealership) = self.find_dealership_mut(dealer_id) {
            dealership.set_accepting_vehicles(true);
            dealership.set_renting_vehicles(renting);
        }
    }

    /// Single-record add to a named dealership; failures propagate.
    pub fn manual_vehicle_add(
        &mut self,
        record: &Record,
        dealer_id: &str,
    ) -> Result<InventoryChannel, InventoryError> {
        self.dealership_mut(dealer_id)?.manual_vehicle_add(record)
    }
}

/// The dealership id a record should be routed to.
pub fn routing_dealer_id(record: &Record) -> Result<String, InventoryError> {
    if !record.contains(Field::DealershipId) {
        return Err(InventoryError::MissingCriticalInfo(
            "dealership_id is missing".to_string(),
        ));
    }

    let dealer_id = record.get_typed::<String>(Field::DealershipId)?;
    let dealer_id = dealer_id.trim();
    if dealer_id.is_empty() {
        return Err(InventoryError::MissingCriticalInfo(
            "dealership_id is blank".to_string(),
        ));
    }

    Ok(dealer_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::record::FieldValue;

    fn vehicle_record(dealer: &str, id: &str, kind: &str) -> Record {
        Record::new()
            .with(Field::DealershipId, dealer)
            .with(Field::VehicleId, id)
            .with(Field::VehicleType, kind)
            .with(Field::VehicleModel, "Model")
            .with(Field::Price, 12_500_i64)
    }

    fn company_with(ids: &[&str]) -> Company {
        let mut company = Company::new();
        for id in ids {
            company.add_dealership(Dealership::new(*id, format!("Dealer {id}")));
        }
        company
    }

    #[test]
    fn batch_ingest_keeps_going_past_bad_records() {
        let mut company = company_with(&["D1"]);
        let rejects = company.data_to_inventory(vec![
            vehicle_record("D1", "V1", "suv"),
            vehicle_record("D1", "V1", "sedan"),
            vehicle_record("D1", "V2", "spaceship"),
            vehicle_record("D9", "V3", "suv"),
            vehicle_record("D1", "V4", "pickup"),
        ]);

        let dealership = company.dealership("D1").expect("D1 exists");
        assert_eq!(dealership.inventory_len(), 2);

        let reasons: Vec<_> = rejects
            .iter()
            .filter_map(Record::error_reason)
            .map(|error| error.code())
            .collect();
        assert_eq!(
            reasons,
            vec![
                "vehicle_already_exists",
                "invalid_vehicle_type",
                "dealership_not_found"
            ]
        );
    }

    #[test]
    fn dealer_id_problems_are_reported_per_record() {
        let mut company = company_with(&["D1"]);
        let mut missing = vehicle_record("D1", "V1", "suv");
        missing.remove(Field::DealershipId);
        let mut mistyped = vehicle_record("D1", "V2", "suv");
        mistyped.insert_raw(Field::DealershipId, FieldValue::Long(1));
        let blank = vehicle_record("  ", "V3", "suv");

        let rejects = company.data_to_inventory(vec![missing, mistyped, blank]);
        let codes: Vec<_> = rejects
            .iter()
            .filter_map(Record::error_reason)
            .map(|error| error.code())
            .collect();
        assert_eq!(
            codes,
            vec!["missing_critical_info", "type_mismatch", "missing_critical_info"]
        );
    }

    #[test]
    fn pre_failed_records_are_rejected_unchanged() {
        let mut company = company_with(&["D1"]);
        let mut record = vehicle_record("D1", "V1", "suv");
        record.attach_error(InventoryError::MissingCriticalInfo("upstream".to_string()));
        let before = record.clone();

        let rejects = company.data_to_inventory(vec![record]);
        assert_eq!(rejects, vec![before]);
        assert_eq!(company.dealership("D1").expect("D1").inventory_len(), 0);
    }

    #[test]
    fn duplicate_dealer_ids_resolve_to_the_first_entry() {
        let mut company = company_with(&["D1"]);
        company.add_dealership(Dealership::new("D1", "Shadow"));
        assert_eq!(company.len(), 2);
        assert_eq!(company.dealership("D1").expect("D1").name(), "Dealer D1");
    }

    #[test]
    fn renting_queries_reflect_flags() {
        let mut company = company_with(&["D1", "D2"]);
        company
            .dealership_mut("D2")
            .expect("D2")
            .set_renting_vehicles(true);

        assert_eq!(company.renting_dealership_ids(), vec!["D2".to_string()]);
        assert_eq!(company.is_dealership_renting_enabled("D1"), Ok(false));
        assert!(matches!(
            company.is_dealership_renting_enabled("D9"),
            Err(InventoryError::DealershipNotFound(_))
        ));
    }

    #[test]
    fn restore_creates_dealerships_and_applies_flags_last() {
        let mut company = Company::new();
        let first = vehicle_record("D2", "V1", "suv")
            .with(Field::DealershipName, "Uptown")
            .with(Field::DealershipReceivingStatus, false)
            .with(Field::DealershipRentingStatus, true);
        let second = vehicle_record("D2", "V2", "sedan").with(Field::VehicleRentalStatus, true);

        let rejects = company.restore_from_records(vec![first, second]);
        assert!(rejects.is_empty());

        let dealership = company.dealership("D2").expect("created");
        assert_eq!(dealership.name(), "Uptown");
        assert!(!dealership.is_accepting_vehicles());
        assert!(dealership.is_renting_vehicles());
        assert_eq!(dealership.sales_vehicles().len(), 1);
        assert_eq!(dealership.rental_vehicles().len(), 1);
    }

    #[test]
    fn empty_dealerships_are_kept_as_profile_records() {
        let mut company = company_with(&["D1", "D2"]);
        {
            let empty = company.dealership_mut("D2").expect("D2");
            empty.set_accepting_vehicles(false);
            empty.set_renting_vehicles(true);
        }
        assert!(company
            .data_to_inventory(vec![vehicle_record("D1", "V1", "suv")])
            .is_empty());

        let records = company.calc_data_map();
        assert_eq!(records.len(), 2);
        assert!(!records[0].is_dealer_profile());
        assert!(records[1].is_dealer_profile());

        let mut restored = Company::new();
        assert!(restored.restore_from_records(records).is_empty());
        assert_eq!(restored.dealership_ids(), vec!["D1".to_string(), "D2".to_string()]);
        let empty = restored.dealership("D2").expect("D2 restored");
        assert_eq!(empty.name(), "Dealer D2");
        assert!(!empty.is_accepting_vehicles());
        assert!(empty.is_renting_vehicles());
        assert_eq!(empty.inventory_len(), 0);
    }

    #[test]
    fn restored_rental_vehicle_needs_a_renting_dealership() {
        let mut company = Company::new();
        let rented = vehicle_record("D3", "V1", "suv")
            .with(Field::DealershipRentingStatus, false)
            .with(Field::VehicleRentalStatus, true);

        let rejects = company.restore_from_records(vec![rented]);
        assert_eq!(rejects.len(), 1);
        assert!(matches!(
            rejects[0].error_reason(),
            Some(InventoryError::DealershipNotRenting(_))
        ));
        assert!(company.find_dealership("D3").is_some());
    }

    #[test]
    fn lookup_requires_an_exact_id() {
        let company = company_with(&["D1"]);
        assert!(company.find_dealership("D1").is_some());
        assert!(company.find_dealership(" D1").is_none());
        assert!(company.find_dealership("d1").is_none());
    }

    #[test]
    fn company_data_map_spans_every_dealership() {
        let mut company = company_with(&["D1", "D2"]);
        let rejects = company.data_to_inventory(vec![
            vehicle_record("D1", "V1", "suv"),
            vehicle_record("D2", "V2", "sedan"),
        ]);
        assert!(rejects.is_empty());
        assert_eq!(company.calc_data_map().len(), 2);
    }

    #[test]
    fn manual_add_to_unknown_dealership_fails() {
        let mut company = company_with(&["D1"]);
        assert!(matches!(
            company.manual_vehicle_add(&vehicle_record("D9", "V1", "suv"), "D9"),
            Err(InventoryError::DealershipNotFound(_))
        ));
        assert_eq!(
            company.manual_vehicle_add(&vehicle_record("D1", "V1", "suv"), "D1"),
            Ok(InventoryChannel::Sales)
        );
    }
}
