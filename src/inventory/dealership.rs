use super::error::InventoryError;
use super::factory::create_from_record;
use super::record::{Field, Record};
use super::vehicle::{Vehicle, VehicleView};
use serde::Serialize;
use tracing::{debug, info};

/// The two disjoint partitions of a dealership's inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryChannel {
    Sales,
    Rental,
}

impl InventoryChannel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Rental => "rental",
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Sales => Self::Rental,
            Self::Rental => Self::Sales,
        }
    }
}

/// One location's inventory.
///
/// No vehicle id (compared case- and whitespace-insensitively) appears more
/// than once across the sales and rental sub-collections.
#[derive(Debug)]
pub struct Dealership {
    dealer_id: String,
    name: String,
    accepting_vehicles: bool,
    renting_vehicles: bool,
    sales: Vec<Vehicle>,
    rental: Vec<Vehicle>,
}

impl Dealership {
    pub fn new(dealer_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            dealer_id: dealer_id.into(),
            name: name.into(),
            accepting_vehicles: true,
            renting_vehicles: false,
            sales: Vec::new(),
            rental: Vec::new(),
        }
    }

    pub fn dealer_id(&self) -> &str {
        &self.dealer_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_accepting_vehicles(&self) -> bool {
        self.accepting_vehicles
    }

    pub fn is_renting_vehicles(&self) -> bool {
        self.renting_vehicles
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_accepting_vehicles(&mut self, accepting: bool) {
        self.accepting_vehicles = accepting;
    }

    pub fn set_renting_vehicles(&mut self, renting: bool) {
        self.renting_vehicles = renting;
    }

    pub fn sales_vehicles(&self) -> &[Vehicle] {
        &self.sales
    }

    pub fn rental_vehicles(&self) -> &[Vehicle] {
        &self.rental
    }

    /// Sales first, then rental.
    pub fn inventory(&self) -> impl Iterator<Item = &Vehicle> {
        self.sales.iter().chain(self.rental.iter())
    }

    pub fn inventory_len(&self) -> usize {
        self.sales.len() + self.rental.len()
    }

    pub fn locate(&self, vehicle_id: &str) -> Option<InventoryChannel> {
        self.find_slot(vehicle_id).map(|(channel, _)| channel)
    }

    pub fn contains_vehicle_id(&self, vehicle_id: &str) -> bool {
        self.locate(vehicle_id).is_some()
    }

    pub fn vehicle(&self, vehicle_id: &str) -> Result<&Vehicle, InventoryError> {
        self.inventory()
            .find(|vehicle| vehicle.matches_id(vehicle_id))
            .ok_or_else(|| self.not_found(vehicle_id))
    }

    pub fn sales_vehicle(&self, vehicle_id: &str) -> Result<&Vehicle, InventoryError> {
        self.sales
            .iter()
            .find(|vehicle| vehicle.matches_id(vehicle_id))
            .ok_or_else(|| self.not_found(vehicle_id))
    }

    pub fn rental_vehicle(&self, vehicle_id: &str) -> Result<&Vehicle, InventoryError> {
        self.rental
            .iter()
            .find(|vehicle| vehicle.matches_id(vehicle_id))
            .ok_or_else(|| self.not_found(vehicle_id))
    }

    /// Admits a vehicle; rentable vehicles land in rental, all others in sales.
    ///
    /// A rentable vehicle is refused with `DealershipNotRenting` unless this
    /// dealership offers rentals.
    pub fn add_incoming_vehicle(
        &mut self,
        vehicle: Vehicle,
    ) -> Result<InventoryChannel, InventoryError> {
        self.check_incoming(&vehicle)?;
        Ok(self.place(vehicle))
    }

    pub(crate) fn check_incoming(&self, vehicle: &Vehicle) -> Result<(), InventoryError> {
        if !self.accepting_vehicles {
            return Err(InventoryError::NotAcceptingVehicles {
                dealer_id: self.dealer_id.clone(),
                vehicle_id: vehicle.id().to_string(),
            });
        }

        if let Some(channel) = self.locate(vehicle.id()) {
            return Err(self.already_exists(vehicle.id(), channel));
        }

        // A rentable vehicle can only be held in rental.
        if vehicle.is_rentable() && !self.renting_vehicles {
            return Err(InventoryError::DealershipNotRenting(self.dealer_id.clone()));
        }

        Ok(())
    }

    pub(crate) fn place(&mut self, vehicle: Vehicle) -> InventoryChannel {
        let channel = if vehicle.is_rentable() {
            InventoryChannel::Rental
        } else {
            InventoryChannel::Sales
        };
        debug!(
            dealer_id = %self.dealer_id,
            vehicle_id = vehicle.id(),
            channel = channel.label(),
            "vehicle placed"
        );
        self.collection_mut(channel).push(vehicle);
        channel
    }

    /// Removing an absent vehicle is a no-op and returns `None`.
    pub fn remove_from_inventory(
        &mut self,
        vehicle_id: &str,
    ) -> Result<Option<Vehicle>, InventoryError> {
        if vehicle_id.trim().is_empty() {
            return Err(InventoryError::InvalidArgument(
                "vehicle id to remove is blank".to_string(),
            ));
        }

        Ok(self.take_vehicle(vehicle_id).map(|(_, vehicle)| vehicle))
    }

    pub(crate) fn take_vehicle(&mut self, vehicle_id: &str) -> Option<(InventoryChannel, Vehicle)> {
        let (channel, index) = self.find_slot(vehicle_id)?;
        Some((channel, self.collection_mut(channel).remove(index)))
    }

    pub(crate) fn restore_vehicle(&mut self, channel: InventoryChannel, vehicle: Vehicle) {
        self.collection_mut(channel).push(vehicle);
    }

    /// Toggles rentability and moves the vehicle to the opposite sub-collection.
    ///
    /// The policy is consulted before anything moves, so a refused toggle
    /// leaves the vehicle where it was.
    pub fn update_vehicle_rental(
        &mut self,
        vehicle_id: &str,
    ) -> Result<InventoryChannel, InventoryError> {
        let (current, index) = self
            .find_slot(vehicle_id)
            .ok_or_else(|| self.not_found(vehicle_id))?;

        let collection = self.collection_mut(current);
        let rentable = collection[index].toggle_rental()?;

        let vehicle = collection.remove(index);
        let target = current.opposite();
        info!(
            dealer_id = %self.dealer_id,
            vehicle_id = vehicle.id(),
            rentable,
            channel = target.label(),
            "vehicle rental status updated"
        );
        self.collection_mut(target).push(vehicle);
        Ok(target)
    }

    pub fn add_rental_vehicle(&mut self, vehicle: Vehicle) -> Result<(), InventoryError> {
        if !self.renting_vehicles {
            return Err(InventoryError::DealershipNotRenting(self.dealer_id.clone()));
        }

        if !vehicle.is_rentable() {
            return Err(InventoryError::VehicleNotRentable {
                vehicle_id: vehicle.id().to_string(),
                detail: "vehicle is not currently marked rentable".to_string(),
            });
        }

        if let Some(channel) = self.locate(vehicle.id()) {
            return Err(self.already_exists(vehicle.id(), channel));
        }

        self.rental.push(vehicle);
        Ok(())
    }

    /// Single-record variant; failures propagate to the caller.
    pub fn manual_vehicle_add(&mut self, record: &Record) -> Result<InventoryChannel, InventoryError> {
        let vehicle = create_from_record(record)?;
        self.add_incoming_vehicle(vehicle)
    }

    /// Batch entry point: on failure the reason is attached to `record`.
    pub fn data_to_inventory(&mut self, record: &mut Record) -> bool {
        match self.manual_vehicle_add(record) {
            Ok(_) => true,
            Err(error) => {
                debug!(dealer_id = %self.dealer_id, %error, "record rejected");
                record.attach_error(error);
                false
            }
        }
    }

    pub fn dealer_record(&self) -> Record {
        Record::new()
            .with(Field::DealershipId, self.dealer_id.as_str())
            .with(Field::DealershipName, self.name.as_str())
            .with(Field::DealershipReceivingStatus, self.accepting_vehicles)
            .with(Field::DealershipRentingStatus, self.renting_vehicles)
    }

    /// One record per vehicle, each carrying the dealership's own fields.
    pub fn calc_data_map(&self) -> Vec<Record> {
        let dealer_record = self.dealer_record();
        self.inventory()
            .map(|vehicle| {
                let mut record = vehicle.to_record();
                record.merge(&dealer_record);
                record
            })
            .collect()
    }

    pub fn summary(&self) -> DealershipSummary {
        DealershipSummary {
            dealer_id: self.dealer_id.clone(),
            name: self.name.clone(),
            accepting_vehicles: self.accepting_vehicles,
            renting_vehicles: self.renting_vehicles,
            sales_count: self.sales.len(),
            rental_count: self.rental.len(),
        }
    }

    pub fn vehicle_views(&self) -> Vec<(InventoryChannel, VehicleView)> {
        self.sales
            .iter()
            .map(|vehicle| (InventoryChannel::Sales, vehicle.view()))
            .chain(
                self.rental
                    .iter()
                    .map(|vehicle| (InventoryChannel::Rental, vehicle.view())),
            )
            .collect()
    }

    fn find_slot(&self, vehicle_id: &str) -> Option<(InventoryChannel, usize)> {
        [
            (InventoryChannel::Sales, &self.sales),
            (InventoryChannel::Rental, &self.rental),
        ]
        .into_iter()
        .find_map(|(channel, collection)| {
            collection
                .iter()
                .position(|vehicle| vehicle.matches_id(vehicle_id))
                .map(|index| (channel, index))
        })
    }

    fn collection_mut(&mut self, channel: InventoryChannel) -> &mut Vec<Vehicle> {
        match channel {
            InventoryChannel::Sales => &mut self.sales,
            InventoryChannel::Rental => &mut self.rental,
        }
    }

    fn not_found(&self, vehicle_id: &str) -> InventoryError {
        InventoryError::VehicleNotFound {
            vehicle_id: vehicle_id.to_string(),
            dealer_id: self.dealer_id.clone(),
        }
    }

    fn already_exists(&self, vehicle_id: &str, channel: InventoryChannel) -> InventoryError {
        InventoryError::VehicleAlreadyExists {
            vehicle_id: vehicle_id.to_string(),
            dealer_id: self.dealer_id.clone(),
            location: channel.label(),
        }
    }
}

/// Profile row for a dealership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealershipSummary {
    pub dealer_id: String,
    pub name: String,
    pub accepting_vehicles: bool,
    pub renting_vehicles: bool,
    pub sales_count: usize,
    pub rental_count: usize,
}
