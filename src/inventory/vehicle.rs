use super::error::InventoryError;
use super::record::{Field, Record};
use super::rental::{FixedRentalPolicy, RentalPolicy, ToggleRentalPolicy};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    Suv,
    Sedan,
    Pickup,
    SportsCar,
}

impl VehicleCategory {
    pub const fn ordered() -> [Self; 4] {
        [Self::Suv, Self::Sedan, Self::Pickup, Self::SportsCar]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Suv => "SUV",
            Self::Sedan => "Sedan",
            Self::Pickup => "Pickup",
            Self::SportsCar => "Sports Car",
        }
    }

    /// Case-insensitive; `-`, `_` and runs of whitespace all count as one space.
    pub fn parse(raw: &str) -> Result<Self, InventoryError> {
        let normalized = raw
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        match normalized.as_str() {
            "suv" => Ok(Self::Suv),
            "sedan" => Ok(Self::Sedan),
            "pickup" => Ok(Self::Pickup),
            "sports car" | "sportscar" => Ok(Self::SportsCar),
            _ => Err(InventoryError::InvalidVehicleType(format!(
                "{raw} is not a valid vehicle type"
            ))),
        }
    }

    pub fn rental_policy(self) -> Box<dyn RentalPolicy> {
        match self {
            Self::SportsCar => Box::new(FixedRentalPolicy),
            Self::Suv | Self::Sedan | Self::Pickup => Box::new(ToggleRentalPolicy::default()),
        }
    }
}

/// Whitespace-free, lowercased form used for every id comparison.
pub fn normalize_vehicle_id(raw: &str) -> String {
    raw.split_whitespace().collect::<String>().to_lowercase()
}

/// One physical unit held by a dealership.
#[derive(Debug)]
pub struct Vehicle {
    id: String,
    category: VehicleCategory,
    manufacturer: Option<String>,
    model: String,
    price: i64,
    price_unit: Option<String>,
    acquisition_date: Option<i64>,
    policy: Box<dyn RentalPolicy>,
}

impl Vehicle {
    pub fn new(
        id: impl Into<String>,
        category: VehicleCategory,
        model: impl Into<String>,
        price: i64,
    ) -> Result<Self, InventoryError> {
        let id = id.into();
        let model = model.into();

        if id.trim().is_empty() {
            return Err(InventoryError::MissingCriticalInfo(
                "vehicle id is blank".to_string(),
            ));
        }
        if model.trim().is_empty() {
            return Err(InventoryError::MissingCriticalInfo(format!(
                "vehicle {id} has no model"
            )));
        }
        if price <= 0 {
            return Err(InventoryError::InvalidPrice(format!(
                "price {price} of vehicle {id} must be greater than zero"
            )));
        }

        Ok(Self {
            id,
            category,
            manufacturer: None,
            model,
            price,
            price_unit: None,
            acquisition_date: None,
            policy: category.rental_policy(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> VehicleCategory {
        self.category
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn price_unit(&self) -> Option<&str> {
        self.price_unit.as_deref()
    }

    pub fn acquisition_date(&self) -> Option<i64> {
        self.acquisition_date
    }

    pub fn is_rentable(&self) -> bool {
        self.policy.is_rentable()
    }

    pub fn set_manufacturer(&mut self, manufacturer: Option<String>) {
        self.manufacturer = manufacturer;
    }

    pub fn set_price_unit(&mut self, price_unit: Option<String>) {
        self.price_unit = price_unit;
    }

    pub fn set_acquisition_date(&mut self, acquisition_date: Option<i64>) {
        self.acquisition_date = acquisition_date;
    }

    /// Routes the change through the rental policy; a no-op when unchanged.
    pub fn set_rentable(&mut self, rentable: bool) -> Result<(), InventoryError> {
        if rentable == self.policy.is_rentable() {
            return Ok(());
        }

        self.policy
            .update_to(rentable)
            .map_err(|refusal| InventoryError::VehicleNotRentable {
                vehicle_id: self.id.clone(),
                detail: refusal.reason.to_string(),
            })
    }

    /// Flips the rentable flag and returns the new state.
    pub fn toggle_rental(&mut self) -> Result<bool, InventoryError> {
        let target = !self.is_rentable();
        self.set_rentable(target)?;
        Ok(target)
    }

    pub fn matches_id(&self, other: &str) -> bool {
        normalize_vehicle_id(&self.id) == normalize_vehicle_id(other)
    }

    /// `MM/dd/yyyy` in UTC, or an empty string when no date is known.
    pub fn formatted_acquisition_date(&self) -> String {
        self.acquisition_date
            .and_then(DateTime::from_timestamp_millis)
            .map(|date| date.format("%m/%d/%Y").to_string())
            .unwrap_or_default()
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new()
            .with(Field::VehicleId, self.id.as_str())
            .with(Field::VehicleType, self.category.label())
            .with(Field::VehicleModel, self.model.as_str())
            .with(Field::Price, self.price)
            .with(Field::VehicleRentalStatus, self.is_rentable());
        record.put_valid_opt(Field::VehicleManufacturer, self.manufacturer.clone());
        record.put_valid_opt(Field::PriceUnit, self.price_unit.clone());
        record.put_valid_opt(Field::AcquisitionDate, self.acquisition_date);
        record
    }

    pub fn view(&self) -> VehicleView {
        VehicleView {
            id: self.id.clone(),
            category: self.category,
            category_label: self.category.label().to_string(),
            manufacturer: self.manufacturer.clone(),
            model: self.model.clone(),
            price: self.price,
            price_unit: self.price_unit.clone(),
            acquired_on: Some(self.formatted_acquisition_date()).filter(|date| !date.is_empty()),
            rentable: self.is_rentable(),
        }
    }
}

/// Display-ready snapshot of a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleView {
    pub id: String,
    pub category: VehicleCategory,
    pub category_label: String,
    pub manufacturer: Option<String>,
    pub model: String,
    pub price: i64,
    pub price_unit: Option<String>,
    pub acquired_on: Option<String>,
    pub rentable: bool,
}
