//! Builds vehicles from records, collecting the first failure as a value.

use super::error::InventoryError;
use super::record::{Field, FieldType, FieldValue, Record};
use super::vehicle::{Vehicle, VehicleCategory};

/// Builds a [`Vehicle`] from a record without touching the record.
///
/// Category is resolved first, then id and model, then price. Optional
/// fields are copied only when present and well-typed.
pub fn create_from_record(record: &Record) -> Result<Vehicle, InventoryError> {
    let category = resolve_category(record)?;
    let id = required_text(record, Field::VehicleId)?;
    let model = required_text(record, Field::VehicleModel)?;
    let price = resolve_price(record)?;

    let mut vehicle = Vehicle::new(id, category, model, price)?;
    vehicle.set_manufacturer(optional(record, Field::VehicleManufacturer));
    vehicle.set_price_unit(optional(record, Field::PriceUnit));
    vehicle.set_acquisition_date(optional(record, Field::AcquisitionDate));

    if let Ok(Some(true)) = record.get_optional::<bool>(Field::VehicleRentalStatus) {
        vehicle.set_rentable(true)?;
    }

    Ok(vehicle)
}

fn resolve_category(record: &Record) -> Result<VehicleCategory, InventoryError> {
    match record.get(Field::VehicleType) {
        Some(FieldValue::Text(raw)) => VehicleCategory::parse(raw),
        Some(other) => Err(InventoryError::InvalidVehicleType(format!(
            "vehicle_type holds a {} value",
            other.kind().label()
        ))),
        None => Err(InventoryError::InvalidVehicleType(
            "no vehicle type given".to_string(),
        )),
    }
}

fn required_text(record: &Record, field: Field) -> Result<String, InventoryError> {
    match record.get_typed::<String>(field) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(InventoryError::MissingCriticalInfo(format!(
            "{} is blank",
            field.key()
        ))),
        Err(_) => Err(InventoryError::MissingCriticalInfo(format!(
            "{} is missing",
            field.key()
        ))),
    }
}

fn resolve_price(record: &Record) -> Result<i64, InventoryError> {
    match record.get_optional::<i64>(Field::Price) {
        Ok(Some(price)) if price > 0 => Ok(price),
        Ok(Some(price)) => Err(InventoryError::InvalidPrice(format!(
            "price {price} must be greater than zero"
        ))),
        Ok(None) => Err(InventoryError::InvalidPrice("no price given".to_string())),
        Err(_) => Err(InventoryError::MissingCriticalInfo(
            "price is not a whole number".to_string(),
        )),
    }
}

fn optional<T: FieldType>(record: &Record, field: Field) -> Option<T> {
    record.get_optional(field).ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_record() -> Record {
        Record::new()
            .with(Field::VehicleId, "V1")
            .with(Field::VehicleType, "suv")
            .with(Field::VehicleModel, "X")
            .with(Field::Price, 20_000_i64)
    }

    #[test]
    fn builds_vehicle_with_optional_fields() {
        let record = base_record()
            .with(Field::VehicleManufacturer, "Acme")
            .with(Field::PriceUnit, "dollars")
            .with(Field::AcquisitionDate, 1_700_000_000_000_i64);

        let vehicle = create_from_record(&record).expect("vehicle builds");
        assert_eq!(vehicle.id(), "V1");
        assert_eq!(vehicle.category(), VehicleCategory::Suv);
        assert_eq!(vehicle.manufacturer(), Some("Acme"));
        assert_eq!(vehicle.price_unit(), Some("dollars"));
        assert_eq!(vehicle.acquisition_date(), Some(1_700_000_000_000));
        assert!(!vehicle.is_rentable());
    }

    #[test]
    fn ill_typed_optional_fields_are_left_unset() {
        let mut record = base_record();
        record.insert_raw(Field::AcquisitionDate, FieldValue::Text("yesterday".to_string()));
        record.insert_raw(Field::VehicleManufacturer, FieldValue::Long(7));

        let vehicle = create_from_record(&record).expect("vehicle builds");
        assert_eq!(vehicle.acquisition_date(), None);
        assert_eq!(vehicle.manufacturer(), None);
    }

    #[test]
    fn unknown_category_fails_first() {
        let mut record = base_record().with(Field::VehicleType, "spaceship");
        record.remove(Field::Price);
        assert!(matches!(
            create_from_record(&record),
            Err(InventoryError::InvalidVehicleType(_))
        ));

        record.remove(Field::VehicleType);
        assert!(matches!(
            create_from_record(&record),
            Err(InventoryError::InvalidVehicleType(_))
        ));
    }

    #[test]
    fn non_positive_or_absent_price_is_invalid() {
        for price in [0_i64, -5] {
            let record = base_record().with(Field::Price, price);
            assert!(matches!(
                create_from_record(&record),
                Err(InventoryError::InvalidPrice(_))
            ));
        }

        let mut record = base_record();
        record.remove(Field::Price);
        assert!(matches!(
            create_from_record(&record),
            Err(InventoryError::InvalidPrice(_))
        ));
    }

    #[test]
    fn wrong_typed_price_or_missing_identity_is_missing_info() {
        let mut record = base_record();
        record.insert_raw(Field::Price, FieldValue::Text("20k".to_string()));
        assert!(matches!(
            create_from_record(&record),
            Err(InventoryError::MissingCriticalInfo(_))
        ));

        let mut record = base_record();
        record.remove(Field::VehicleModel);
        assert!(matches!(
            create_from_record(&record),
            Err(InventoryError::MissingCriticalInfo(_))
        ));

        let record = base_record().with(Field::VehicleId, "   ");
        assert!(matches!(
            create_from_record(&record),
            Err(InventoryError::MissingCriticalInfo(_))
        ));
    }

    #[test]
    fn rental_flag_is_restored_through_the_policy() {
        let record = base_record().with(Field::VehicleRentalStatus, true);
        let vehicle = create_from_record(&record).expect("rentable suv");
        assert!(vehicle.is_rentable());

        let sports = base_record()
            .with(Field::VehicleType, "sports car")
            .with(Field::VehicleRentalStatus, false);
        assert!(create_from_record(&sports).is_ok());

        let rented_sports = sports.with(Field::VehicleRentalStatus, true);
        assert!(matches!(
            create_from_record(&rented_sports),
            Err(InventoryError::VehicleNotRentable { .. })
        ));
    }

    #[test]
    fn input_record_is_not_mutated() {
        let record = base_record().with(Field::Price, 0_i64);
        let before = record.clone();
        let _ = create_from_record(&record);
        assert_eq!(record, before);
    }
}
