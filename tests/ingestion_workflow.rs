use dealership_inventory::inventory::{
    Company, Dealership, Field, FieldValue, InventoryChannel, InventoryError, Record, RejectQueue,
};

fn vehicle_record(dealer: &str, id: &str, kind: &str, model: &str, price: i64) -> Record {
    Record::new()
        .with(Field::DealershipId, dealer)
        .with(Field::VehicleId, id)
        .with(Field::VehicleType, kind)
        .with(Field::VehicleModel, model)
        .with(Field::Price, price)
}

fn company_with_downtown() -> Company {
    let mut company = Company::new();
    company.add_dealership(Dealership::new("D1", "Downtown"));
    company
}

#[test]
fn batch_partitions_records_into_applied_and_rejected() {
    let mut company = company_with_downtown();

    let rejects = company.data_to_inventory(vec![
        vehicle_record("D1", "V1", "suv", "X", 20_000),
        vehicle_record("D1", "V1", "sedan", "Y", 15_000),
        vehicle_record("D1", "V2", "spaceship", "Z", 1_000),
        vehicle_record("D1", "V3", "pickup", "F-150", 0),
    ]);

    let dealership = company.dealership("D1").expect("D1 registered");
    assert_eq!(dealership.sales_vehicles().len(), 1);
    assert_eq!(dealership.sales_vehicles()[0].model(), "X");

    assert_eq!(rejects.len(), 3);
    assert!(matches!(
        rejects[0].error_reason(),
        Some(InventoryError::VehicleAlreadyExists { .. })
    ));
    assert!(matches!(
        rejects[1].error_reason(),
        Some(InventoryError::InvalidVehicleType(_))
    ));
    assert!(matches!(
        rejects[2].error_reason(),
        Some(InventoryError::InvalidPrice(_))
    ));

    // rejected records keep their original values
    assert_eq!(
        rejects[0].get_typed::<String>(Field::VehicleModel).as_deref(),
        Ok("Y")
    );
}

#[test]
fn every_vehicle_in_inventory_has_a_positive_price() {
    let mut company = company_with_downtown();
    let records = (-2..3)
        .map(|step| vehicle_record("D1", &format!("P{step}"), "sedan", "Civic", step * 1_000))
        .collect();

    let rejects = company.data_to_inventory(records);
    assert_eq!(rejects.len(), 3);

    let dealership = company.dealership("D1").expect("D1 registered");
    assert!(dealership.inventory().all(|vehicle| vehicle.price() > 0));
    assert_eq!(dealership.inventory_len(), 2);
}

#[test]
fn rejected_records_are_corrected_and_resubmitted() {
    let mut company = company_with_downtown();
    let mut bad_price = vehicle_record("D1", "V7", "suv", "X", 1);
    bad_price.insert_raw(Field::Price, FieldValue::Text("twenty".to_string()));

    let mut queue = RejectQueue::new();
    let handles = queue.extend(company.data_to_inventory(vec![
        bad_price,
        vehicle_record("D1", "V8", "hovercraft", "H", 5_000),
    ]));
    assert_eq!(handles.len(), 2);

    assert!(queue.resubmit(handles[0], &mut company).is_err());
    queue
        .edit_from_text(handles[0], Field::Price, "20000")
        .expect("price edit parses");
    assert_eq!(
        queue.resubmit(handles[0], &mut company),
        Ok(InventoryChannel::Sales)
    );

    queue
        .edit_from_text(handles[1], Field::VehicleType, "pickup")
        .expect("type edit");
    let summary = queue.resubmit_all(&mut company);
    assert_eq!(summary.applied, 1);
    assert_eq!(summary.still_rejected, 0);
    assert!(queue.is_empty());

    let dealership = company.dealership("D1").expect("D1 registered");
    assert!(dealership.contains_vehicle_id("v7"));
    assert!(dealership.contains_vehicle_id("V8"));
}

#[test]
fn resubmission_to_a_closed_dealership_stays_queued_with_new_reason() {
    let mut company = company_with_downtown();
    company
        .dealership_mut("D1")
        .expect("D1 registered")
        .set_accepting_vehicles(false);

    let mut queue = RejectQueue::new();
    let handles = queue.extend(company.data_to_inventory(vec![vehicle_record(
        "D1", "V1", "suv", "X", 20_000,
    )]));
    assert!(matches!(
        queue.get(handles[0]).and_then(|entry| entry.reason()),
        Some(InventoryError::NotAcceptingVehicles { .. })
    ));

    queue
        .edit_from_text(handles[0], Field::DealershipId, "D9")
        .expect("dealer edit");
    assert!(matches!(
        queue.resubmit(handles[0], &mut company),
        Err(InventoryError::DealershipNotFound(_))
    ));
    assert!(matches!(
        queue.get(handles[0]).and_then(|entry| entry.reason()),
        Some(InventoryError::DealershipNotFound(_))
    ));
}

#[test]
fn sports_cars_never_reach_the_rental_inventory() {
    let mut company = company_with_downtown();
    let rejects = company.data_to_inventory(vec![
        vehicle_record("D1", "S1", "Sports-Car", "911", 120_000),
        vehicle_record("D1", "S2", "sports car", "GT", 90_000).with(Field::VehicleRentalStatus, true),
    ]);
    assert_eq!(rejects.len(), 1);
    assert!(matches!(
        rejects[0].error_reason(),
        Some(InventoryError::VehicleNotRentable { .. })
    ));

    let dealership = company.dealership_mut("D1").expect("D1 registered");
    assert!(matches!(
        dealership.update_vehicle_rental("S1"),
        Err(InventoryError::VehicleNotRentable { .. })
    ));
    assert_eq!(dealership.sales_vehicles().len(), 1);
    assert!(dealership.rental_vehicles().is_empty());
}

#[test]
fn removal_is_idempotent() {
    let mut company = company_with_downtown();
    assert!(company
        .data_to_inventory(vec![vehicle_record("D1", "V1", "suv", "X", 20_000)])
        .is_empty());

    let dealership = company.dealership_mut("D1").expect("D1 registered");
    assert!(dealership
        .remove_from_inventory("V1")
        .expect("valid id")
        .is_some());
    assert!(dealership
        .remove_from_inventory("V1")
        .expect("valid id")
        .is_none());
    assert_eq!(dealership.inventory_len(), 0);
}
