use dealership_inventory::app::ImportOutcome;
use dealership_inventory::inventory::{
    Dealership, DealershipSummary, InventoryChannel, RejectQueue, VehicleView,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DealershipListing {
    #[serde(flatten)]
    summary: DealershipSummary,
    vehicles: Vec<ListedVehicle>,
}

#[derive(Debug, Serialize)]
struct ListedVehicle {
    channel: InventoryChannel,
    #[serde(flatten)]
    vehicle: VehicleView,
}

pub(crate) const fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

pub(crate) fn dealerships(dealerships: &[&Dealership]) {
    if dealerships.is_empty() {
        println!("No dealerships registered");
        return;
    }

    for dealership in dealerships {
        let summary = dealership.summary();
        println!(
            "\n{} {} | receiving {} | renting {} | {} for sale, {} for rent",
            summary.dealer_id,
            if summary.name.is_empty() {
                "(unnamed)"
            } else {
                summary.name.as_str()
            },
            on_off(summary.accepting_vehicles),
            on_off(summary.renting_vehicles),
            summary.sales_count,
            summary.rental_count
        );

        for (channel, vehicle) in dealership.vehicle_views() {
            let price_unit = vehicle.price_unit.as_deref().unwrap_or("");
            let acquired = vehicle
                .acquired_on
                .as_deref()
                .map(|date| format!(" | acquired {date}"))
                .unwrap_or_default();
            println!(
                "  - [{}] {} | {} {} {} | {} {}{}",
                channel.label(),
                vehicle.id,
                vehicle.category_label,
                vehicle.manufacturer.as_deref().unwrap_or("-"),
                vehicle.model,
                vehicle.price,
                price_unit,
                acquired
            );
        }
    }
}

pub(crate) fn dealerships_json(dealerships: &[&Dealership]) {
    let listings: Vec<DealershipListing> = dealerships
        .iter()
        .map(|dealership| DealershipListing {
            summary: dealership.summary(),
            vehicles: dealership
                .vehicle_views()
                .into_iter()
                .map(|(channel, vehicle)| ListedVehicle { channel, vehicle })
                .collect(),
        })
        .collect();

    match serde_json::to_string_pretty(&listings) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("inventory listing unavailable: {err}"),
    }
}

pub(crate) fn import_outcome(outcome: &ImportOutcome, rejects: &RejectQueue) {
    println!(
        "Read {} records: {} applied, {} rejected",
        outcome.read,
        outcome.applied,
        outcome.rejected.len()
    );

    for handle in &outcome.rejected {
        let Some(entry) = rejects.get(*handle) else {
            continue;
        };
        match entry.reason() {
            Some(reason) => println!(
                "  {handle} [{} {}] {reason}",
                reason.kind().label(),
                reason.code()
            ),
            None => println!("  {handle} rejected without a recorded reason"),
        }
    }
}
