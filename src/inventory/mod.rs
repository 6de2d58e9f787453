//! Dealership inventory core: records, vehicles, dealerships and the
//! ingestion path that ties them together.

pub mod company;
pub mod dealership;
pub mod error;
pub mod factory;
pub mod record;
pub mod rejects;
pub mod rental;
pub mod transfer;
pub mod vehicle;

pub use company::Company;
pub use dealership::{Dealership, DealershipSummary, InventoryChannel};
pub use error::{FailureKind, InventoryError};
pub use factory::create_from_record;
pub use record::{Field, FieldType, FieldValue, Record, ValueKind};
pub use rejects::{check_completeness, RejectHandle, RejectQueue, RejectedRecord, ResubmitSummary};
pub use rental::{FixedRentalPolicy, RentalPolicy, RentalRefusal, ToggleRentalPolicy};
pub use transfer::TransferMode;
pub use vehicle::{normalize_vehicle_id, Vehicle, VehicleCategory, VehicleView};
