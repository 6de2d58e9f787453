use serde::Serialize;

/// Broad classification used when deciding how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The record could not be turned into a domain object.
    Validation,
    /// A well-formed operation would break a business rule.
    Invariant,
    /// An id-based lookup found nothing.
    Lookup,
}

impl FailureKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Invariant => "invariant",
            Self::Lookup => "lookup",
        }
    }
}

/// Every failure the inventory core can produce.
///
/// The same value is attached to rejected records under the `error_reason`
/// field, so it is cheap to clone and compares by value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("missing critical information: {0}")]
    MissingCriticalInfo(String),
    #[error("invalid price: {0}")]
    InvalidPrice(String),
    #[error("invalid vehicle type: {0}")]
    InvalidVehicleType(String),
    #[error("field {field}: wanted a {expected} value, found {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("vehicle {vehicle_id} already exists in the {location} inventory of dealership {dealer_id}")]
    VehicleAlreadyExists {
        vehicle_id: String,
        dealer_id: String,
        location: &'static str,
    },
    #[error("dealership {dealer_id} is not accepting new vehicles; vehicle {vehicle_id} was not added")]
    NotAcceptingVehicles {
        dealer_id: String,
        vehicle_id: String,
    },
    #[error("dealership {0} is not currently providing rental services")]
    DealershipNotRenting(String),
    #[error("vehicle {vehicle_id} is not rentable: {detail}")]
    VehicleNotRentable { vehicle_id: String, detail: String },
    #[error("sender and receiver dealership can not be the same ({0})")]
    DuplicateSender(String),
    #[error("dealership {0} not found")]
    DealershipNotFound(String),
    #[error("vehicle {vehicle_id} not found in dealership {dealer_id}")]
    VehicleNotFound {
        vehicle_id: String,
        dealer_id: String,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl InventoryError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::MissingCriticalInfo(_)
            | Self::InvalidPrice(_)
            | Self::InvalidVehicleType(_)
            | Self::TypeMismatch { .. }
            | Self::InvalidArgument(_) => FailureKind::Validation,
            Self::VehicleAlreadyExists { .. }
            | Self::NotAcceptingVehicles { .. }
            | Self::DealershipNotRenting(_)
            | Self::VehicleNotRentable { .. }
            | Self::DuplicateSender(_) => FailureKind::Invariant,
            Self::DealershipNotFound(_) | Self::VehicleNotFound { .. } => FailureKind::Lookup,
        }
    }

    /// Stable short code shown next to rejected records.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingCriticalInfo(_) => "missing_critical_info",
            Self::InvalidPrice(_) => "invalid_price",
            Self::InvalidVehicleType(_) => "invalid_vehicle_type",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::VehicleAlreadyExists { .. } => "vehicle_already_exists",
            Self::NotAcceptingVehicles { .. } => "not_accepting_vehicles",
            Self::DealershipNotRenting(_) => "dealership_not_renting",
            Self::VehicleNotRentable { .. } => "vehicle_not_rentable",
            Self::DuplicateSender(_) => "duplicate_sender",
            Self::DealershipNotFound(_) => "dealership_not_found",
            Self::VehicleNotFound { .. } => "vehicle_not_found",
            Self::InvalidArgument(_) => "invalid_argument",
        }
    }
}
