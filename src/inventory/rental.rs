use std::fmt;

/// Reason a rental policy refused a state change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct RentalRefusal {
    pub reason: &'static str,
}

/// Governs whether a vehicle's rentable flag may change.
pub trait RentalPolicy: fmt::Debug + Send + Sync {
    fn is_rentable(&self) -> bool;

    /// Called only when `rentable` differs from the current state.
    fn update_to(&mut self, rentable: bool) -> Result<(), RentalRefusal>;
}

/// Default policy: starts non-rentable and accepts every toggle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ToggleRentalPolicy {
    rentable: bool,
}

impl RentalPolicy for ToggleRentalPolicy {
    fn is_rentable(&self) -> bool {
        self.rentable
    }

    fn update_to(&mut self, rentable: bool) -> Result<(), RentalRefusal> {
        self.rentable = rentable;
        Ok(())
    }
}

/// Sports cars are never rented and their flag never moves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixedRentalPolicy;

impl RentalPolicy for FixedRentalPolicy {
    fn is_rentable(&self) -> bool {
        false
    }

    fn update_to(&mut self, rentable: bool) -> Result<(), RentalRefusal> {
        let reason = if rentable {
            "sports cars cannot be rented"
        } else {
            "sports car rental features cannot be changed"
        };
        Err(RentalRefusal { reason })
    }
}
