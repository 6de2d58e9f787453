use super::company::Company;
use super::dealership::InventoryChannel;
use super::error::InventoryError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What happens to a vehicle whose receiver refuses it mid-transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    /// The vehicle is gone from both dealerships.
    #[default]
    NoRollback,
    /// The vehicle goes back into the sender's inventory.
    Rollback,
}

impl TransferMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoRollback => "no_rollback",
            Self::Rollback => "rollback",
        }
    }
}

impl Company {
    /// Moves a vehicle from one dealership to another.
    ///
    /// The vehicle leaves the sender before the receiver is consulted. Under
    /// [`TransferMode::NoRollback`] a refusal by the receiver means the
    /// vehicle is no longer held anywhere.
    pub fn transfer_vehicle(
        &mut self,
        sender_id: &str,
        receiver_id: &str,
        vehicle_id: &str,
        mode: TransferMode,
    ) -> Result<InventoryChannel, InventoryError> {
        if sender_id == receiver_id {
            return Err(InventoryError::DuplicateSender(sender_id.to_string()));
        }

        let sender = self.require_position(sender_id)?;
        let receiver = self.require_position(receiver_id)?;

        let (origin, vehicle) = self
            .dealership_at_mut(sender)
            .take_vehicle(vehicle_id)
            .ok_or_else(|| InventoryError::VehicleNotFound {
                vehicle_id: vehicle_id.to_string(),
                dealer_id: sender_id.to_string(),
            })?;

        if let Err(error) = self.dealership_at_mut(receiver).check_incoming(&vehicle) {
            match mode {
                TransferMode::Rollback => {
                    info!(
                        sender_id,
                        receiver_id,
                        vehicle_id,
                        "transfer refused; vehicle returned to sender"
                    );
                    self.dealership_at_mut(sender).restore_vehicle(origin, vehicle);
                }
                TransferMode::NoRollback => {
                    warn!(
                        sender_id,
                        receiver_id,
                        vehicle_id,
                        %error,
                        "transfer refused; vehicle dropped from inventory"
                    );
                }
            }
            return Err(error);
        }

        let channel = self.dealership_at_mut(receiver).place(vehicle);
        info!(
            sender_id,
            receiver_id,
            vehicle_id,
            channel = channel.label(),
            "vehicle transferred"
        );
        Ok(channel)
    }
}
