//! Settlement domain errors

use thiserror::Error;

use core_kernel::{MemberId, PortError};

/// Errors that can occur while computing a trip settlement
#[derive(Debug, Error)]
pub enum SettlementError {
    /// The trip cannot be split: no members, or every factor is zero
    #[error("Invalid trip state: {0}")]
    InvalidTripState(String),

    /// A member id does not belong to the trip
    #[error("Member {member_id} does not belong to this trip")]
    UnknownMemberReference { member_id: MemberId },

    /// A trip, member, or expense record violates its invariants
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// The storage collaborator failed
    #[error("Storage error: {0}")]
    Port(#[from] PortError),
}

impl SettlementError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        SettlementError::InvalidTripState(message.into())
    }

    pub fn invalid_record(message: impl Into<String>) -> Self {
        SettlementError::InvalidRecord(message.into())
    }
}
