mod client;
mod error;
pub mod wire;

pub use client::{ApiClient, Backend};
pub use error::ApiError;
pub use wire::{
    CommandResponse, DataSnapshot, FaultType, GENERAL_INQUIRY, HealResponse, PassengerFlight,
    SimulationRequest,
};
