//! Engine state.
//!
//! Availability gates everything; the toggle state holds the two user-facing
//! switches (overlay on/off and compare on/off).

mod availability;
mod layer;

pub use availability::{
    AvailabilityMachine, AvailabilityState, Presentation, NOT_AUTHORIZED_ERROR,
    NO_API_KEY_ERROR,
};
pub use layer::OverlayToggles;
