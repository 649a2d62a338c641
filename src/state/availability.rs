//! Availability state machine.
//!
//! Coverage outcomes are classified once into an [`AvailabilityState`];
//! everything downstream gates on that value alone and never looks at the
//! raw payload again.

/// Error string returned by the coverage service for a missing credential.
pub const NO_API_KEY_ERROR: &str = "API key not found";

/// Error string returned by the coverage service for a forbidden area.
pub const NOT_AUTHORIZED_ERROR: &str = "You are not authorized to access this area";

const NO_COVERAGE_MESSAGE: &str = "No Datelist Found";
const REQUEST_FAILED_MESSAGE: &str = "Something wrong happened";

/// Result of the latest authoritative coverage query.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AvailabilityState {
    /// Imagery is available; layers and compare may be created.
    Ready,
    /// No credential configured (or the service did not recognise it).
    NoApiKey,
    /// The credential may not access this area.
    NotAuthorized,
    /// The area has no captures.
    NoCoverage,
    /// The request was rejected or timed out.
    RequestFailed,
}

/// How a state is surfaced to the user.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Presentation {
    None,
    /// Blocking dialog; fatal until reconfigured.
    Modal,
    /// Informational banner.
    Banner,
    /// Logged only; retried on the next trigger.
    Logged,
}

impl AvailabilityState {
    pub fn is_ready(&self) -> bool {
        matches!(self, AvailabilityState::Ready)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AvailabilityState::Ready => "Ready",
            AvailabilityState::NoApiKey => "No API key",
            AvailabilityState::NotAuthorized => "Not authorized",
            AvailabilityState::NoCoverage => "No coverage",
            AvailabilityState::RequestFailed => "Request failed",
        }
    }

    /// User-facing message for the error states.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            AvailabilityState::Ready => None,
            AvailabilityState::NoApiKey => Some(NO_API_KEY_ERROR),
            AvailabilityState::NotAuthorized => Some(NOT_AUTHORIZED_ERROR),
            AvailabilityState::NoCoverage => Some(NO_COVERAGE_MESSAGE),
            AvailabilityState::RequestFailed => Some(REQUEST_FAILED_MESSAGE),
        }
    }

    pub fn presentation(&self) -> Presentation {
        match self {
            AvailabilityState::Ready => Presentation::None,
            AvailabilityState::NoApiKey => Presentation::Modal,
            AvailabilityState::NotAuthorized | AvailabilityState::NoCoverage => {
                Presentation::Banner
            }
            AvailabilityState::RequestFailed => Presentation::Logged,
        }
    }

    /// Whether entering this state switches the overlay toggle off.
    /// Request failures are transient and leave the toggle alone.
    pub fn forces_overlay_off(&self) -> bool {
        !matches!(
            self,
            AvailabilityState::Ready | AvailabilityState::RequestFailed
        )
    }
}

/// Holds the current availability. `None` until the first coverage
/// response has been classified.
#[derive(Default, Debug)]
pub struct AvailabilityMachine {
    current: Option<AvailabilityState>,
}

impl AvailabilityMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<AvailabilityState> {
        self.current
    }

    pub fn is_ready(&self) -> bool {
        self.current.is_some_and(|state| state.is_ready())
    }

    /// The overlay controls are disabled whenever the state is not `Ready`.
    pub fn controls_disabled(&self) -> bool {
        !self.is_ready()
    }

    /// Records a classified outcome. Returns true when the state actually
    /// changed.
    pub fn apply(&mut self, next: AvailabilityState) -> bool {
        let previous = self.current.replace(next);
        if previous == Some(next) {
            return false;
        }

        match next {
            AvailabilityState::RequestFailed => {
                log::warn!("Coverage request failed; overlay state kept for retry")
            }
            _ => log::info!(
                "Availability: {} -> {}",
                previous.map(|s| s.label()).unwrap_or("Pending"),
                next.label()
            ),
        }

        true
    }

    /// Forgets the current state, e.g. after reconfiguration.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_pending_and_disabled() {
        let machine = AvailabilityMachine::new();
        assert_eq!(machine.state(), None);
        assert!(machine.controls_disabled());
    }

    #[test]
    fn test_transitions() {
        let mut machine = AvailabilityMachine::new();

        assert!(machine.apply(AvailabilityState::Ready));
        assert!(!machine.controls_disabled());

        assert!(!machine.apply(AvailabilityState::Ready));

        assert!(machine.apply(AvailabilityState::NoCoverage));
        assert!(machine.controls_disabled());

        assert!(machine.apply(AvailabilityState::NotAuthorized));
        assert_eq!(machine.state(), Some(AvailabilityState::NotAuthorized));
    }

    #[test]
    fn test_overlay_forcing() {
        assert!(AvailabilityState::NoApiKey.forces_overlay_off());
        assert!(AvailabilityState::NotAuthorized.forces_overlay_off());
        assert!(AvailabilityState::NoCoverage.forces_overlay_off());
        assert!(!AvailabilityState::RequestFailed.forces_overlay_off());
        assert!(!AvailabilityState::Ready.forces_overlay_off());
    }

    #[test]
    fn test_presentation() {
        assert_eq!(AvailabilityState::NoApiKey.presentation(), Presentation::Modal);
        assert_eq!(AvailabilityState::NoCoverage.presentation(), Presentation::Banner);
        assert_eq!(
            AvailabilityState::NotAuthorized.presentation(),
            Presentation::Banner
        );
        assert_eq!(
            AvailabilityState::RequestFailed.presentation(),
            Presentation::Logged
        );
        assert_eq!(AvailabilityState::Ready.message(), None);
    }
}
