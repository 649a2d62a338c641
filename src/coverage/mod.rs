//! Coverage query: transport, classification and date reconciliation.
//!
//! The coverage service reports which capture dates exist for the tile under
//! the view center. Responses are classified once into an availability
//! state here; only the resulting state and date list travel further.

mod channel;
mod response;
mod sync;

pub use channel::{CoverageChannel, CoverageCompletion, FetchError, FetchTicket, SequenceGuard};
pub use response::{classify, classify_result, parse_coverage_body, Classification, CoverageResponse, Survey};
pub use sync::{sync_dates, DateSelection, SyncOutcome};
