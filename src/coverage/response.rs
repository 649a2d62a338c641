//! Coverage payload model and classification.

use super::channel::FetchError;
use crate::dates::{CaptureDate, DateList};
use crate::state::{AvailabilityState, NOT_AUTHORIZED_ERROR, NO_API_KEY_ERROR};
use serde::{Deserialize, Serialize};

/// One capture record. Fields other than the date are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub capture_date: CaptureDate,
}

/// Body of a coverage response: either an error string or a survey list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverageResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surveys: Option<Vec<Survey>>,
}

/// Parses a coverage response body.
pub fn parse_coverage_body(body: &str) -> Result<CoverageResponse, FetchError> {
    Ok(serde_json::from_str(body)?)
}

/// Outcome of classifying one coverage completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub state: AvailabilityState,
    /// Deduplicated candidate list, present only for `Ready`.
    pub dates: Option<DateList>,
}

impl Classification {
    fn unavailable(state: AvailabilityState) -> Self {
        Self { state, dates: None }
    }
}

/// Classifies a payload. First match wins: missing credential, forbidden
/// area, explicit empty survey list, otherwise ready. A payload carrying an
/// unknown error or no survey list is a failed request.
pub fn classify(response: &CoverageResponse) -> Classification {
    match response.error.as_deref() {
        Some(NO_API_KEY_ERROR) => return Classification::unavailable(AvailabilityState::NoApiKey),
        Some(NOT_AUTHORIZED_ERROR) => {
            return Classification::unavailable(AvailabilityState::NotAuthorized)
        }
        Some(other) => {
            log::warn!("Coverage request returned an unrecognized error: {}", other);
            return Classification::unavailable(AvailabilityState::RequestFailed);
        }
        None => {}
    }

    let Some(surveys) = response.surveys.as_deref() else {
        log::warn!("Coverage response has no survey list");
        return Classification::unavailable(AvailabilityState::RequestFailed);
    };

    if surveys.is_empty() {
        return Classification::unavailable(AvailabilityState::NoCoverage);
    }

    // A bare year would be taken for a menu heading.
    let captures = surveys.iter().filter_map(|survey| {
        CaptureDate::parse(survey.capture_date.as_str())
            .map_err(|e| log::warn!("Skipping survey: {}", e))
            .ok()
    });
    let dates = DateList::from_captures(captures);
    if dates.is_empty() {
        return Classification::unavailable(AvailabilityState::NoCoverage);
    }

    Classification {
        state: AvailabilityState::Ready,
        dates: Some(dates),
    }
}

/// Classifies a completed request, mapping any transport failure to
/// `RequestFailed`.
pub fn classify_result(result: &Result<CoverageResponse, FetchError>) -> Classification {
    match result {
        Ok(response) => classify(response),
        Err(e) => {
            log::warn!("Coverage request failed: {}", e);
            Classification::unavailable(AvailabilityState::RequestFailed)
        }
    }
}
