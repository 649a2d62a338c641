//! Date list reconciliation.

use crate::dates::{CaptureDate, DateList};
use crate::tiles::Role;

/// The currently selected capture date of each role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSelection {
    pub primary: CaptureDate,
    pub compare: CaptureDate,
}

impl DateSelection {
    /// Both roles start on the same date.
    pub fn new(date: CaptureDate) -> Self {
        Self {
            primary: date.clone(),
            compare: date,
        }
    }

    pub fn get(&self, role: Role) -> &CaptureDate {
        match role {
            Role::Primary => &self.primary,
            Role::Compare => &self.compare,
        }
    }

    /// Returns true if the value changed.
    pub fn set(&mut self, role: Role, date: CaptureDate) -> bool {
        let slot = match role {
            Role::Primary => &mut self.primary,
            Role::Compare => &mut self.compare,
        };
        if *slot == date {
            return false;
        }
        *slot = date;
        true
    }
}

/// What a reconciliation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncOutcome {
    pub list_changed: bool,
    pub primary_changed: bool,
    pub compare_changed: bool,
}

/// Reconciles the stored list and selections against a fresh candidate.
///
/// The stored list is replaced only when its member sequence differs. The
/// selections are checked on every call: a selection missing from the
/// candidate moves to the candidate's first (primary) or last (compare)
/// entry.
pub fn sync_dates(
    stored: &mut DateList,
    selection: &mut DateSelection,
    candidate: DateList,
) -> SyncOutcome {
    let mut outcome = SyncOutcome::default();

    if candidate.is_empty() {
        log::warn!("Ignoring empty date list during reconciliation");
        return outcome;
    }

    if !candidate.contains(&selection.primary) {
        if let Some(first) = candidate.first() {
            outcome.primary_changed = selection.set(Role::Primary, first.clone());
        }
    }
    if !candidate.contains(&selection.compare) {
        if let Some(last) = candidate.last() {
            outcome.compare_changed = selection.set(Role::Compare, last.clone());
        }
    }

    if *stored != candidate {
        log::debug!("Date list updated: {} capture date(s)", candidate.len());
        *stored = candidate;
        outcome.list_changed = true;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(dates: &[&str]) -> DateList {
        DateList::from_captures(dates.iter().map(|d| CaptureDate::from(*d)))
    }

    #[test]
    fn test_identical_list_is_not_replaced() {
        let mut stored = list(&["2021-01-15", "2020-06-01"]);
        let mut selection = DateSelection {
            primary: "2021-01-15".into(),
            compare: "2020-06-01".into(),
        };

        let outcome = sync_dates(&mut stored, &mut selection, list(&["2021-01-15", "2020-06-01"]));
        assert_eq!(outcome, SyncOutcome::default());
    }

    #[test]
    fn test_reordered_list_is_replaced() {
        let mut stored = list(&["2021-01-15", "2020-06-01"]);
        let mut selection = DateSelection::new("2021-01-15".into());

        let outcome = sync_dates(&mut stored, &mut selection, list(&["2020-06-01", "2021-01-15"]));
        assert!(outcome.list_changed);
        assert!(!outcome.primary_changed);
        assert_eq!(stored.first().map(|d| d.as_str()), Some("2020-06-01"));
    }

    #[test]
    fn test_stale_selections_move_to_ends() {
        let mut stored = DateList::single("2024-05-01".into());
        let mut selection = DateSelection::new("2024-05-01".into());

        let outcome = sync_dates(
            &mut stored,
            &mut selection,
            list(&["2021-01-15", "2020-06-01", "2020-03-01"]),
        );
        assert!(outcome.list_changed && outcome.primary_changed && outcome.compare_changed);
        assert_eq!(selection.primary.as_str(), "2021-01-15");
        assert_eq!(selection.compare.as_str(), "2020-03-01");
    }

    #[test]
    fn test_selection_reconciled_even_when_list_unchanged() {
        let mut stored = list(&["2021-01-15", "2020-06-01"]);
        // Selection drifted off the list without the list itself changing.
        let mut selection = DateSelection {
            primary: "1999-01-01".into(),
            compare: "2020-06-01".into(),
        };

        let outcome = sync_dates(&mut stored, &mut selection, list(&["2021-01-15", "2020-06-01"]));
        assert!(!outcome.list_changed);
        assert!(outcome.primary_changed);
        assert!(!outcome.compare_changed);
        assert_eq!(selection.primary.as_str(), "2021-01-15");
    }

    #[test]
    fn test_empty_candidate_is_ignored() {
        let mut stored = list(&["2021-01-15"]);
        let mut selection = DateSelection::new("2021-01-15".into());
        let outcome = sync_dates(&mut stored, &mut selection, DateList::default());
        assert_eq!(outcome, SyncOutcome::default());
        assert_eq!(stored.len(), 1);
    }
}
