//! Previous/next stepping through the year-grouped date list.

use crate::dates::CaptureDate;

/// Direction of a date step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Previous,
    Next,
}

impl Step {
    fn offset(self) -> isize {
        match self {
            Step::Previous => -1,
            Step::Next => 1,
        }
    }
}

/// Enablement of the previous/next buttons for a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavButtons {
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

impl NavButtons {
    pub const DISABLED: NavButtons = NavButtons {
        previous_enabled: false,
        next_enabled: false,
    };
}

/// Navigator over a flattened date list (year markers interleaved).
pub struct DateNavigator<'a> {
    entries: &'a [CaptureDate],
}

impl<'a> DateNavigator<'a> {
    pub fn new(entries: &'a [CaptureDate]) -> Self {
        Self { entries }
    }

    fn index_of(&self, date: &CaptureDate) -> Option<usize> {
        self.entries.iter().position(|entry| entry == date)
    }

    fn entry_at(&self, index: isize) -> Option<&'a CaptureDate> {
        usize::try_from(index).ok().and_then(|i| self.entries.get(i))
    }

    /// Steps one position, hopping over a year marker if one is landed on.
    pub fn step(&self, date: &CaptureDate, step: Step) -> Option<&'a CaptureDate> {
        let current = self.index_of(date)? as isize;
        let mut target = current + step.offset();
        let mut entry = self.entry_at(target)?;

        if entry.is_year_marker() {
            target += step.offset();
            entry = self.entry_at(target)?;
        }

        if entry.is_year_marker() {
            None
        } else {
            Some(entry)
        }
    }

    pub fn next(&self, date: &CaptureDate) -> Option<&'a CaptureDate> {
        self.step(date, Step::Next)
    }

    pub fn previous(&self, date: &CaptureDate) -> Option<&'a CaptureDate> {
        self.step(date, Step::Previous)
    }

    /// Previous is disabled on the first real date (index 1, right after the
    /// leading year marker); next is disabled on the last element.
    pub fn buttons(&self, date: &CaptureDate) -> NavButtons {
        match self.index_of(date) {
            Some(index) => NavButtons {
                previous_enabled: index != 1,
                next_enabled: index + 1 != self.entries.len(),
            },
            None => NavButtons::DISABLED,
        }
    }
}
