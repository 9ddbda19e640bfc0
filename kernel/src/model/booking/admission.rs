use crate::model::booking::BookingStatus;
use chrono::{DateTime, Utc};
use shared::error::{AppError, AppResult};

/// Half-open time window `[start, end)` of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    /// Two half-open windows overlap iff each one starts before the other
    /// ends. Windows that merely touch (one ends exactly when the other
    /// starts) do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// An already stored booking window, as seen by the admission check.
#[derive(Debug, Clone, Copy)]
pub struct ReservedSlot {
    pub slot: TimeSlot,
    pub status: BookingStatus,
}

/// Decides whether a candidate window may be admitted against the bookings
/// already stored for the same venue.
///
/// The candidate must be a non-empty window (`start < end`). Reserved slots
/// whose status does not block admission are ignored. The outcome does not
/// depend on the order of `existing`; evaluation performs no I/O and never
/// mutates anything, so callers are responsible for running it inside
/// whatever transaction scope makes the decision safe to act on.
pub fn evaluate(candidate: &TimeSlot, existing: &[ReservedSlot]) -> AppResult<()> {
    if candidate.start >= candidate.end {
        return Err(AppError::InvalidTimeRange(format!(
            "booking must start before it ends: {} >= {}",
            candidate.start, candidate.end
        )));
    }
    for reserved in existing {
        if !reserved.status.blocks_admission() {
            continue;
        }
        if candidate.overlaps(&reserved.slot) {
            return Err(AppError::BookingOverlap(format!(
                "requested window {} - {} collides with an existing booking ({} - {})",
                candidate.start, candidate.end, reserved.slot.start, reserved.slot.end
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slot(start_hour: u32, end_hour: u32) -> TimeSlot {
        TimeSlot {
            start: Utc.with_ymd_and_hms(2025, 4, 1, start_hour, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 4, 1, end_hour, 0, 0).unwrap(),
        }
    }

    fn slot_min(start: (u32, u32), end: (u32, u32)) -> TimeSlot {
        TimeSlot {
            start: Utc.with_ymd_and_hms(2025, 4, 1, start.0, start.1, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 4, 1, end.0, end.1, 0).unwrap(),
        }
    }

    fn reserved(slot: TimeSlot, status: BookingStatus) -> ReservedSlot {
        ReservedSlot { slot, status }
    }

    #[test]
    fn empty_existing_set_admits_any_valid_window() {
        assert!(evaluate(&slot(10, 11), &[]).is_ok());
    }

    #[test]
    fn zero_length_window_is_invalid() {
        let candidate = slot(12, 12);
        assert!(matches!(
            evaluate(&candidate, &[]),
            Err(AppError::InvalidTimeRange(_))
        ));
    }

    #[test]
    fn reversed_window_is_invalid() {
        let candidate = TimeSlot {
            start: slot(10, 11).end,
            end: slot(10, 11).start,
        };
        assert!(matches!(
            evaluate(&candidate, &[]),
            Err(AppError::InvalidTimeRange(_))
        ));
    }

    #[test]
    fn touching_windows_are_admitted() {
        // candidate 10:00-11:00 against existing 11:00-12:00
        let existing = [reserved(slot(11, 12), BookingStatus::Approved)];
        assert!(evaluate(&slot(10, 11), &existing).is_ok());

        // and the mirror image: existing ends exactly when candidate starts
        let existing = [reserved(slot(9, 10), BookingStatus::Approved)];
        assert!(evaluate(&slot(10, 11), &existing).is_ok());
    }

    #[test]
    fn partial_overlap_is_rejected() {
        // candidate 10:30-11:30 against existing 10:00-11:00
        let existing = [reserved(slot(10, 11), BookingStatus::Approved)];
        assert!(matches!(
            evaluate(&slot_min((10, 30), (11, 30)), &existing),
            Err(AppError::BookingOverlap(_))
        ));
    }

    #[test]
    fn contained_window_is_rejected() {
        let existing = [reserved(slot(9, 17), BookingStatus::Pending)];
        assert!(matches!(
            evaluate(&slot(10, 11), &existing),
            Err(AppError::BookingOverlap(_))
        ));
    }

    #[test]
    fn surrounding_window_is_rejected() {
        let existing = [reserved(slot(10, 11), BookingStatus::Approved)];
        assert!(matches!(
            evaluate(&slot(9, 17), &existing),
            Err(AppError::BookingOverlap(_))
        ));
    }

    #[test]
    fn rejected_and_cancelled_bookings_never_block() {
        let existing = [
            reserved(slot(10, 11), BookingStatus::Rejected),
            reserved(slot(10, 12), BookingStatus::Cancelled),
        ];
        assert!(evaluate(&slot(10, 11), &existing).is_ok());
    }

    #[test]
    fn outcome_is_independent_of_existing_order() {
        let mut existing = vec![
            reserved(slot(8, 9), BookingStatus::Approved),
            reserved(slot(9, 10), BookingStatus::Cancelled),
            reserved(slot(12, 13), BookingStatus::Pending),
            reserved(slot(14, 15), BookingStatus::Approved),
        ];
        let candidate = slot_min((12, 30), (13, 30));

        for _ in 0..existing.len() {
            existing.rotate_left(1);
            assert!(matches!(
                evaluate(&candidate, &existing),
                Err(AppError::BookingOverlap(_))
            ));
        }

        let free = slot(10, 12);
        for _ in 0..existing.len() {
            existing.rotate_left(1);
            assert!(evaluate(&free, &existing).is_ok());
        }
    }
}
