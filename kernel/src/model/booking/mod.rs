use crate::model::id::{BookingId, UserId, VenueId};
use chrono::{DateTime, Utc};
use strum::{AsRefStr, Display, EnumString};

pub mod admission;
pub mod event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub booking_id: BookingId,
    pub booked_by: UserId,
    pub username: String,
    pub event_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub venue: BookingVenue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingVenue {
    pub venue_id: VenueId,
    pub name: String,
    pub capacity: i32,
}

/// Lifecycle of a booking. A new booking starts out as `Pending` and waits
/// for an administrator to approve or reject it; an approved booking can
/// still be cancelled by its owner. `Rejected` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    /// Whether a booking in this status holds its time window against
    /// other requests. A pending booking provisionally blocks so that
    /// approving it later cannot introduce a conflict.
    pub fn blocks_admission(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Approved)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Rejected | BookingStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Approved)
                | (BookingStatus::Pending, BookingStatus::Rejected)
                | (BookingStatus::Approved, BookingStatus::Cancelled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;

    #[test]
    fn pending_can_only_be_approved_or_rejected() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn approved_can_only_be_cancelled() {
        assert!(Approved.can_transition_to(Cancelled));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Approved));
    }

    #[test]
    fn terminal_statuses_accept_no_transition() {
        for terminal in [Rejected, Cancelled] {
            for next in [Pending, Approved, Rejected, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn only_pending_and_approved_block_admission() {
        assert!(Pending.blocks_admission());
        assert!(Approved.blocks_admission());
        assert!(!Rejected.blocks_admission());
        assert!(!Cancelled.blocks_admission());
    }

    #[test]
    fn status_round_trips_through_its_string_form() {
        for status in [Pending, Approved, Rejected, Cancelled] {
            assert_eq!(status.to_string().parse::<super::BookingStatus>(), Ok(status));
        }
    }
}
