use chrono::{DateTime, Utc};
use kernel::model::{
    booking::{
        admission::{ReservedSlot, TimeSlot},
        Booking, BookingStatus, BookingVenue,
    },
    id::{BookingId, UserId, VenueId},
};
use shared::error::AppError;
use std::str::FromStr;

// Full booking row, joined with the owning user and the venue.
#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub id: BookingId,
    pub user_id: UserId,
    pub username: String,
    pub venue_id: VenueId,
    pub venue_name: String,
    pub capacity: i32,
    pub event_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(value: BookingRow) -> Result<Self, Self::Error> {
        let BookingRow {
            id,
            user_id,
            username,
            venue_id,
            venue_name,
            capacity,
            event_name,
            start_time,
            end_time,
            status,
        } = value;
        Ok(Booking {
            booking_id: id,
            booked_by: user_id,
            username,
            event_name,
            start_time,
            end_time,
            status: BookingStatus::from_str(&status)?,
            venue: BookingVenue {
                venue_id,
                name: venue_name,
                capacity,
            },
        })
    }
}

// Slim row fetched inside the admission transaction; only the window and
// the status matter for the overlap decision.
#[derive(sqlx::FromRow)]
pub struct BookingSlotRow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
}

impl TryFrom<BookingSlotRow> for ReservedSlot {
    type Error = AppError;

    fn try_from(value: BookingSlotRow) -> Result<Self, Self::Error> {
        let BookingSlotRow {
            start_time,
            end_time,
            status,
        } = value;
        Ok(ReservedSlot {
            slot: TimeSlot {
                start: start_time,
                end: end_time,
            },
            status: BookingStatus::from_str(&status)?,
        })
    }
}

// State read before a mutation to validate the transition or the edit.
#[derive(sqlx::FromRow)]
pub struct BookingGuardRow {
    pub venue_id: VenueId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
}

impl BookingGuardRow {
    pub fn status(&self) -> Result<BookingStatus, AppError> {
        BookingStatus::from_str(&self.status).map_err(AppError::from)
    }
}
