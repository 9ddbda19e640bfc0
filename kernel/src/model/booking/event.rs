use crate::model::{
    booking::BookingStatus,
    id::{BookingId, UserId, VenueId},
};
use chrono::{DateTime, Utc};
use derive_new::new;

#[derive(new)]
pub struct CreateBooking {
    pub venue_id: VenueId,
    pub booked_by: UserId,
    pub event_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(new)]
pub struct UpdateBooking {
    pub booking_id: BookingId,
    pub event_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(new)]
pub struct UpdateBookingStatus {
    pub booking_id: BookingId,
    pub status: BookingStatus,
}

#[derive(new)]
pub struct DeleteBooking {
    pub booking_id: BookingId,
}
