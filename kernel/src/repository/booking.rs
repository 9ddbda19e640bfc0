use crate::model::{
    booking::{
        event::{CreateBooking, DeleteBooking, UpdateBooking, UpdateBookingStatus},
        Booking,
    },
    id::{BookingId, UserId, VenueId},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Admits the candidate window against the venue's existing bookings
    /// and persists it as `pending`.
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId>;
    async fn find_all(&self) -> AppResult<Vec<Booking>>;
    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>>;
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>>;
    /// Bookings whose status still holds their window, ordered by start time.
    async fn find_blocking_by_venue_id(&self, venue_id: VenueId) -> AppResult<Vec<Booking>>;
    /// Re-runs admission for the new window (excluding the booking itself)
    /// before committing the edit.
    async fn update(&self, event: UpdateBooking) -> AppResult<()>;
    /// Applies a status transition; moving into `approved` re-validates
    /// admission against the venue's other blocking bookings.
    async fn update_status(&self, event: UpdateBookingStatus) -> AppResult<()>;
    async fn delete(&self, event: DeleteBooking) -> AppResult<()>;
}
