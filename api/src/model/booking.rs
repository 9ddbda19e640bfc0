use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    booking::{
        event::{CreateBooking, UpdateBooking},
        Booking, BookingStatus, BookingVenue,
    },
    id::{BookingId, UserId, VenueId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatusName {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl From<BookingStatus> for BookingStatusName {
    fn from(value: BookingStatus) -> Self {
        match value {
            BookingStatus::Pending => Self::Pending,
            BookingStatus::Approved => Self::Approved,
            BookingStatus::Rejected => Self::Rejected,
            BookingStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<BookingStatusName> for BookingStatus {
    fn from(value: BookingStatusName) -> Self {
        match value {
            BookingStatusName::Pending => Self::Pending,
            BookingStatusName::Approved => Self::Approved,
            BookingStatusName::Rejected => Self::Rejected,
            BookingStatusName::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBookingRequest {
    #[garde(skip)]
    pub venue_id: VenueId,
    #[garde(length(min = 1))]
    pub event_name: String,
    #[garde(skip)]
    pub start_time: DateTime<Utc>,
    #[garde(skip)]
    pub end_time: DateTime<Utc>,
}

#[derive(new)]
pub struct CreateBookingRequestWithUserId(UserId, CreateBookingRequest);

impl From<CreateBookingRequestWithUserId> for CreateBooking {
    fn from(value: CreateBookingRequestWithUserId) -> Self {
        let CreateBookingRequestWithUserId(
            booked_by,
            CreateBookingRequest {
                venue_id,
                event_name,
                start_time,
                end_time,
            },
        ) = value;
        CreateBooking {
            venue_id,
            booked_by,
            event_name,
            start_time,
            end_time,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBookingRequest {
    #[garde(length(min = 1))]
    pub event_name: String,
    #[garde(skip)]
    pub start_time: DateTime<Utc>,
    #[garde(skip)]
    pub end_time: DateTime<Utc>,
}

#[derive(new)]
pub struct UpdateBookingRequestWithId(BookingId, UpdateBookingRequest);

impl From<UpdateBookingRequestWithId> for UpdateBooking {
    fn from(value: UpdateBookingRequestWithId) -> Self {
        let UpdateBookingRequestWithId(
            booking_id,
            UpdateBookingRequest {
                event_name,
                start_time,
                end_time,
            },
        ) = value;
        UpdateBooking {
            booking_id,
            event_name,
            start_time,
            end_time,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatusName,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsResponse {
    pub items: Vec<BookingResponse>,
}

impl From<Vec<Booking>> for BookingsResponse {
    fn from(value: Vec<Booking>) -> Self {
        Self {
            items: value.into_iter().map(BookingResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: BookingId,
    pub user_id: UserId,
    pub username: String,
    pub event_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatusName,
    pub venue: BookingVenueResponse,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let Booking {
            booking_id,
            booked_by,
            username,
            event_name,
            start_time,
            end_time,
            status,
            venue,
        } = value;
        Self {
            id: booking_id,
            user_id: booked_by,
            username,
            event_name,
            start_time,
            end_time,
            status: status.into(),
            venue: venue.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingVenueResponse {
    pub venue_id: VenueId,
    pub name: String,
    pub capacity: i32,
}

impl From<BookingVenue> for BookingVenueResponse {
    fn from(value: BookingVenue) -> Self {
        let BookingVenue {
            venue_id,
            name,
            capacity,
        } = value;
        Self {
            venue_id,
            name,
            capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_request_parses_camel_case_timestamps() {
        let raw = r#"{
            "venueId": "7f8c4e9a-9d3b-4a6e-8b3a-2f1d6c5e4a10",
            "eventName": "Orientation",
            "startTime": "2025-04-01T10:00:00Z",
            "endTime": "2025-04-01T11:00:00Z"
        }"#;
        let req: CreateBookingRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.event_name, "Orientation");
        assert!(req.start_time < req.end_time);
    }

    #[test]
    fn booking_request_rejects_unknown_fields() {
        let raw = r#"{
            "venueId": "7f8c4e9a-9d3b-4a6e-8b3a-2f1d6c5e4a10",
            "eventName": "Orientation",
            "startTime": "2025-04-01T10:00:00Z",
            "endTime": "2025-04-01T11:00:00Z",
            "status": "approved"
        }"#;
        assert!(serde_json::from_str::<CreateBookingRequest>(raw).is_err());
    }

    #[test]
    fn status_names_map_both_ways() {
        for (name, status) in [
            (BookingStatusName::Pending, BookingStatus::Pending),
            (BookingStatusName::Approved, BookingStatus::Approved),
            (BookingStatusName::Rejected, BookingStatus::Rejected),
            (BookingStatusName::Cancelled, BookingStatus::Cancelled),
        ] {
            assert_eq!(BookingStatus::from(name), status);
            // the wire form matches the stored string form
            assert_eq!(
                serde_json::to_string(&BookingStatusName::from(status)).unwrap(),
                format!("\"{status}\"")
            );
        }
    }
}
