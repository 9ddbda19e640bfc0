use crate::{
    extractor::AuthorizedUser,
    model::booking::{
        BookingResponse, BookingsResponse, CreateBookingRequest, CreateBookingRequestWithUserId,
        UpdateBookingRequest, UpdateBookingRequestWithId, UpdateBookingStatusRequest,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    booking::{
        event::{DeleteBooking, UpdateBookingStatus},
        Booking, BookingStatus,
    },
    id::BookingId,
};
use registry::AppRegistry;
use serde_json::json;
use shared::error::{AppError, AppResult};

pub async fn create_booking(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    req.validate(&())?;

    let event = CreateBookingRequestWithUserId::new(user.id(), req);
    let booking_id = registry.booking_repository().create(event.into()).await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": booking_id }))))
}

pub async fn show_booking_list(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    registry
        .booking_repository()
        .find_all()
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

pub async fn show_my_bookings(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    registry
        .booking_repository()
        .find_by_user_id(user.id())
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

pub async fn show_booking(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    let booking = fetch_booking(&registry, booking_id).await?;
    ensure_owner_or_admin(&user, &booking)?;
    Ok(Json(booking.into()))
}

pub async fn update_booking(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateBookingRequest>,
) -> AppResult<StatusCode> {
    req.validate(&())?;

    let booking = fetch_booking(&registry, booking_id).await?;
    ensure_owner_or_admin(&user, &booking)?;

    let update = UpdateBookingRequestWithId::new(booking_id, req);
    registry
        .booking_repository()
        .update(update.into())
        .await
        .map(|_| StatusCode::OK)
}

pub async fn update_booking_status(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> AppResult<StatusCode> {
    let next: BookingStatus = req.status.into();
    match next {
        // the approval decision belongs to administrators
        BookingStatus::Approved | BookingStatus::Rejected => {
            if !user.is_admin() {
                return Err(AppError::ForbiddenOperation);
            }
        }
        BookingStatus::Cancelled => {
            let booking = fetch_booking(&registry, booking_id).await?;
            ensure_owner_or_admin(&user, &booking)?;
        }
        // no transition leads back to pending; let the store report it
        BookingStatus::Pending => {}
    }

    registry
        .booking_repository()
        .update_status(UpdateBookingStatus::new(booking_id, next))
        .await
        .map(|_| StatusCode::OK)
}

pub async fn delete_booking(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    let booking = fetch_booking(&registry, booking_id).await?;
    ensure_owner_or_admin(&user, &booking)?;

    registry
        .booking_repository()
        .delete(DeleteBooking::new(booking_id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

async fn fetch_booking(registry: &AppRegistry, booking_id: BookingId) -> AppResult<Booking> {
    registry
        .booking_repository()
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("booking ({booking_id}) not found")))
}

fn ensure_owner_or_admin(user: &AuthorizedUser, booking: &Booking) -> AppResult<()> {
    if user.is_admin() || booking.booked_by == user.id() {
        Ok(())
    } else {
        Err(AppError::ForbiddenOperation)
    }
}
