use crate::{
    extractor::AuthorizedUser,
    model::{
        booking::BookingsResponse,
        venue::{
            CreateVenueRequest, PaginatedVenueResponse, UpdateVenueRequest,
            UpdateVenueRequestWithIds, VenueListQuery, VenueResponse,
        },
    },
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{id::VenueId, venue::event::DeleteVenue};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn register_venue(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateVenueRequest>,
) -> AppResult<(StatusCode, Json<VenueResponse>)> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate(&())?;

    let venue = registry.venue_repository().create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(venue.into())))
}

pub async fn show_venue_list(
    _user: AuthorizedUser,
    Query(query): Query<VenueListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaginatedVenueResponse>> {
    query.validate(&())?;

    registry
        .venue_repository()
        .find_all(query.into())
        .await
        .map(PaginatedVenueResponse::from)
        .map(Json)
}

pub async fn show_venue(
    _user: AuthorizedUser,
    Path(venue_id): Path<VenueId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<VenueResponse>> {
    registry
        .venue_repository()
        .find_by_id(venue_id)
        .await
        .and_then(|venue| match venue {
            Some(venue) => Ok(Json(venue.into())),
            None => Err(AppError::EntityNotFound(format!(
                "venue ({venue_id}) not found"
            ))),
        })
}

/// Blocking bookings of one venue, the same set admission is checked
/// against, ordered by start time.
pub async fn show_venue_bookings(
    _user: AuthorizedUser,
    Path(venue_id): Path<VenueId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    registry
        .venue_repository()
        .find_by_id(venue_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("venue ({venue_id}) not found")))?;

    registry
        .booking_repository()
        .find_blocking_by_venue_id(venue_id)
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

pub async fn update_venue(
    user: AuthorizedUser,
    Path(venue_id): Path<VenueId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateVenueRequest>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate(&())?;

    let update_venue = UpdateVenueRequestWithIds::new(venue_id, user.id(), req);
    registry
        .venue_repository()
        .update(update_venue.into())
        .await
        .map(|_| StatusCode::OK)
}

pub async fn delete_venue(
    user: AuthorizedUser,
    Path(venue_id): Path<VenueId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    let delete_venue = DeleteVenue {
        venue_id,
        requested_user: user.id(),
    };
    registry
        .venue_repository()
        .delete(delete_venue)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
