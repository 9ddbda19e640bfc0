use crate::model::{
    id::VenueId,
    list::{ListOptions, PaginatedList},
    venue::{
        event::{CreateVenue, DeleteVenue, UpdateVenue},
        Venue,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait VenueRepository: Send + Sync {
    async fn create(&self, event: CreateVenue) -> AppResult<Venue>;
    async fn find_all(&self, options: ListOptions) -> AppResult<PaginatedList<Venue>>;
    async fn find_by_id(&self, venue_id: VenueId) -> AppResult<Option<Venue>>;
    async fn update(&self, event: UpdateVenue) -> AppResult<()>;
    /// Deletion is refused while any booking still references the venue.
    async fn delete(&self, event: DeleteVenue) -> AppResult<()>;
}
