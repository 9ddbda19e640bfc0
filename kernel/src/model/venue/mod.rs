use crate::model::id::VenueId;

pub mod event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Venue {
    pub venue_id: VenueId,
    pub name: String,
    pub capacity: i32,
    pub description: String,
}
