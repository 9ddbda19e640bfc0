use crate::model::id::{UserId, VenueId};

pub struct CreateVenue {
    pub name: String,
    pub capacity: i32,
    pub description: String,
}

#[derive(Debug)]
pub struct UpdateVenue {
    pub venue_id: VenueId,
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub description: Option<String>,
    pub requested_user: UserId,
}

#[derive(Debug)]
pub struct DeleteVenue {
    pub venue_id: VenueId,
    pub requested_user: UserId,
}
