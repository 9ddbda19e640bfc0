use kernel::model::{id::VenueId, venue::Venue};

#[derive(sqlx::FromRow)]
pub struct VenueRow {
    pub id: VenueId,
    pub name: String,
    pub capacity: i32,
    pub description: String,
}

impl From<VenueRow> for Venue {
    fn from(value: VenueRow) -> Self {
        let VenueRow {
            id,
            name,
            capacity,
            description,
        } = value;
        Venue {
            venue_id: id,
            name,
            capacity,
            description,
        }
    }
}

// Row for the paginated listing; `total` comes from a window function so a
// single query yields both the page and the overall count.
#[derive(sqlx::FromRow)]
pub struct PaginatedVenueRow {
    pub total: i64,
    pub id: VenueId,
    pub name: String,
    pub capacity: i32,
    pub description: String,
}

impl From<PaginatedVenueRow> for Venue {
    fn from(value: PaginatedVenueRow) -> Self {
        let PaginatedVenueRow {
            total: _,
            id,
            name,
            capacity,
            description,
        } = value;
        Venue {
            venue_id: id,
            name,
            capacity,
            description,
        }
    }
}
