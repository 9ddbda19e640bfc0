use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::{UserId, VenueId},
    list::{ListOptions, PaginatedList},
    venue::{
        event::{CreateVenue, UpdateVenue},
        Venue,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateVenueRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(range(min = 1))]
    pub capacity: i32,
    #[garde(skip)]
    #[serde(default)]
    pub description: String,
}

impl From<CreateVenueRequest> for CreateVenue {
    fn from(value: CreateVenueRequest) -> Self {
        let CreateVenueRequest {
            name,
            capacity,
            description,
        } = value;
        CreateVenue {
            name,
            capacity,
            description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateVenueRequest {
    #[garde(inner(length(min = 1)))]
    pub name: Option<String>,
    #[garde(inner(range(min = 1)))]
    pub capacity: Option<i32>,
    #[garde(skip)]
    pub description: Option<String>,
}

#[derive(new)]
pub struct UpdateVenueRequestWithIds(VenueId, UserId, UpdateVenueRequest);

impl From<UpdateVenueRequestWithIds> for UpdateVenue {
    fn from(value: UpdateVenueRequestWithIds) -> Self {
        let UpdateVenueRequestWithIds(
            venue_id,
            requested_user,
            UpdateVenueRequest {
                name,
                capacity,
                description,
            },
        ) = value;
        UpdateVenue {
            venue_id,
            name,
            capacity,
            description,
            requested_user,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VenueListQuery {
    #[garde(range(min = 0))]
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[garde(range(min = 0))]
    #[serde(default)]
    pub offset: i64,
}

const DEFAULT_LIMIT: i64 = 20;
fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl From<VenueListQuery> for ListOptions {
    fn from(value: VenueListQuery) -> Self {
        let VenueListQuery { limit, offset } = value;
        ListOptions { limit, offset }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueResponse {
    pub id: VenueId,
    pub name: String,
    pub capacity: i32,
    pub description: String,
}

impl From<Venue> for VenueResponse {
    fn from(value: Venue) -> Self {
        let Venue {
            venue_id,
            name,
            capacity,
            description,
        } = value;
        Self {
            id: venue_id,
            name,
            capacity,
            description,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedVenueResponse {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub items: Vec<VenueResponse>,
}

impl From<PaginatedList<Venue>> for PaginatedVenueResponse {
    fn from(value: PaginatedList<Venue>) -> Self {
        let PaginatedList {
            total,
            limit,
            offset,
            items,
        } = value;
        Self {
            total,
            limit,
            offset,
            items: items.into_iter().map(VenueResponse::from).collect(),
        }
    }
}
