use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::venue::{
    delete_venue, register_venue, show_venue, show_venue_bookings, show_venue_list, update_venue,
};

pub fn build_venue_routers() -> Router<AppRegistry> {
    let venue_routers = Router::new()
        .route("/", get(show_venue_list).post(register_venue))
        .route(
            "/:venue_id",
            get(show_venue).put(update_venue).delete(delete_venue),
        )
        .route("/:venue_id/bookings", get(show_venue_bookings));

    Router::new().nest("/venues", venue_routers)
}
