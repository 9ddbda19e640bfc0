use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::user::{change_role, get_current_user, list_users, register_user};

pub fn build_user_routers() -> Router<AppRegistry> {
    let user_routers = Router::new()
        .route("/", post(register_user).get(list_users))
        .route("/me", get(get_current_user))
        .route("/:user_id/role", put(change_role));

    Router::new().nest("/users", user_routers)
}
