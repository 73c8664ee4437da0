pub mod forward;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod normalize;
pub mod session;
pub mod state;
pub mod upstream;
pub mod utils;

pub use session::Session;
pub use state::AppState;
pub use upstream::UpstreamClient;
pub use utils::{ApiError, ApiResult, Config};

use axum::{
    routing::{get, post, put},
    Router,
};
use handlers::{auth as auth_handlers, resources};
use middleware::{cors_layer, health_check, propagate_request_id_layer, request_id_layer, trace_layer};
use tower::ServiceBuilder;

/// Build the gateway router.
pub fn app(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/me", get(auth_handlers::me))
        .route("/auth/logout", post(auth_handlers::logout));

    // The trailing-slash routes carry no id so an empty id answers 400.
    let championship_routes = Router::new()
        .route(
            "/championships",
            get(resources::list_championships).post(resources::create_championship),
        )
        .route(
            "/championships/",
            get(resources::get_championship)
                .put(resources::update_championship)
                .delete(resources::delete_championship),
        )
        .route(
            "/championships/:id",
            get(resources::get_championship)
                .put(resources::update_championship)
                .delete(resources::delete_championship),
        )
        .route(
            "/championships/:id/assign-promotion",
            post(resources::assign_promotion),
        )
        .route(
            "/championships/:id/ownership-history",
            put(resources::update_ownership_history),
        );

    let promotion_routes = Router::new()
        .route(
            "/promotions",
            get(resources::list_promotions).post(resources::create_promotion),
        )
        .route(
            "/promotions/",
            get(resources::get_promotion).put(resources::update_promotion),
        )
        .route(
            "/promotions/:id",
            get(resources::get_promotion).put(resources::update_promotion),
        );

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_check))
        .merge(auth_routes)
        .merge(championship_routes)
        .merge(promotion_routes)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(trace_layer())
                .layer(propagate_request_id_layer())
                .layer(cors),
        )
        .with_state(state)
}
