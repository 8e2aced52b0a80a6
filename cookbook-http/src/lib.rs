//! HTTP front for the Cookbook backend
//!
//! Thin axum layer over [`cookbook_lakehouse::Cookbook`]: it parses bodies,
//! moves the session token in and out of the `access_token` cookie and
//! renders errors. Every decision lives in the library crate.

pub mod config;
pub mod cookie;
pub mod error;
pub mod routes;

use axum::routing::{delete, get, post, put};
use axum::Router;
use cookbook_lakehouse::Cookbook;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{AdminSeed, ServerConfig};
pub use cookie::CookiePolicy;
pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub cookbook: Cookbook,
    pub cookies: CookiePolicy,
}

impl AppState {
    pub fn new(cookbook: Cookbook, cookies: CookiePolicy) -> Self {
        Self { cookbook, cookies }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        // nested segments reuse `:id`; handlers extract path tuples positionally
        // identities
        .route(
            "/identities",
            get(routes::list_identities).post(routes::register),
        )
        .route("/identities/login", post(routes::login))
        .route("/identities/federated", post(routes::federated_login))
        .route("/identities/logout", post(routes::logout))
        .route(
            "/identities/:id",
            get(routes::get_identity).put(routes::update_identity),
        )
        .route(
            "/identities/:id/:target_id",
            delete(routes::delete_identity),
        )
        // recipes
        .route("/recipes", get(routes::list_recipes))
        .route(
            "/recipes/:id",
            get(routes::get_recipe).post(routes::create_recipe),
        )
        .route(
            "/recipes/:id/:recipe_id",
            put(routes::update_recipe).delete(routes::delete_recipe),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
