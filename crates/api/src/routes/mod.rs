//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod closeouts;
pub mod credits;
pub mod deliveries;
pub mod directory;
pub mod expenses;
pub mod health;
pub mod orders;
pub mod returns;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(directory::routes())
        .merge(orders::routes())
        .merge(credits::routes())
        .merge(deliveries::routes())
        .merge(expenses::routes())
        .merge(returns::routes())
        .merge(closeouts::routes())
}
