pub mod admin;
pub mod public;

use axum::Router;

use crate::service::LicenseService;

/// Application state shared by every handler: the license service over its
/// injected store pool.
#[derive(Clone)]
pub struct AppState {
    pub licenses: LicenseService,
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .merge(admin::router())
        .with_state(state)
}
