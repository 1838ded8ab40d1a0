use axum::Router;

use crate::state::SharedState;

pub(crate) mod auth;
pub(crate) mod docs;
pub(crate) mod games;
pub(crate) mod health;
pub(crate) mod locations;
pub(crate) mod messages;
pub(crate) mod profiles;
pub(crate) mod root;
pub(crate) mod slots;
pub(crate) mod users;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = root::router()
        .merge(health::router())
        .merge(auth::router())
        .merge(slots::router(state.clone()))
        .merge(games::router(state.clone()))
        .merge(locations::router(state.clone()))
        .merge(messages::router(state.clone()))
        .merge(profiles::router(state.clone()))
        .merge(users::router(state.clone()));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
