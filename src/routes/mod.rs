use axum::Router;

use crate::state::SharedState;

pub mod account;
pub mod answer;
pub mod docs;
pub mod game;
pub mod health;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router().merge(game::router()).merge(answer::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
