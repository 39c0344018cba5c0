use axum::Router;

use crate::state::SharedState;

pub mod game;
pub mod health;
pub mod lookup;
pub mod owner;
pub mod subscription;

/// Compose all route trees and wire in shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(game::router())
        .merge(lookup::router())
        .merge(subscription::router())
        .with_state(state)
}
