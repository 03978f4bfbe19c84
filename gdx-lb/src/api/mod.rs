//! HTTP API handlers for gdx-lb

pub mod buildinfo;
pub mod games;
pub mod health;

pub use buildinfo::get_build_info;
pub use games::{game_details, game_routes, games_basic, RecordView};
pub use health::health_routes;
