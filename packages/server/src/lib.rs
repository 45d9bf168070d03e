// Code Draw - API server
//
// Thin HTTP surface over the drawpool library: trigger a draw, restock the
// pool, report health. All protocol logic lives in drawpool; this crate is
// routing, configuration, and response shaping.

pub mod config;
pub mod server;

pub use config::*;
