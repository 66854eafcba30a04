pub mod ai;
pub mod autopilot;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod grid;
pub mod layout;
pub mod motion;
pub mod power;
pub mod rng;
pub mod types;
