pub mod behavior;
pub mod context;
pub mod error;
pub mod game;
pub mod types;
