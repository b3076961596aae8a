pub mod collision;
pub mod geometry;
pub mod registry;
pub mod room;
pub mod scheduler;
pub mod time;
