pub mod alarm;
pub mod animation;
pub mod entity;
pub mod sprite;
