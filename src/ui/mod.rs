pub mod duration;
pub mod loading;
pub mod notifications;
pub mod render;
pub mod theme;
