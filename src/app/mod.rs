pub mod overlay;
pub mod seek;
pub mod state;
