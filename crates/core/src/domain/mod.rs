pub mod delivery;
pub mod universe;
