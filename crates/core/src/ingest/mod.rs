pub mod discovery;
pub mod download;
pub mod normalize;
pub mod reference;
pub mod session;
