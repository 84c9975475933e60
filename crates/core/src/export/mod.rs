pub mod filter;
pub mod xlsx;
