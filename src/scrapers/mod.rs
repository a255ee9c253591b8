pub mod base;
pub mod cboe;
