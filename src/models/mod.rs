pub mod ticker;
pub mod market;
