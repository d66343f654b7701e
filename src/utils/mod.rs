pub mod currency;
pub mod geo;
