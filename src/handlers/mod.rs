pub mod estimate;
pub mod model;
