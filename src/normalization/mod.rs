pub mod lot;
pub mod plan;

pub use lot::lot_number_from_address;
pub use plan::normalize_plan_name;
