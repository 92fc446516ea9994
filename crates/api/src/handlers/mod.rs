pub mod credits;
pub mod generations;
pub mod payments;
