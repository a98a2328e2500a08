pub mod availability;
pub mod blockages;
pub mod fixed_schedule;
pub mod grid;
pub mod professionals;
pub mod units;
