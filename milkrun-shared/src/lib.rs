pub mod models;
pub mod money;
pub mod period;
pub mod day;

pub use day::BusinessClock;
pub use period::Period;
