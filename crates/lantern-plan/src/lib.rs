pub mod parse;
pub mod plan;
pub mod schedule;
pub mod time;
pub mod validate;

pub use schedule::build_schedule;
pub use time::TimePoint;
