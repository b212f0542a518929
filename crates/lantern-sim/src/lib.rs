pub mod bench;
pub mod link;
pub mod script;

pub use bench::VirtualBench;
pub use link::{LineStream, SimError, Simulator};
