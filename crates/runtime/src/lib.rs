pub mod scheduler;
pub mod throttle;

pub use scheduler::*;
pub use throttle::*;
