pub mod telemetry;

pub(crate) mod panic;

pub(crate) use panic::panic_message;
pub use telemetry::*;
