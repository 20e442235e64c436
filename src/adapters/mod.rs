// Adapters layer: concrete implementations of the domain ports (data sources, clocks).

pub mod clock;
pub mod file;
pub mod memory;
pub mod rest;
pub mod row;

pub use clock::{FixedClock, SystemClock};
pub use file::JsonFileSource;
pub use memory::InMemorySource;
pub use rest::RestAppointmentSource;
