pub mod calendar;
pub mod grid;
pub mod layout;
pub mod navigation;

pub use crate::domain::model::{Appointment, AppointmentId, DateRange, Geometry, LayoutResult, ViewMode};
pub use crate::domain::ports::{AppointmentSource, Clock, ConfigProvider};
pub use crate::utils::error::Result;
