pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FixedClock, InMemorySource, JsonFileSource, RestAppointmentSource, SystemClock};
pub use config::{toml_config::TomlConfig, ResolvedConfig};
pub use core::calendar::{CalendarView, Notice, NoticeKind, ViewState};
pub use core::layout::{layout_day, layout_day_with, LayoutOptions};
pub use domain::model::{Appointment, AppointmentId, DateRange, Geometry, LayoutResult, ViewMode};
pub use domain::settings::{GridSettings, HourFormat};
pub use utils::error::{CalendarError, Result};
