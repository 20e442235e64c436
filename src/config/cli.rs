use crate::app::render::OutputFormat;
use crate::domain::model::ViewMode;
use crate::domain::ports::ConfigProvider;
use crate::domain::settings::{
    FileSettings, GridSettings, HourFormat, RestSettings, SourceSettings, DEFAULT_START_COLUMN,
    DEFAULT_TICK_SECONDS, DEFAULT_TIMEOUT_SECONDS,
};
use chrono::{NaiveDate, NaiveDateTime, Weekday};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "clinic-calendar")]
#[command(about = "Week and day appointment calendar for a veterinary clinic")]
pub struct CliConfig {
    /// Path to a TOML configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// REST endpoint of the appointments table
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long)]
    pub api_key: Option<String>,

    /// Read appointments from a JSON file instead of the REST endpoint
    #[arg(long, conflicts_with = "endpoint")]
    pub file: Option<String>,

    /// Use built-in sample appointments
    #[arg(long, conflicts_with_all = ["endpoint", "file"])]
    pub demo: bool,

    /// Anchor date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// week or day
    #[arg(long)]
    pub view: Option<ViewMode>,

    /// text, json or csv
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    #[arg(long)]
    pub row_height: Option<f64>,

    #[arg(long)]
    pub week_starts_on: Option<Weekday>,

    /// 24h or 12h
    #[arg(long)]
    pub hour_format: Option<HourFormat>,

    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset_minutes: Option<i32>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long)]
    pub tick_seconds: Option<u64>,

    /// Keep running and redraw the current-time marker every tick
    #[arg(long)]
    pub watch: bool,

    /// Pretend the current time is this (YYYY-MM-DDTHH:MM:SS)
    #[arg(long)]
    pub now: Option<NaiveDateTime>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn source_settings(&self) -> SourceSettings {
        let utc_offset_minutes = self.utc_offset_minutes.unwrap_or(0);
        if self.demo {
            SourceSettings::Demo
        } else if let Some(path) = &self.file {
            SourceSettings::File(FileSettings {
                path: path.clone(),
                utc_offset_minutes,
            })
        } else {
            SourceSettings::Rest(RestSettings {
                endpoint: self.endpoint.clone().unwrap_or_default(),
                api_key: self.api_key.clone(),
                timeout_seconds: self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
                start_column: DEFAULT_START_COLUMN.to_string(),
                utc_offset_minutes,
            })
        }
    }

    fn grid_settings(&self) -> GridSettings {
        let defaults = GridSettings::default();
        GridSettings {
            row_height_px: self.row_height.unwrap_or(defaults.row_height_px),
            week_starts_on: self.week_starts_on.unwrap_or(defaults.week_starts_on),
            hour_format: self.hour_format.unwrap_or(defaults.hour_format),
            tick_seconds: self.tick_seconds.unwrap_or(DEFAULT_TICK_SECONDS),
        }
    }

    fn default_view(&self) -> ViewMode {
        self.view.unwrap_or_default()
    }
}
