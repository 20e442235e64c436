#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::domain::model::ViewMode;
use crate::domain::ports::ConfigProvider;
use crate::domain::settings::{FileSettings, GridSettings, SourceSettings};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};

/// 合併設定檔與命令列之後的最終設定
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub source: SourceSettings,
    pub grid: GridSettings,
    pub default_view: ViewMode,
    pub log_level: Option<String>,
    pub log_json: bool,
}

impl ResolvedConfig {
    pub fn from_provider(provider: &dyn ConfigProvider) -> Self {
        Self {
            source: provider.source_settings(),
            grid: provider.grid_settings(),
            default_view: provider.default_view(),
            log_level: None,
            log_json: false,
        }
    }
}

impl ConfigProvider for ResolvedConfig {
    fn source_settings(&self) -> SourceSettings {
        self.source.clone()
    }

    fn grid_settings(&self) -> GridSettings {
        self.grid
    }

    fn default_view(&self) -> ViewMode {
        self.default_view
    }
}

impl Validate for ResolvedConfig {
    fn validate(&self) -> Result<()> {
        match &self.source {
            SourceSettings::Rest(rest) => {
                validation::endpoint("source.endpoint", &rest.endpoint)?;
                validation::column_name("source.start_column", &rest.start_column)?;
                validation::interval_seconds("source.timeout_seconds", rest.timeout_seconds)?;
                validation::utc_offset_minutes("source.utc_offset_minutes", rest.utc_offset_minutes)?;
            }
            SourceSettings::File(file) => {
                validation::appointment_file("source.path", &file.path)?;
                validation::utc_offset_minutes("source.utc_offset_minutes", file.utc_offset_minutes)?;
            }
            SourceSettings::Demo => {}
        }

        validation::row_height_px("display.row_height_px", self.grid.row_height_px)?;
        validation::interval_seconds("display.tick_seconds", self.grid.tick_seconds)?;
        Ok(())
    }
}

/// 讀取 `--config` 指定的 TOML（若有），再套用命令列覆蓋
#[cfg(feature = "cli")]
pub fn resolve(cli: &CliConfig) -> Result<ResolvedConfig> {
    let Some(path) = &cli.config else {
        let mut resolved = ResolvedConfig::from_provider(cli);
        resolved.log_json = cli.log_json;
        return Ok(resolved);
    };

    let toml = toml_config::TomlConfig::from_file(path)?;
    toml.validate()?;

    let mut resolved = ResolvedConfig::from_provider(&toml);
    resolved.log_level = toml.log_level().map(str::to_string);
    resolved.log_json = cli.log_json || toml.log_json();

    if cli.demo {
        resolved.source = SourceSettings::Demo;
    } else if let Some(file) = &cli.file {
        resolved.source = SourceSettings::File(FileSettings {
            path: file.clone(),
            utc_offset_minutes: cli.utc_offset_minutes.unwrap_or(0),
        });
    } else if let Some(endpoint) = &cli.endpoint {
        resolved.source = cli.source_settings();
        if let SourceSettings::Rest(rest) = &mut resolved.source {
            rest.endpoint = endpoint.clone();
        }
    }

    match &mut resolved.source {
        SourceSettings::Rest(rest) => {
            if let Some(key) = &cli.api_key {
                rest.api_key = Some(key.clone());
            }
            if let Some(timeout) = cli.timeout_seconds {
                rest.timeout_seconds = timeout;
            }
            if let Some(offset) = cli.utc_offset_minutes {
                rest.utc_offset_minutes = offset;
            }
        }
        SourceSettings::File(file) => {
            if let Some(offset) = cli.utc_offset_minutes {
                file.utc_offset_minutes = offset;
            }
        }
        SourceSettings::Demo => {}
    }

    if let Some(row_height) = cli.row_height {
        resolved.grid.row_height_px = row_height;
    }
    if let Some(weekday) = cli.week_starts_on {
        resolved.grid.week_starts_on = weekday;
    }
    if let Some(format) = cli.hour_format {
        resolved.grid.hour_format = format;
    }
    if let Some(tick) = cli.tick_seconds {
        resolved.grid.tick_seconds = tick;
    }
    if let Some(view) = cli.view {
        resolved.default_view = view;
    }

    Ok(resolved)
}
