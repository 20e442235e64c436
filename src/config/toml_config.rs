use crate::domain::model::ViewMode;
use crate::domain::ports::ConfigProvider;
use crate::domain::settings::{
    FileSettings, GridSettings, HourFormat, RestSettings, SourceSettings, DEFAULT_START_COLUMN,
    DEFAULT_TICK_SECONDS, DEFAULT_TIMEOUT_SECONDS,
};
use crate::utils::error::{CalendarError, Result};
use crate::utils::validation::{self, Validate};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub display: Option<DisplayConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: String,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub path: Option<String>,
    pub start_column: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub row_height_px: Option<f64>,
    pub week_starts_on: Option<String>,
    pub hour_format: Option<String>,
    pub default_view: Option<String>,
    pub tick_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CalendarError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_ANON_KEY})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CalendarError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn display(&self) -> DisplayConfig {
        self.display.clone().unwrap_or_default()
    }

    pub fn week_starts_on(&self) -> Result<Weekday> {
        match self.display().week_starts_on {
            None => Ok(GridSettings::default().week_starts_on),
            Some(value) => value
                .parse::<Weekday>()
                .map_err(|_| CalendarError::InvalidConfigValueError {
                    field: "display.week_starts_on".to_string(),
                    value,
                    reason: "Expected a weekday such as \"sun\" or \"monday\"".to_string(),
                }),
        }
    }

    pub fn hour_format(&self) -> Result<HourFormat> {
        match self.display().hour_format {
            None => Ok(HourFormat::default()),
            Some(value) => value.parse::<HourFormat>().map_err(|reason| {
                CalendarError::InvalidConfigValueError {
                    field: "display.hour_format".to_string(),
                    value,
                    reason,
                }
            }),
        }
    }

    pub fn view_mode(&self) -> Result<ViewMode> {
        match self.display().default_view {
            None => Ok(ViewMode::default()),
            Some(value) => value.parse::<ViewMode>().map_err(|reason| {
                CalendarError::InvalidConfigValueError {
                    field: "display.default_view".to_string(),
                    value,
                    reason,
                }
            }),
        }
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        match self.source.r#type.as_str() {
            "rest" => {
                let endpoint = validation::require("source.endpoint", &self.source.endpoint)?;
                validation::endpoint("source.endpoint", endpoint)?;
            }
            "file" => {
                let path = validation::require("source.path", &self.source.path)?;
                validation::appointment_file("source.path", path)?;
            }
            "demo" => {}
            other => {
                return Err(CalendarError::InvalidConfigValueError {
                    field: "source.type".to_string(),
                    value: other.to_string(),
                    reason: "Supported source types: rest, file, demo".to_string(),
                });
            }
        }

        if let Some(column) = &self.source.start_column {
            validation::column_name("source.start_column", column)?;
        }
        if let Some(timeout) = self.source.timeout_seconds {
            validation::interval_seconds("source.timeout_seconds", timeout)?;
        }
        if let Some(offset) = self.source.utc_offset_minutes {
            validation::utc_offset_minutes("source.utc_offset_minutes", offset)?;
        }

        let display = self.display();
        if let Some(row_height) = display.row_height_px {
            validation::row_height_px("display.row_height_px", row_height)?;
        }
        if let Some(tick) = display.tick_seconds {
            validation::interval_seconds("display.tick_seconds", tick)?;
        }
        self.week_starts_on()?;
        self.hour_format()?;
        self.view_mode()?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn source_settings(&self) -> SourceSettings {
        let utc_offset_minutes = self.source.utc_offset_minutes.unwrap_or(0);
        match self.source.r#type.as_str() {
            "file" => SourceSettings::File(FileSettings {
                path: self.source.path.clone().unwrap_or_default(),
                utc_offset_minutes,
            }),
            "demo" => SourceSettings::Demo,
            _ => SourceSettings::Rest(RestSettings {
                endpoint: self.source.endpoint.clone().unwrap_or_default(),
                api_key: self.source.api_key.clone(),
                timeout_seconds: self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
                start_column: self
                    .source
                    .start_column
                    .clone()
                    .unwrap_or_else(|| DEFAULT_START_COLUMN.to_string()),
                utc_offset_minutes,
            }),
        }
    }

    fn grid_settings(&self) -> GridSettings {
        let defaults = GridSettings::default();
        let display = self.display();
        GridSettings {
            row_height_px: display.row_height_px.unwrap_or(defaults.row_height_px),
            week_starts_on: self.week_starts_on().unwrap_or(defaults.week_starts_on),
            hour_format: self.hour_format().unwrap_or(defaults.hour_format),
            tick_seconds: display.tick_seconds.unwrap_or(DEFAULT_TICK_SECONDS),
        }
    }

    fn default_view(&self) -> ViewMode {
        self.view_mode().unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_rest_config() {
        let toml_content = r#"
[source]
type = "rest"
endpoint = "https://clinic.supabase.co/rest/v1/appointments"
api_key = "anon-key"
utc_offset_minutes = 480

[display]
row_height_px = 48
week_starts_on = "mon"
hour_format = "12h"
default_view = "day"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        let grid = config.grid_settings();
        assert_eq!(grid.row_height_px, 48.0);
        assert_eq!(grid.week_starts_on, Weekday::Mon);
        assert_eq!(grid.hour_format, HourFormat::H12);
        assert_eq!(grid.tick_seconds, 60);
        assert_eq!(config.default_view(), ViewMode::Day);

        match config.source_settings() {
            SourceSettings::Rest(rest) => {
                assert_eq!(rest.api_key.as_deref(), Some("anon-key"));
                assert_eq!(rest.start_column, "start_time");
                assert_eq!(rest.utc_offset_minutes, 480);
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CLINIC_CALENDAR_TEST_KEY", "secret-from-env");

        let toml_content = r#"
[source]
type = "rest"
endpoint = "https://clinic.example.com/appointments"
api_key = "${CLINIC_CALENDAR_TEST_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.api_key.as_deref(), Some("secret-from-env"));

        std::env::remove_var("CLINIC_CALENDAR_TEST_KEY");
    }

    #[test]
    fn test_config_validation() {
        let missing_endpoint = TomlConfig::from_toml_str("[source]\ntype = \"rest\"\n").unwrap();
        assert!(matches!(
            missing_endpoint.validate(),
            Err(CalendarError::MissingConfigError { .. })
        ));

        let bad_weekday = TomlConfig::from_toml_str(
            "[source]\ntype = \"demo\"\n[display]\nweek_starts_on = \"someday\"\n",
        )
        .unwrap();
        assert!(bad_weekday.validate().is_err());

        let bad_type = TomlConfig::from_toml_str("[source]\ntype = \"ftp\"\n").unwrap();
        assert!(bad_type.validate().is_err());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = TomlConfig::from_toml_str(include_str!("../../calendar.example.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_view(), ViewMode::Week);
        assert!(!config.log_json());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[source]\ntype = \"file\"\npath = \"appointments.json\"").unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"").unwrap();

        let config = TomlConfig::from_file(file.path()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_level(), Some("debug"));
        assert!(matches!(config.source_settings(), SourceSettings::File(_)));
    }
}
