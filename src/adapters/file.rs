use crate::adapters::row::{rows_to_appointments, utc_offset, AppointmentRow};
use crate::domain::model::{Appointment, DateRange};
use crate::domain::ports::AppointmentSource;
use crate::domain::settings::FileSettings;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::FixedOffset;
use std::path::PathBuf;

/// 從 JSON 檔讀取預約，格式與 REST API 的回應相同
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    offset: FixedOffset,
}

impl JsonFileSource {
    pub fn new(settings: FileSettings) -> Result<Self> {
        Ok(Self {
            path: PathBuf::from(settings.path),
            offset: utc_offset(settings.utc_offset_minutes)?,
        })
    }
}

#[async_trait]
impl AppointmentSource for JsonFileSource {
    async fn fetch_appointments(&self, range: &DateRange) -> Result<Vec<Appointment>> {
        tracing::debug!("Reading appointments from {}", self.path.display());

        // 每次都重新讀檔，檔案在 --watch 期間被修改也能反映
        let data = tokio::fs::read(&self.path).await?;
        let rows: Vec<AppointmentRow> = serde_json::from_slice(&data)?;

        Ok(rows_to_appointments(rows, self.offset)
            .into_iter()
            .filter(|appointment| range.contains(appointment.start))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_reads_and_filters_rows() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": 1, "start_time": "2024-05-06T09:00:00", "end_time": "2024-05-06T10:00:00", "title": "Neuter"}},
                {{"id": 2, "start_time": "2024-05-20T09:00:00", "end_time": "2024-05-20T10:00:00", "title": "Recheck"}}
            ]"#
        )
        .unwrap();

        let source = JsonFileSource::new(FileSettings {
            path: file.path().to_string_lossy().to_string(),
            utc_offset_minutes: 0,
        })
        .unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        let range = DateRange::new(
            day.and_hms_opt(0, 0, 0).unwrap(),
            day.and_hms_opt(0, 0, 0).unwrap() + chrono::Duration::days(7),
        );

        let appointments = source.fetch_appointments(&range).await.unwrap();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].title, "Neuter");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let source = JsonFileSource::new(FileSettings {
            path: "/nonexistent/appointments.json".to_string(),
            utc_offset_minutes: 0,
        })
        .unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        let range = DateRange::new(
            day.and_hms_opt(0, 0, 0).unwrap(),
            day.and_hms_opt(0, 0, 0).unwrap() + chrono::Duration::days(1),
        );
        assert!(source.fetch_appointments(&range).await.is_err());
    }

    #[test]
    fn test_overflowing_offset_is_rejected() {
        let result = JsonFileSource::new(FileSettings {
            path: "appointments.json".to_string(),
            utc_offset_minutes: 40_000_000,
        });
        assert!(matches!(
            result,
            Err(crate::utils::error::CalendarError::InvalidConfigValueError { .. })
        ));
    }
}
