use crate::adapters::row::{rows_to_appointments, utc_offset, AppointmentRow};
use crate::domain::model::{Appointment, DateRange};
use crate::domain::ports::AppointmentSource;
use crate::domain::settings::RestSettings;
use crate::utils::error::{CalendarError, Result};
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDateTime};
use reqwest::Client;
use std::time::Duration;

/// 透過 PostgREST 風格的 REST API 取預約（例如 Supabase 的 `/rest/v1/appointments`）
pub struct RestAppointmentSource {
    client: Client,
    settings: RestSettings,
    offset: FixedOffset,
}

impl RestAppointmentSource {
    pub fn new(settings: RestSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;
        let offset = utc_offset(settings.utc_offset_minutes)?;

        Ok(Self {
            client,
            settings,
            offset,
        })
    }

    fn timestamp_param(&self, at: NaiveDateTime) -> String {
        format!("{}{}", at.format("%Y-%m-%dT%H:%M:%S"), self.offset)
    }

    fn query(&self, range: &DateRange) -> Vec<(String, String)> {
        let column = &self.settings.start_column;
        vec![
            ("select".to_string(), "*".to_string()),
            (column.clone(), format!("gte.{}", self.timestamp_param(range.start))),
            (column.clone(), format!("lt.{}", self.timestamp_param(range.end))),
            ("order".to_string(), format!("{}.asc", column)),
        ]
    }
}

#[async_trait]
impl AppointmentSource for RestAppointmentSource {
    async fn fetch_appointments(&self, range: &DateRange) -> Result<Vec<Appointment>> {
        tracing::debug!(
            "Making appointment request to: {} for {}",
            self.settings.endpoint,
            range
        );

        let mut request = self
            .client
            .get(&self.settings.endpoint)
            .query(&self.query(range));

        if let Some(key) = &self.settings.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Appointment API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::fetch_failure(format!(
                "HTTP {} from {}: {}",
                status,
                self.settings.endpoint,
                body.chars().take(200).collect::<String>()
            )));
        }

        let rows: Vec<AppointmentRow> = response.json().await?;
        let appointments: Vec<Appointment> = rows_to_appointments(rows, self.offset)
            .into_iter()
            .filter(|appointment| range.contains(appointment.start))
            .collect();

        tracing::debug!("Received {} appointments", appointments.len());
        Ok(appointments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_query_uses_postgrest_operators() {
        let source = RestAppointmentSource::new(RestSettings {
            endpoint: "http://localhost:54321/rest/v1/appointments".to_string(),
            api_key: None,
            timeout_seconds: 5,
            start_column: "start_time".to_string(),
            utc_offset_minutes: 480,
        })
        .unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let range = DateRange::new(
            day.and_hms_opt(0, 0, 0).unwrap(),
            day.and_hms_opt(0, 0, 0).unwrap() + chrono::Duration::days(7),
        );

        let query = source.query(&range);
        assert!(query.contains(&(
            "start_time".to_string(),
            "gte.2024-05-06T00:00:00+08:00".to_string()
        )));
        assert!(query.contains(&(
            "start_time".to_string(),
            "lt.2024-05-13T00:00:00+08:00".to_string()
        )));
        assert!(query.contains(&("order".to_string(), "start_time.asc".to_string())));
    }
}
