use crate::domain::model::{Appointment, AppointmentId};
use crate::utils::error::{CalendarError, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Deserialize;

/// 後端 `appointments` 表的一列。欄位名稱同時接受 `start_time` 與 `start` 等別名。
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentRow {
    pub id: serde_json::Value,
    #[serde(alias = "start")]
    pub start_time: String,
    #[serde(alias = "end")]
    pub end_time: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "patient_label", alias = "patient")]
    pub patient_name: Option<String>,
    #[serde(default, alias = "doctor_label", alias = "doctor")]
    pub doctor_name: Option<String>,
}

impl AppointmentRow {
    pub fn into_appointment(self, offset: FixedOffset) -> Result<Appointment> {
        let id = match self.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };

        Ok(Appointment {
            id: AppointmentId(id),
            start: parse_timestamp(&self.start_time, offset)?,
            end: parse_timestamp(&self.end_time, offset)?,
            title: self
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Appointment".to_string()),
            patient_label: self.patient_name.unwrap_or_default(),
            doctor_label: self.doctor_name.unwrap_or_default(),
        })
    }
}

/// 轉換一批資料列；時間格式錯誤的列會被略過並記錄警告
pub fn rows_to_appointments(rows: Vec<AppointmentRow>, offset: FixedOffset) -> Vec<Appointment> {
    rows.into_iter()
        .filter_map(|row| match row.into_appointment(offset) {
            Ok(appointment) => Some(appointment),
            Err(e) => {
                tracing::warn!("⚠️ Skipping appointment row: {}", e);
                None
            }
        })
        .collect()
}

/// 帶時區的 RFC 3339 時間會換算到 `offset`；沒有時區的時間視為當地時間
pub fn parse_timestamp(value: &str, offset: FixedOffset) -> Result<NaiveDateTime> {
    let value = value.trim();

    if let Ok(with_zone) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_zone.with_timezone(&offset).naive_local());
    }

    // PostgREST 的 timestamptz 可能是 "2024-05-06 09:00:00+00"
    if let Ok(with_zone) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Ok(with_zone.with_timezone(&offset).naive_local());
    }

    value
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .map_err(|_| CalendarError::InvalidTimestamp {
            value: value.to_string(),
        })
}

pub fn utc_offset(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| CalendarError::InvalidConfigValueError {
            field: "utc_offset_minutes".to_string(),
            value: minutes.to_string(),
            reason: "Offset must be within ±24 hours".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn nine_am() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let utc = utc_offset(0).unwrap();
        let taipei = utc_offset(480).unwrap();

        assert_eq!(parse_timestamp("2024-05-06T09:00:00", utc).unwrap(), nine_am());
        assert_eq!(parse_timestamp("2024-05-06 09:00:00", utc).unwrap(), nine_am());
        assert_eq!(parse_timestamp("2024-05-06T01:00:00+00:00", taipei).unwrap(), nine_am());
        assert_eq!(parse_timestamp("2024-05-06T01:00:00Z", taipei).unwrap(), nine_am());
        assert!(matches!(
            parse_timestamp("next tuesday", utc),
            Err(CalendarError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_row_accepts_numeric_ids_and_aliases() {
        let rows: Vec<AppointmentRow> = serde_json::from_value(serde_json::json!([
            {
                "id": 42,
                "start": "2024-05-06T09:00:00",
                "end": "2024-05-06T09:30:00",
                "title": null,
                "patient_label": "Biscuit",
                "doctor_name": "Dr. Reyes"
            },
            {
                "id": "broken",
                "start_time": "soon",
                "end_time": "later"
            }
        ]))
        .unwrap();

        let appointments = rows_to_appointments(rows, utc_offset(0).unwrap());
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].id.0, "42");
        assert_eq!(appointments[0].title, "Appointment");
        assert_eq!(appointments[0].patient_label, "Biscuit");
        assert_eq!(appointments[0].doctor_label, "Dr. Reyes");
        assert_eq!(appointments[0].start, nine_am());
    }

    #[test]
    fn test_offset_out_of_range() {
        assert!(utc_offset(-720).is_ok());
        assert!(utc_offset(24 * 60).is_err());
    }

    #[test]
    fn test_offset_overflow_is_an_error() {
        assert!(matches!(
            utc_offset(40_000_000),
            Err(CalendarError::InvalidConfigValueError { .. })
        ));
        assert!(utc_offset(i32::MIN).is_err());
    }
}
