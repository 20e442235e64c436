use crate::domain::model::{Appointment, DateRange};
use crate::domain::ports::AppointmentSource;
use crate::utils::error::{CalendarError, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

/// 記憶體內的預約清單，主要給測試與 `--demo` 使用
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    appointments: Vec<Appointment>,
    failure: Option<String>,
}

impl InMemorySource {
    pub fn new(appointments: Vec<Appointment>) -> Self {
        Self {
            appointments,
            failure: None,
        }
    }

    /// 以 `around` 所在的一週產生示範預約，包含重疊與跨午夜的情況
    pub fn demo(around: NaiveDate) -> Self {
        let samples: [(i64, u32, u32, i64, &str, &str, &str); 9] = [
            (0, 9, 0, 120, "Spay surgery", "Biscuit", "Dr. Reyes"),
            (0, 10, 0, 120, "Dental cleaning", "Mochi", "Dr. Chen"),
            (0, 10, 30, 30, "Vaccination", "Pepper", "Dr. Okafor"),
            (0, 14, 0, 60, "Wellness exam", "Luna", "Dr. Reyes"),
            (1, 8, 30, 45, "Bloodwork", "Tofu", "Dr. Chen"),
            (1, 9, 15, 45, "Ultrasound", "Ziggy", "Dr. Okafor"),
            (2, 11, 0, 30, "Nail trim", "Peanut", "Dr. Reyes"),
            (3, 16, 0, 90, "Orthopedic consult", "Rex", "Dr. Chen"),
            (4, 23, 0, 120, "Overnight observation", "Shadow", "Dr. Okafor"),
        ];

        let appointments = samples
            .iter()
            .enumerate()
            .filter_map(|(i, (day, hour, minute, length, title, patient, doctor))| {
                let start = (around + Duration::days(*day)).and_hms_opt(*hour, *minute, 0)?;
                Some(
                    Appointment::new(
                        format!("demo-{}", i + 1),
                        start,
                        start + Duration::minutes(*length),
                        *title,
                    )
                    .with_labels(*patient, *doctor),
                )
            })
            .collect();

        Self::new(appointments)
    }

    /// 每次取資料都回傳 `FetchFailure`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            appointments: Vec::new(),
            failure: Some(message.into()),
        }
    }
}

#[async_trait]
impl AppointmentSource for InMemorySource {
    async fn fetch_appointments(&self, range: &DateRange) -> Result<Vec<Appointment>> {
        if let Some(message) = &self.failure {
            return Err(CalendarError::fetch_failure(message.clone()));
        }

        Ok(self
            .appointments
            .iter()
            .filter(|appointment| range.contains(appointment.start))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_by_start() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let inside = Appointment::new(
            "inside",
            day.and_hms_opt(23, 30, 0).unwrap(),
            day.and_hms_opt(23, 59, 0).unwrap(),
            "Late walk-in",
        );
        let outside = Appointment::new(
            "outside",
            day.and_hms_opt(0, 0, 0).unwrap() + Duration::days(1),
            day.and_hms_opt(1, 0, 0).unwrap() + Duration::days(1),
            "Tomorrow",
        );
        let range = DateRange::new(
            day.and_hms_opt(0, 0, 0).unwrap(),
            day.and_hms_opt(0, 0, 0).unwrap() + Duration::days(1),
        );

        let source = InMemorySource::new(vec![inside, outside]);
        let found = tokio_test::block_on(source.fetch_appointments(&range)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.0, "inside");

        let failing = InMemorySource::failing("backend down");
        tokio_test::assert_err!(tokio_test::block_on(failing.fetch_appointments(&range)));
    }

    #[test]
    fn test_demo_week_has_overlaps() {
        let monday = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let source = InMemorySource::demo(monday);
        let range = DateRange::new(
            monday.and_hms_opt(0, 0, 0).unwrap(),
            monday.and_hms_opt(0, 0, 0).unwrap() + Duration::days(1),
        );

        let found = tokio_test::block_on(source.fetch_appointments(&range)).unwrap();
        assert_eq!(found.len(), 4);
        assert!(found[0].overlaps(&found[1]));
    }
}
