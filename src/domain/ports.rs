use crate::domain::model::{Appointment, DateRange, ViewMode};
use crate::domain::settings::{GridSettings, SourceSettings};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;

/// 外部資料來源：回傳 `start` 落在 `[range.start, range.end)` 的預約，順序不保證
#[async_trait]
pub trait AppointmentSource: Send + Sync {
    async fn fetch_appointments(&self, range: &DateRange) -> Result<Vec<Appointment>>;
}

#[async_trait]
impl<T: AppointmentSource + ?Sized> AppointmentSource for Arc<T> {
    async fn fetch_appointments(&self, range: &DateRange) -> Result<Vec<Appointment>> {
        (**self).fetch_appointments(range).await
    }
}

#[async_trait]
impl<T: AppointmentSource + ?Sized> AppointmentSource for Box<T> {
    async fn fetch_appointments(&self, range: &DateRange) -> Result<Vec<Appointment>> {
        (**self).fetch_appointments(range).await
    }
}

/// 可注入的時鐘，測試時用固定時間取代牆上時間
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub trait ConfigProvider: Send + Sync {
    fn source_settings(&self) -> SourceSettings;
    fn grid_settings(&self) -> GridSettings;
    fn default_view(&self) -> ViewMode;
}
