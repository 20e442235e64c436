use crate::domain::model::{Appointment, DateRange, ViewMode};
use crate::domain::settings::{GridSettings, HourFormat};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::Serialize;

pub const HOURS_PER_DAY: u32 = 24;

/// 時間軸上的一列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSlot {
    pub hour: u32,
    pub label: String,
    pub top_px: f64,
}

/// 目前時間指示線
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NowMarker {
    pub day_index: usize,
    pub top_px: f64,
}

pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 包含 `anchor` 的那一週的第一天
pub fn week_start(anchor: NaiveDate, week_starts_on: Weekday) -> NaiveDate {
    let offset = (7 + anchor.weekday().num_days_from_sunday()
        - week_starts_on.num_days_from_sunday())
        % 7;
    anchor - Duration::days(i64::from(offset))
}

pub fn visible_days(anchor: NaiveDate, mode: ViewMode, week_starts_on: Weekday) -> Vec<NaiveDate> {
    match mode {
        ViewMode::Day => vec![anchor],
        ViewMode::Week => {
            let first = week_start(anchor, week_starts_on);
            (0..7).map(|offset| first + Duration::days(offset)).collect()
        }
    }
}

/// 可見日期的半開區間 `[第一天午夜, 最後一天隔日午夜)`
pub fn visible_range(anchor: NaiveDate, mode: ViewMode, week_starts_on: Weekday) -> DateRange {
    let first = match mode {
        ViewMode::Day => anchor,
        ViewMode::Week => week_start(anchor, week_starts_on),
    };
    DateRange::new(
        midnight(first),
        midnight(first + Duration::days(mode.step_days())),
    )
}

pub fn hour_label(hour: u32, format: HourFormat) -> String {
    match format {
        HourFormat::H24 => format!("{:02}:00", hour),
        HourFormat::H12 => {
            let suffix = if hour < 12 { "AM" } else { "PM" };
            let display = match hour % 12 {
                0 => 12,
                h => h,
            };
            format!("{} {}", display, suffix)
        }
    }
}

fn slot(hour: u32, settings: &GridSettings) -> TimeSlot {
    TimeSlot {
        hour,
        label: hour_label(hour, settings.hour_format),
        top_px: f64::from(hour) * settings.row_height_px,
    }
}

pub fn time_axis(settings: &GridSettings) -> Vec<TimeSlot> {
    (0..HOURS_PER_DAY).map(|hour| slot(hour, settings)).collect()
}

/// `now` 不在任何可見日期內時回傳 `None`
pub fn now_marker(now: NaiveDateTime, days: &[NaiveDate], row_height_px: f64) -> Option<NowMarker> {
    let day_index = days.iter().position(|day| *day == now.date())?;
    let minutes = f64::from(now.hour() * 60 + now.minute()) + f64::from(now.second()) / 60.0;
    Some(NowMarker {
        day_index,
        top_px: minutes / 60.0 * row_height_px,
    })
}

/// 依 `start` 的日期把預約分到各個可見日；不屬於任何可見日的預約會被略過
pub fn bucket_by_day(appointments: &[Appointment], days: &[NaiveDate]) -> Vec<Vec<Appointment>> {
    let mut buckets: Vec<Vec<Appointment>> = vec![Vec::new(); days.len()];
    for appointment in appointments {
        match days.iter().position(|day| *day == appointment.start.date()) {
            Some(index) => buckets[index].push(appointment.clone()),
            None => tracing::debug!(
                "Appointment {} starts outside the visible days, ignoring",
                appointment.id
            ),
        }
    }
    buckets
}

/// 開啟畫面時要捲動到的那一列：目前時間的前一小時，最早到 0 點
pub fn scroll_hour(now: NaiveDateTime, settings: &GridSettings) -> TimeSlot {
    slot(now.hour().saturating_sub(1), settings)
}
