use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 預約的不透明識別碼
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub String);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppointmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub title: String,
    pub patient_label: String,
    pub doctor_label: String,
}

impl Appointment {
    pub fn new(
        id: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: AppointmentId(id.into()),
            start,
            end,
            title: title.into(),
            patient_label: String::new(),
            doctor_label: String::new(),
        }
    }

    pub fn with_labels(mut self, patient: impl Into<String>, doctor: impl Into<String>) -> Self {
        self.patient_label = patient.into();
        self.doctor_label = doctor.into();
        self
    }

    pub fn is_valid_interval(&self) -> bool {
        self.end > self.start
    }

    /// 半開區間重疊判斷：端點相接不算重疊
    pub fn overlaps(&self, other: &Appointment) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// 一筆預約在 24 小時網格上的位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub top_px: f64,
    pub height_px: f64,
    pub left_pct: f64,
    pub width_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    /// 在呼叫者輸入切片中的位置
    pub index: usize,
    pub id: AppointmentId,
    pub group: usize,
    pub lane: usize,
    pub lane_count: usize,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Week,
    Day,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Week => Self::Day,
            Self::Day => Self::Week,
        }
    }

    pub fn step_days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Day => 1,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Week => f.write_str("week"),
            Self::Day => f.write_str("day"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "day" => Ok(Self::Day),
            other => Err(format!("unknown view mode '{}', expected week or day", other)),
        }
    }
}

/// 半開時間區間 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at < self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}
