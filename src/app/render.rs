//! 顯示層：把 `ViewState` 轉成終端機文字、JSON 或 CSV。版面計算都在 core 裡完成。

use crate::core::calendar::{DayColumn, Notice, ViewState};
use crate::core::grid::{self, NowMarker, TimeSlot};
use crate::domain::model::{DateRange, LayoutResult, ViewMode};
use crate::domain::settings::{GridSettings, HourFormat};
use crate::utils::error::{CalendarError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown format '{}', expected text, json or csv", other)),
        }
    }
}

/// 匯出用的一列：一筆已配置的預約
#[derive(Debug, Clone, Serialize)]
pub struct PlacedAppointment {
    pub date: NaiveDate,
    pub id: String,
    pub title: String,
    pub patient: String,
    pub doctor: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub group: usize,
    pub lane: usize,
    pub lane_count: usize,
    pub top_px: f64,
    pub height_px: f64,
    pub left_pct: f64,
    pub width_pct: f64,
}

#[derive(Debug, Serialize)]
struct JsonView<'a> {
    mode: ViewMode,
    range: DateRange,
    stale: bool,
    notice: Option<&'a Notice>,
    now_marker: Option<NowMarker>,
    scroll_to: &'a TimeSlot,
    time_axis: Vec<TimeSlot>,
    appointments: Vec<PlacedAppointment>,
}

pub fn render(state: &ViewState, settings: &GridSettings, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(state, settings)),
        OutputFormat::Json => render_json(state, settings),
        OutputFormat::Csv => render_csv(state),
    }
}

pub fn placed_appointments(state: &ViewState) -> Vec<PlacedAppointment> {
    state
        .days
        .iter()
        .flat_map(|day| {
            day.layout
                .iter()
                .filter_map(move |result| placed(day, result))
        })
        .collect()
}

fn placed(day: &DayColumn, result: &LayoutResult) -> Option<PlacedAppointment> {
    let appointment = day.appointment_for(result)?;
    Some(PlacedAppointment {
        date: day.date,
        id: result.id.to_string(),
        title: appointment.title.clone(),
        patient: appointment.patient_label.clone(),
        doctor: appointment.doctor_label.clone(),
        start: appointment.start,
        end: appointment.end,
        group: result.group,
        lane: result.lane,
        lane_count: result.lane_count,
        top_px: result.geometry.top_px,
        height_px: result.geometry.height_px,
        left_pct: result.geometry.left_pct,
        width_pct: result.geometry.width_pct,
    })
}

fn clock_label(at: NaiveDateTime, format: HourFormat) -> String {
    match format {
        HourFormat::H24 => at.format("%H:%M").to_string(),
        HourFormat::H12 => at.format("%-I:%M %p").to_string(),
    }
}

pub fn render_text(state: &ViewState, settings: &GridSettings) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "📅 {} view: {}{}",
        state.mode,
        state.range,
        if state.stale { " (not loaded)" } else { "" }
    );
    if let Some(notice) = &state.notice {
        let _ = writeln!(out, "⚠️  {}", notice.message);
    }

    for (day_index, day) in state.days.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "── {} ──", day.date.format("%a %Y-%m-%d"));

        let marker = state
            .now_marker
            .filter(|marker| marker.day_index == day_index);
        let mut marker_printed = false;

        if day.layout.is_empty() {
            let _ = writeln!(out, "   (no appointments)");
        }

        for result in &day.layout {
            if let Some(marker) = marker {
                if !marker_printed && result.geometry.top_px > marker.top_px {
                    write_now_line(&mut out, day.date, marker, settings);
                    marker_printed = true;
                }
            }

            let Some(appointment) = day.appointment_for(result) else {
                continue;
            };
            let lane = if result.lane_count > 1 {
                format!(" [{}/{}]", result.lane + 1, result.lane_count)
            } else {
                String::new()
            };
            let mut line = format!(
                "   {}-{}{} {}",
                clock_label(appointment.start, settings.hour_format),
                clock_label(appointment.end, settings.hour_format),
                lane,
                appointment.title
            );
            if !appointment.patient_label.is_empty() {
                let _ = write!(line, " · {}", appointment.patient_label);
            }
            if !appointment.doctor_label.is_empty() {
                let _ = write!(line, " · {}", appointment.doctor_label);
            }
            let _ = writeln!(out, "{}", line);
        }

        if let Some(marker) = marker {
            if !marker_printed {
                write_now_line(&mut out, day.date, marker, settings);
            }
        }
    }

    out
}

fn write_now_line(out: &mut String, date: NaiveDate, marker: NowMarker, settings: &GridSettings) {
    let minutes = (marker.top_px / settings.row_height_px * 60.0).floor() as i64;
    let at = grid::midnight(date) + chrono::Duration::minutes(minutes);
    let _ = writeln!(out, "   ▶ now {}", clock_label(at, settings.hour_format));
}

pub fn render_json(state: &ViewState, settings: &GridSettings) -> Result<String> {
    let view = JsonView {
        mode: state.mode,
        range: state.range,
        stale: state.stale,
        notice: state.notice.as_ref(),
        now_marker: state.now_marker,
        scroll_to: &state.scroll_to,
        time_axis: grid::time_axis(settings),
        appointments: placed_appointments(state),
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

pub fn render_csv(state: &ViewState) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in placed_appointments(state) {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CalendarError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
