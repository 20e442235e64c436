//! 日曆檢視：依導覽狀態向資料來源取回可見範圍的預約，交給版面引擎逐日配置。
//!
//! 每次取資料都帶有一個遞增的 generation；回來的結果若不是最新一次的請求，
//! 或範圍已經不是目前可見的範圍，就直接丟棄。取資料失敗時顯示空的日曆
//! 並留下一則提示，不會讓錯誤往上傳。

use crate::core::grid::{self, NowMarker, TimeSlot};
use crate::core::layout::{layout_day_with, partition_valid, LayoutOptions};
use crate::core::navigation::Navigator;
use crate::domain::model::{Appointment, DateRange, LayoutResult, ViewMode};
use crate::domain::ports::{AppointmentSource, Clock};
use crate::domain::settings::GridSettings;
use crate::utils::error::{CalendarError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    FetchFailed,
    InvalidAppointments,
}

/// 非阻斷式的提示訊息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn fetch_failed(error: &CalendarError) -> Self {
        Self {
            kind: NoticeKind::FetchFailed,
            message: format!("{} ({})", error.user_friendly_message(), error),
        }
    }

    fn invalid_appointments(rejected: &[CalendarError]) -> Self {
        Self {
            kind: NoticeKind::InvalidAppointments,
            message: format!(
                "{} appointment(s) skipped because they end before they start",
                rejected.len()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub appointments: Vec<Appointment>,
    pub layout: Vec<LayoutResult>,
}

impl DayColumn {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            appointments: Vec::new(),
            layout: Vec::new(),
        }
    }

    /// 依 `LayoutResult::index` 找回對應的預約
    pub fn appointment_for(&self, result: &LayoutResult) -> Option<&Appointment> {
        self.appointments.get(result.index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub mode: ViewMode,
    pub range: DateRange,
    pub days: Vec<DayColumn>,
    pub now_marker: Option<NowMarker>,
    /// 開啟畫面時要捲動到的時間列
    pub scroll_to: TimeSlot,
    pub notice: Option<Notice>,
    /// 目前畫面資料來自哪一次請求
    pub loaded_generation: Option<u64>,
    /// 導覽後尚未重新取資料
    pub stale: bool,
}

impl ViewState {
    pub fn appointment_count(&self) -> usize {
        self.days.iter().map(|day| day.layout.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub range: DateRange,
}

/// 已發出、尚未套用的請求。`resolve` 不借用檢視本身，可以在導覽的同時等待。
pub struct PendingFetch<S: AppointmentSource> {
    source: Arc<S>,
    ticket: FetchTicket,
}

impl<S: AppointmentSource> PendingFetch<S> {
    pub fn ticket(&self) -> FetchTicket {
        self.ticket
    }

    pub async fn resolve(self) -> FetchOutcome {
        tracing::debug!(
            "Fetching appointments for {} (generation {})",
            self.ticket.range,
            self.ticket.generation
        );
        let result = self.source.fetch_appointments(&self.ticket.range).await;
        FetchOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

pub struct FetchOutcome {
    ticket: FetchTicket,
    result: Result<Vec<Appointment>>,
}

impl FetchOutcome {
    pub fn ticket(&self) -> FetchTicket {
        self.ticket
    }
}

pub struct CalendarView<S: AppointmentSource, C: Clock> {
    source: Arc<S>,
    clock: C,
    settings: GridSettings,
    navigator: Navigator,
    latest_generation: u64,
    state: ViewState,
}

impl<S: AppointmentSource, C: Clock> CalendarView<S, C> {
    /// 以時鐘的今天為錨點建立檢視
    pub fn new(source: Arc<S>, clock: C, settings: GridSettings, mode: ViewMode) -> Self {
        let anchor = clock.now().date();
        Self::with_anchor(source, clock, settings, mode, anchor)
    }

    pub fn with_anchor(
        source: Arc<S>,
        clock: C,
        settings: GridSettings,
        mode: ViewMode,
        anchor: NaiveDate,
    ) -> Self {
        let navigator = Navigator::new(mode, anchor);
        let range = grid::visible_range(anchor, mode, settings.week_starts_on);
        let scroll_to = grid::scroll_hour(clock.now(), &settings);
        let mut view = Self {
            source,
            clock,
            settings,
            navigator,
            latest_generation: 0,
            state: ViewState {
                mode,
                range,
                days: Vec::new(),
                now_marker: None,
                scroll_to,
                notice: None,
                loaded_generation: None,
                stale: true,
            },
        };
        view.reset_columns();
        view
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest_generation
    }

    pub fn visible_days(&self) -> Vec<NaiveDate> {
        grid::visible_days(
            self.navigator.anchor(),
            self.navigator.mode(),
            self.settings.week_starts_on,
        )
    }

    pub fn visible_range(&self) -> DateRange {
        grid::visible_range(
            self.navigator.anchor(),
            self.navigator.mode(),
            self.settings.week_starts_on,
        )
    }

    /// 發出新的請求；之前所有尚未套用的請求都會變成過期
    pub fn begin_fetch(&mut self) -> PendingFetch<S> {
        self.latest_generation += 1;
        PendingFetch {
            source: Arc::clone(&self.source),
            ticket: FetchTicket {
                generation: self.latest_generation,
                range: self.visible_range(),
            },
        }
    }

    /// 套用請求結果。過期的結果回傳 `false` 且不改變畫面。
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        let FetchOutcome { ticket, result } = outcome;

        if ticket.generation != self.latest_generation || ticket.range != self.visible_range() {
            tracing::debug!(
                "Discarding stale appointments for {} (generation {}, latest {})",
                ticket.range,
                ticket.generation,
                self.latest_generation
            );
            return false;
        }

        match result {
            Ok(appointments) => {
                tracing::debug!(
                    "Loaded {} appointments for {}",
                    appointments.len(),
                    ticket.range
                );
                self.populate(&appointments);
            }
            Err(e) => {
                tracing::warn!("❌ Failed to load appointments for {}: {}", ticket.range, e);
                self.reset_columns();
                self.state.notice = Some(Notice::fetch_failed(&e));
            }
        }

        self.state.loaded_generation = Some(ticket.generation);
        self.state.stale = false;
        true
    }

    /// 取資料並立即套用
    pub async fn refresh(&mut self) -> bool {
        let pending = self.begin_fetch();
        let outcome = pending.resolve().await;
        self.apply(outcome)
    }

    pub fn prev(&mut self) {
        self.navigator.prev();
        self.invalidate();
    }

    pub fn next(&mut self) {
        self.navigator.next();
        self.invalidate();
    }

    pub fn today(&mut self) {
        self.navigator.today(&self.clock);
        self.invalidate();
    }

    pub fn go_to(&mut self, date: NaiveDate) {
        self.navigator.go_to(date);
        self.invalidate();
    }

    pub fn toggle_mode(&mut self) {
        self.navigator.toggle_mode();
        self.invalidate();
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.navigator.mode() != mode {
            self.navigator.set_mode(mode);
            self.invalidate();
        }
    }

    /// 只重算目前時間指示線，不會重新取資料
    pub fn tick(&mut self) {
        let now = self.clock.now();
        let days: Vec<NaiveDate> = self.state.days.iter().map(|day| day.date).collect();
        self.state.now_marker = grid::now_marker(now, &days, self.settings.row_height_px);
        self.state.scroll_to = grid::scroll_hour(now, &self.settings);
    }

    pub fn dismiss_notice(&mut self) {
        self.state.notice = None;
    }

    fn invalidate(&mut self) {
        self.reset_columns();
        self.state.stale = true;
        self.state.loaded_generation = None;
    }

    fn reset_columns(&mut self) {
        self.state.mode = self.navigator.mode();
        self.state.range = self.visible_range();
        self.state.days = self
            .visible_days()
            .into_iter()
            .map(DayColumn::empty)
            .collect();
        self.state.notice = None;
        self.tick();
    }

    fn populate(&mut self, appointments: &[Appointment]) {
        let (_, rejected) = partition_valid(appointments);
        let days = self.visible_days();
        let buckets = grid::bucket_by_day(appointments, &days);
        let options = LayoutOptions {
            row_height_px: self.settings.row_height_px,
        };

        self.state.days = days
            .into_iter()
            .zip(buckets)
            .map(|(date, appointments)| {
                let layout = layout_day_with(&appointments, grid::midnight(date), &options);
                DayColumn {
                    date,
                    appointments,
                    layout,
                }
            })
            .collect();

        self.state.mode = self.navigator.mode();
        self.state.range = self.visible_range();
        self.state.notice = if rejected.is_empty() {
            None
        } else {
            Some(Notice::invalid_appointments(&rejected))
        };
        self.tick();
    }
}
