use crate::domain::model::ViewMode;
use crate::domain::ports::Clock;
use chrono::{Duration, NaiveDate};

/// 日曆的導覽狀態：檢視模式與錨點日期。模式只會因明確的切換而改變。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    mode: ViewMode,
    anchor: NaiveDate,
}

impl Navigator {
    pub fn new(mode: ViewMode, anchor: NaiveDate) -> Self {
        Self { mode, anchor }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn prev(&mut self) {
        self.anchor -= Duration::days(self.mode.step_days());
    }

    pub fn next(&mut self) {
        self.anchor += Duration::days(self.mode.step_days());
    }

    pub fn today(&mut self, clock: &dyn Clock) {
        self.anchor = clock.now().date();
    }

    pub fn go_to(&mut self, date: NaiveDate) {
        self.anchor = date;
    }
}
