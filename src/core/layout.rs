//! 預約版面配置引擎
//!
//! 純函式：給定某一天的預約清單，算出每筆預約所在的重疊群組、欄位 (lane)
//! 以及在 24 小時網格上的位置。不做 I/O，也不依日期過濾，呼叫者要先把
//! 不屬於這一天的預約排除。

use crate::domain::model::{Appointment, Geometry, LayoutResult};
use crate::domain::settings::DEFAULT_ROW_HEIGHT_PX;
use crate::utils::error::CalendarError;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub row_height_px: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            row_height_px: DEFAULT_ROW_HEIGHT_PX,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    group: usize,
    lane: usize,
    lane_count: usize,
}

/// 以預設列高配置一天的預約
pub fn layout_day(appointments: &[Appointment], day_start: NaiveDateTime) -> Vec<LayoutResult> {
    layout_day_with(appointments, day_start, &LayoutOptions::default())
}

/// 配置一天的預約。`end <= start` 的預約會被略過並記錄警告。
///
/// 輸出依開始時間排序（同時開始者保留輸入順序），每筆有效輸入恰好出現一次。
pub fn layout_day_with(
    appointments: &[Appointment],
    day_start: NaiveDateTime,
    options: &LayoutOptions,
) -> Vec<LayoutResult> {
    let mut order: Vec<usize> = (0..appointments.len())
        .filter(|&i| {
            let appointment = &appointments[i];
            if !appointment.is_valid_interval() {
                tracing::warn!(
                    "⚠️ Skipping appointment {} with invalid interval {} -> {}",
                    appointment.id,
                    appointment.start,
                    appointment.end
                );
                return false;
            }
            true
        })
        .collect();

    // sort_by_key 是穩定排序
    order.sort_by_key(|&i| appointments[i].start);

    let groups = group_overlaps(appointments, &order);

    let mut placements: Vec<Option<Placement>> = vec![None; appointments.len()];
    for (group_index, members) in groups.iter().enumerate() {
        let lanes = assign_lanes(appointments, members);
        let lane_count = lanes.iter().copied().max().map_or(1, |max| max + 1);
        for (&member, &lane) in members.iter().zip(lanes.iter()) {
            placements[member] = Some(Placement {
                group: group_index,
                lane,
                lane_count,
            });
        }
    }

    order
        .iter()
        .filter_map(|&i| {
            let placement = placements[i]?;
            let appointment = &appointments[i];
            Some(LayoutResult {
                index: i,
                id: appointment.id.clone(),
                group: placement.group,
                lane: placement.lane,
                lane_count: placement.lane_count,
                geometry: geometry_for(appointment, day_start, placement, options.row_height_px),
            })
        })
        .collect()
}

/// 依序把每筆預約放進第一個有成員與之重疊的群組，否則開新群組
fn group_overlaps(appointments: &[Appointment], order: &[usize]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for &current in order {
        let appointment = &appointments[current];
        let existing = groups.iter_mut().find(|group| {
            group
                .iter()
                .any(|&member| appointments[member].overlaps(appointment))
        });

        match existing {
            Some(group) => group.push(current),
            None => groups.push(vec![current]),
        }
    }

    groups
}

/// 群組內 first-fit：取與之重疊的已配置成員沒有占用的最小欄位
fn assign_lanes(appointments: &[Appointment], members: &[usize]) -> Vec<usize> {
    let mut lanes: Vec<usize> = Vec::with_capacity(members.len());

    for (position, &member) in members.iter().enumerate() {
        let appointment = &appointments[member];
        let occupied: Vec<usize> = members[..position]
            .iter()
            .zip(lanes.iter())
            .filter(|&(&placed, _)| appointments[placed].overlaps(appointment))
            .map(|(_, &lane)| lane)
            .collect();

        let lane = (0..).find(|lane| !occupied.contains(lane)).unwrap_or(0);
        lanes.push(lane);
    }

    lanes
}

fn geometry_for(
    appointment: &Appointment,
    day_start: NaiveDateTime,
    placement: Placement,
    row_height_px: f64,
) -> Geometry {
    let minutes_from_midnight = (appointment.start - day_start).num_seconds() as f64 / 60.0;
    // 跨午夜的預約不截斷，可能超出網格底部
    let duration_minutes = appointment.duration().num_seconds() as f64 / 60.0;

    let (left_pct, width_pct) = if placement.lane_count == 1 {
        (0.0, 100.0)
    } else {
        let width = 100.0 / placement.lane_count as f64;
        (placement.lane as f64 * width, width)
    };

    Geometry {
        top_px: minutes_from_midnight / 60.0 * row_height_px,
        height_px: duration_minutes / 60.0 * row_height_px,
        left_pct,
        width_pct,
    }
}

/// 把預約分成有效與無效兩組，無效者轉成 `InvalidInterval` 錯誤供畫面提示
pub fn partition_valid(appointments: &[Appointment]) -> (Vec<&Appointment>, Vec<CalendarError>) {
    let mut valid = Vec::with_capacity(appointments.len());
    let mut rejected = Vec::new();

    for appointment in appointments {
        if appointment.is_valid_interval() {
            valid.push(appointment);
        } else {
            rejected.push(CalendarError::InvalidInterval {
                id: appointment.id.to_string(),
                start: appointment.start,
                end: appointment.end,
            });
        }
    }

    (valid, rejected)
}
