use chrono::NaiveDate;
use clinic_calendar::core::calendar::{CalendarView, NoticeKind};
use clinic_calendar::domain::ports::AppointmentSource;
use clinic_calendar::domain::settings::RestSettings;
use clinic_calendar::{
    CalendarError, DateRange, FixedClock, GridSettings, RestAppointmentSource, ViewMode,
};
use httpmock::prelude::*;
use std::sync::Arc;

fn settings(endpoint: String, api_key: Option<&str>) -> RestSettings {
    RestSettings {
        endpoint,
        api_key: api_key.map(str::to_string),
        timeout_seconds: 5,
        start_column: "start_time".to_string(),
        utc_offset_minutes: 0,
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_range_filter_and_auth_headers() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/appointments")
            .query_param("select", "*")
            .query_param("start_time", "gte.2024-05-06T00:00:00+00:00")
            .query_param("start_time", "lt.2024-05-07T00:00:00+00:00")
            .header("apikey", "anon-key")
            .header("authorization", "Bearer anon-key");
        then.status(200).json_body(serde_json::json!([
            {
                "id": 7,
                "start_time": "2024-05-06T10:00:00+00:00",
                "end_time": "2024-05-06T12:00:00+00:00",
                "title": "Dental",
                "patient_name": "Mochi",
                "doctor_name": "Dr. Chen"
            },
            {
                "id": 3,
                "start_time": "2024-05-06T09:00:00+00:00",
                "end_time": "2024-05-06T11:00:00+00:00",
                "title": "Spay",
                "patient_name": "Biscuit",
                "doctor_name": "Dr. Reyes"
            }
        ]));
    });

    let source = RestAppointmentSource::new(settings(
        server.url("/rest/v1/appointments"),
        Some("anon-key"),
    ))
    .unwrap();

    let range = DateRange::new(
        monday().and_hms_opt(0, 0, 0).unwrap(),
        monday().and_hms_opt(0, 0, 0).unwrap() + chrono::Duration::days(1),
    );
    let appointments = source.fetch_appointments(&range).await.unwrap();

    api_mock.assert();
    assert_eq!(appointments.len(), 2);
    assert_eq!(appointments[0].id.0, "7");
    assert_eq!(appointments[1].patient_label, "Biscuit");
}

#[tokio::test]
async fn test_server_error_becomes_fetch_failure() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/appointments");
        then.status(500).body("database unavailable");
    });

    let source =
        RestAppointmentSource::new(settings(server.url("/rest/v1/appointments"), None)).unwrap();
    let range = DateRange::new(
        monday().and_hms_opt(0, 0, 0).unwrap(),
        monday().and_hms_opt(0, 0, 0).unwrap() + chrono::Duration::days(1),
    );

    let err = source.fetch_appointments(&range).await.unwrap_err();
    api_mock.assert();
    assert!(matches!(err, CalendarError::FetchFailure { .. }));
    assert!(err.to_string().contains("500"));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_end_to_end_week_view_over_http() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/appointments")
            .query_param("start_time", "gte.2024-05-05T00:00:00+00:00")
            .query_param("start_time", "lt.2024-05-12T00:00:00+00:00");
        then.status(200).json_body(serde_json::json!([
            {"id": "a", "start_time": "2024-05-06T09:00:00Z", "end_time": "2024-05-06T11:00:00Z", "title": "Spay"},
            {"id": "b", "start_time": "2024-05-06T09:30:00Z", "end_time": "2024-05-06T10:30:00Z", "title": "Exam"},
            {"id": "c", "start_time": "2024-05-06T10:00:00Z", "end_time": "2024-05-06T12:00:00Z", "title": "Dental"},
            {"id": "d", "start_time": "2024-05-09T14:00:00Z", "end_time": "2024-05-09T15:00:00Z", "title": "Recheck"}
        ]));
    });

    let source = Arc::new(
        RestAppointmentSource::new(settings(server.url("/rest/v1/appointments"), None)).unwrap(),
    );
    let clock = FixedClock::new(monday().and_hms_opt(8, 0, 0).unwrap());
    let mut view = CalendarView::new(source, clock, GridSettings::default(), ViewMode::Week);

    assert!(view.refresh().await);
    api_mock.assert();

    let state = view.state();
    assert!(state.notice.is_none());
    assert_eq!(state.appointment_count(), 4);

    let monday_column = &state.days[1];
    assert_eq!(monday_column.layout.len(), 3);
    for result in &monday_column.layout {
        assert_eq!(result.lane_count, 3);
        assert!((result.geometry.width_pct - 100.0 / 3.0).abs() < 1e-9);
    }

    let thursday_column = &state.days[4];
    assert_eq!(thursday_column.layout[0].geometry.width_pct, 100.0);
}

#[tokio::test]
async fn test_unreachable_backend_renders_empty_week() {
    // 沒有任何服務在這個埠上
    let source = Arc::new(
        RestAppointmentSource::new(settings("http://127.0.0.1:9/appointments".to_string(), None))
            .unwrap(),
    );
    let clock = FixedClock::new(monday().and_hms_opt(8, 0, 0).unwrap());
    let mut view = CalendarView::new(source, clock, GridSettings::default(), ViewMode::Week);

    assert!(view.refresh().await);
    let state = view.state();
    assert_eq!(state.days.len(), 7);
    assert_eq!(state.appointment_count(), 0);
    assert_eq!(state.notice.as_ref().map(|n| n.kind), Some(NoticeKind::FetchFailed));
}
