use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 優先順序：RUST_LOG > 設定檔的 level > verbose 旗標
fn default_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if let Some(level) = level {
            EnvFilter::new(format!("clinic_calendar={},warn", level))
        } else if verbose {
            EnvFilter::new("clinic_calendar=debug,info")
        } else {
            EnvFilter::new("clinic_calendar=info,warn")
        }
    })
}

pub fn init_cli_logger(verbose: bool, level: Option<&str>) {
    // 日誌寫到 stderr，避免和輸出的日曆混在一起
    tracing_subscriber::registry()
        .with(default_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(default_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}
