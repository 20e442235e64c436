use clap::Parser;
use clinic_calendar::app::render::{self, OutputFormat};
use clinic_calendar::config::{self, ResolvedConfig};
use clinic_calendar::core::calendar::{CalendarView, NoticeKind};
use clinic_calendar::domain::ports::{AppointmentSource, Clock};
use clinic_calendar::domain::settings::SourceSettings;
use clinic_calendar::utils::error::{CalendarError, ErrorSeverity};
use clinic_calendar::utils::{logger, validation::Validate};
use clinic_calendar::{CliConfig, FixedClock, InMemorySource, JsonFileSource, RestAppointmentSource, SystemClock};
use std::sync::Arc;
use std::time::Duration;

fn exit_with(e: &CalendarError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn build_source(
    resolved: &ResolvedConfig,
    clock: &dyn Clock,
) -> clinic_calendar::Result<Box<dyn AppointmentSource>> {
    let source: Box<dyn AppointmentSource> = match &resolved.source {
        SourceSettings::Rest(rest) => {
            tracing::info!("🌐 Loading appointments from {}", rest.endpoint);
            Box::new(RestAppointmentSource::new(rest.clone())?)
        }
        SourceSettings::File(file) => {
            tracing::info!("📁 Loading appointments from {}", file.path);
            Box::new(JsonFileSource::new(file.clone())?)
        }
        SourceSettings::Demo => {
            tracing::info!("🧪 Using demo appointments");
            Box::new(InMemorySource::demo(clock.now().date()))
        }
    };
    Ok(source)
}

async fn run<C: Clock + 'static>(
    cli: &CliConfig,
    resolved: &ResolvedConfig,
    clock: C,
) -> anyhow::Result<()> {
    let source = match build_source(resolved, &clock) {
        Ok(source) => source,
        Err(e) => exit_with(&e),
    };

    let mut view = CalendarView::new(Arc::new(source), clock, resolved.grid, resolved.default_view);
    if let Some(date) = cli.date {
        view.go_to(date);
    }

    view.refresh().await;
    if let Some(notice) = &view.state().notice {
        if notice.kind == NoticeKind::FetchFailed {
            tracing::warn!("⚠️ Showing an empty calendar: {}", notice.message);
        }
    }
    tracing::info!(
        "✅ {} appointments in {}",
        view.state().appointment_count(),
        view.state().range
    );

    println!("{}", render::render(view.state(), view.settings(), cli.format)?);

    if !cli.watch {
        return Ok(());
    }

    tracing::info!(
        "⏱️ Watching, current-time marker refreshes every {}s (Ctrl-C to quit)",
        view.settings().tick_seconds
    );
    let mut interval = tokio::time::interval(Duration::from_secs(view.settings().tick_seconds));
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                view.tick();
                if cli.format == OutputFormat::Text {
                    print!("\x1b[2J\x1b[H");
                }
                println!("{}", render::render(view.state(), view.settings(), cli.format)?);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("👋 Stopping");
                break;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let resolved = match config::resolve(&cli) {
        Ok(resolved) => resolved,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, None);
            exit_with(&e);
        }
    };

    if resolved.log_json {
        logger::init_json_logger(cli.verbose, resolved.log_level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, resolved.log_level.as_deref());
    }

    tracing::info!("Starting clinic-calendar");
    tracing::debug!(
        "Grid settings: {:?}, default view: {}",
        resolved.grid,
        resolved.default_view
    );

    if let Err(e) = resolved.validate() {
        exit_with(&e);
    }

    match cli.now {
        Some(now) => {
            tracing::info!("🕒 Clock pinned to {}", now);
            run(&cli, &resolved, FixedClock::new(now)).await
        }
        None => run(&cli, &resolved, SystemClock).await,
    }
}
