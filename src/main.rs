//! cf-reminder - Codeforces contest reminder daemon
//! 
//! This is the main entry point for the cf-reminder application.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::{info, warn};

use cf_reminder::{
    api::create_router,
    clock::{Clock, SystemClock},
    config::{Config, NotifierKind},
    directory::{CodeforcesClient, ContestDirectory},
    scheduler::{ReminderScheduler, SchedulerCommand},
    services::{check_notify_send_available, AlarmSchedule, DesktopNotifier, LogNotifier, Notifier, TokioAlarms},
    state::AppState,
    storage::{JsonFileStore, ReminderStore},
    tasks::reminder_scheduler_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("cf_reminder={},tower_http=info", config.log_level()))
        .init();

    let state_file = Arc::new(JsonFileStore::new(config.state_path()));
    info!("Starting cf-reminder v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, state={}, poll every {}h",
          config.host, config.port, state_file.path().display(), config.poll_period().as_secs() / 3600);

    let notifier: Arc<dyn Notifier> = match config.notifier {
        NotifierKind::Desktop => match check_notify_send_available().await {
            Ok(()) => Arc::new(DesktopNotifier::new("cf-reminder")),
            Err(e) => {
                warn!("{}", e);
                Arc::new(LogNotifier)
            }
        },
        NotifierKind::Log => Arc::new(LogNotifier),
    };

    let directory: Arc<dyn ContestDirectory> =
        Arc::new(CodeforcesClient::new(config.api_base.clone(), config.request_timeout())?);
    let store = ReminderStore::new(state_file);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (events_tx, events_rx) = mpsc::channel(64);
    let alarms = Arc::new(TokioAlarms::new(events_tx.clone(), Arc::clone(&clock)));

    let scheduler = ReminderScheduler::new(
        Arc::clone(&directory),
        store,
        alarms,
        notifier,
        clock,
        AlarmSchedule::Every {
            delay: config.poll_delay(),
            period: config.poll_period(),
        },
    );

    // Create application state
    let state = Arc::new(AppState::new(events_tx, directory, config.port, config.host.clone()));

    // Start the reminder scheduler background task
    let scheduler_state = Arc::clone(&state);
    tokio::spawn(async move {
        reminder_scheduler_task(scheduler, events_rx, scheduler_state).await;
    });

    if config.enable {
        match state.send_command(SchedulerCommand::Enable).await {
            Ok(outcome) => info!("Reminders enabled at startup ({})", outcome.status.phase),
            Err(e) => warn!("Failed to enable reminders at startup: {}", e),
        }
    }

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;
    
    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /reminders/enable  - Turn contest reminders on");
    info!("  POST /reminders/disable - Turn contest reminders off");
    info!("  GET  /contest/next      - Show the next upcoming contest");
    info!("  GET  /status            - Check reminder status");
    info!("  GET  /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);
    
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
