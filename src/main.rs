use daily_activities::{
    ActivityRepository, AppState, Config, JsonFileStore,
    channels::{BrowserFeed, ReminderChannels},
    clock::SystemClock,
    reminder::ReminderScheduler,
    rollover::RolloverScheduler,
    router,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();

    let store = Arc::new(JsonFileStore::new(config.data_path.clone()));
    info!(data_path = %store.path().display(), "loading activities");
    let repository = ActivityRepository::new(store);
    let existing = repository.list().await?;
    info!(count = existing.len(), "activities loaded");

    let clock = Arc::new(SystemClock);
    let feed = Arc::new(
        BrowserFeed::new(config.notification_permission)
            .with_prompt_timeout(config.permission_prompt),
    );

    #[cfg(feature = "audio")]
    let channels = ReminderChannels {
        audio: Arc::new(daily_activities::channels::RodioPlayer),
        ..ReminderChannels::browser(feed.clone())
    };
    #[cfg(not(feature = "audio"))]
    let channels = ReminderChannels::browser(feed.clone());

    let reminders = ReminderScheduler::new(repository.clone(), channels, clock.clone())
        .with_interval(config.reminder_interval)
        .with_alarm_sound(config.alarm_sound.clone());
    let reminder_task = reminders.spawn();
    let rollover_task = RolloverScheduler::new(repository.clone()).spawn();

    let app = router(AppState::new(repository, feed, clock, None));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reminder_task.abort();
    rollover_task.abort();
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
