use color_eyre::{eyre::eyre, Result};
use padcanon::backend::GilrsBackend;
use padcanon::{ConnectionStatus, ControllerConfig, ControllerHandle};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = match ControllerConfig::default_path() {
        Ok(path) => ControllerConfig::load_or_default(&path)?,
        Err(e) => {
            warn!("{}, using default settings", e);
            ControllerConfig::default()
        }
    };
    let tick_interval = Duration::from_millis(config.settings.tick_interval_ms.max(1));

    info!("Initializing controller");
    let mut controller = ControllerHandle::from_config(config);
    let mut status = controller.connection_status();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow().clone();
            match current {
                ConnectionStatus::Connected {
                    device_id,
                    mapped: false,
                    ..
                } => warn!("No layout registered for {:?}", device_id),
                other => info!("Connection status: {:?}", other),
            }
        }
    });

    let mut backend =
        GilrsBackend::new().map_err(|e| eyre!("Failed to start gamepad backend: {}", e))?;
    backend.attach_existing(&mut controller);

    controller.subscribe_with(|event| {
        if let Some(action) = &event.input {
            info!("Input: {}", action);
        }
    });

    let mut throttled = controller.throttled_events();
    tokio::spawn(async move {
        while let Some(event) = throttled.recv().await {
            if let Some(action) = event.input {
                info!("Throttled input: {}", action);
            }
        }
    });

    let mut ticker = tokio::time::interval(tick_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    info!("Running, press Ctrl-C to quit");
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
            _ = ticker.tick() => {
                backend.pump(&mut controller);
                controller.tick();
            }
        }
    }

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_env_filter(log_filter())
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_follows_rust_log() {
        std::env::set_var("RUST_LOG", "padcanon=debug");
        assert_eq!(log_filter().to_string(), "padcanon=debug");
    }
}
