//! Guest session watcher.
//!
//! Restores the stored guest session of the configured scope, confirms it
//! with the server, then keeps the liveness and verification pollers running
//! until the session is invalidated or the process is interrupted.

use std::sync::Arc;

use guest_session::adapters::{
    FileSessionStorage, HttpGuestApi, Sha256Fingerprinter, SwitchableScopeProvider,
};
use guest_session::application::{GuestCoreDeps, GuestSessionCore};
use guest_session::config::AppConfig;
use guest_session::domain::guest::GuestError;
use guest_session::telemetry;
use tokio::time::{self, MissedTickBehavior};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    telemetry::init_tracing(&config.runtime);

    let api = Arc::new(HttpGuestApi::new(config.api.client_config())?);
    let scopes = Arc::new(SwitchableScopeProvider::new());
    scopes.set(config.scope.active_scope());

    let core = GuestSessionCore::new(
        GuestCoreDeps {
            api: api.clone(),
            admin: api,
            storage: Arc::new(FileSessionStorage::new(&config.storage.data_dir)),
            scopes,
            fingerprinter: Arc::new(Sha256Fingerprinter::from_host()),
        },
        config.polling.intervals(),
    );

    match core.hydrate().await {
        Ok(_) => {}
        Err(GuestError::NoActiveScope) => {
            tracing::warn!("no project configured; set GUEST_SESSION__SCOPE__PROJECT_ID");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    if !core.validate_stored_session().await {
        tracing::info!("no valid guest session for this scope");
        return Ok(());
    }

    let mut invalidations = core.invalidations();
    core.start_liveness_polling();
    if core.is_pending() {
        core.start_verification_polling();
    }
    if let Some(guest) = core.current() {
        tracing::info!(
            name = %guest.display_name,
            pending = core.is_pending(),
            "watching guest session"
        );
    }

    let mut heartbeat = config.polling.heartbeat_interval().map(|period| {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping pollers");
                break;
            }
            event = invalidations.recv() => {
                if let Ok(event) = event {
                    tracing::warn!(reason = %event.reason, message = %event.message, "guest session ended");
                }
                break;
            }
            Some(_) = tick(heartbeat.as_mut()) => {
                core.send_heartbeat().await;
            }
        }
    }

    core.stop_liveness_polling();
    core.stop_verification_polling();
    Ok(())
}

async fn tick(ticker: Option<&mut time::Interval>) -> Option<time::Instant> {
    match ticker {
        Some(ticker) => Some(ticker.tick().await),
        None => std::future::pending().await,
    }
}
