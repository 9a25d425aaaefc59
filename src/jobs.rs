/// Background job scheduler
use crate::context::AppContext;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::info;

/// Job scheduler for background tasks
pub struct JobScheduler {
    context: Arc<AppContext>,
}

impl JobScheduler {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    /// Start all background jobs
    pub fn start(self: Arc<Self>) {
        info!("Starting background job scheduler");

        tokio::spawn(Self::expired_session_sweep_job(Arc::clone(&self)));

        info!("Background jobs started");
    }

    /// Sweep expired sessions (runs every 15 minutes)
    async fn expired_session_sweep_job(scheduler: Arc<Self>) {
        let mut interval = interval(Duration::from_secs(900));

        loop {
            interval.tick().await;

            let removed = scheduler.context.sessions.sweep_expired().await;
            if removed > 0 {
                info!("Swept {} expired sessions", removed);
            }
        }
    }
}
