use miftah::config::DashboardConfig;
use miftah::feed::ActivityFeedSimulator;
use miftah::metrics::{MetricLoad, MetricsSampler};
use miftah::session::{FileSessionStore, SessionGate, StaticCredentials};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging/tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("MIFTAH command center booting...");

    let config = DashboardConfig::load()?;
    if config.session.uses_dev_credentials() {
        tracing::warn!("Using development credentials; set MIFTAH_USERNAME/MIFTAH_PASSWORD");
    }

    // Session gate over the on-disk flag
    let store = FileSessionStore::new(config.session.state_dir.clone());
    let verifier = StaticCredentials::from_config(&config.session);
    let mut gate = SessionGate::new(Box::new(verifier), Box::new(store));

    if !gate.check_session() {
        let username = config.session.username.clone();
        let password = config.session.password.clone();
        if !gate.authenticate(&username, &password) {
            anyhow::bail!("login rejected; dashboard stays locked");
        }
    }

    // Mount panels
    let mut feed = ActivityFeedSimulator::new(config.feed.clone());
    let mut sampler = MetricsSampler::new(config.metrics.clone());
    let mut records = feed.subscribe();
    let mut samples = sampler.subscribe();
    feed.start();
    sampler.start();

    tracing::info!("Dashboard live. Press Ctrl+C to stop.");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            received = records.recv() => match received {
                Ok(record) => tracing::info!("[LOG] {}", record),
                Err(RecvError::Lagged(n)) => tracing::warn!("Log view lagged, {} records skipped", n),
                Err(RecvError::Closed) => break,
            },
            changed = samples.changed() => {
                if changed.is_err() {
                    break;
                }
                let sample = *samples.borrow_and_update();
                tracing::info!("[METRICS] {}", sample);
                for (kind, value) in sample.fields() {
                    if sample.load(kind) == MetricLoad::Critical {
                        tracing::warn!("{} critical at {}%", kind.label(), value);
                    }
                }
            }
        }
    }

    // Unmount
    feed.stop();
    sampler.stop();

    let counts = feed.level_counts();
    for (level, count) in counts.iter() {
        tracing::info!("{}: {}", level, count);
    }

    if std::env::var_os("MIFTAH_LOGOUT").is_some() {
        gate.logout();
    }

    tracing::info!("MIFTAH shut down.");
    Ok(())
}
