use std::sync::OnceLock;

use opentelemetry::{global, metrics::Counter};
use prometheus::{IntGaugeVec, Opts};

pub struct Metrics {
    pub builds_triggered: Counter<u64>,
    pub job_lookups: Counter<u64>,
    pub subscription_status: IntGaugeVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

pub fn init(registry: &prometheus::Registry) -> Result<(), anyhow::Error> {
    let meter = global::meter("travis");

    let subscription_status = IntGaugeVec::new(
        Opts::new(
            "travis_subscription_up",
            "Whether the job of a subscription could be read from Travis",
        ),
        &["subscription"],
    )?;
    registry.register(Box::new(subscription_status.clone()))?;

    let metrics = Metrics {
        builds_triggered: meter.u64_counter("travis_builds_triggered_total").init(),
        job_lookups: meter.u64_counter("travis_job_lookups_total").init(),
        subscription_status,
    };

    METRICS
        .set(metrics)
        .map_err(|_| anyhow::anyhow!("Metrics already initialized"))?;

    Ok(())
}

/// The metrics, once [`init`] ran. Tests run without them.
pub fn get() -> Option<&'static Metrics> {
    METRICS.get()
}

/// Record whether the job of `subscription` answered its last status check.
pub fn record_subscription_up(subscription: i64, up: bool) {
    if let Some(metrics) = get() {
        metrics
            .subscription_status
            .with_label_values(&[&subscription.to_string()])
            .set(i64::from(up));
    }
}
