use std::sync::OnceLock;

use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

pub(crate) const ATTEMPTS_STARTED: &str = "exam_attempts_started_total";
pub(crate) const SUBMISSIONS: &str = "exam_submissions_total";
pub(crate) const DRAFT_SAVES_THROTTLED: &str = "draft_saves_throttled_total";

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    describe();
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

fn describe() {
    describe_counter!("http_requests_total", "HTTP responses by status code");
    describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request latency by status code"
    );
    describe_counter!(ATTEMPTS_STARTED, "Exam attempts that received a start timestamp");
    describe_counter!(SUBMISSIONS, "Finalized exam attempts by submission mode");
    describe_counter!(DRAFT_SAVES_THROTTLED, "Draft writes rejected by the rate limiter");
}
