use std::collections::BTreeMap;

use serde::Serialize;

pub(crate) mod taking;

/// Ordered from best to worst so the overall status is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: &'static str,
    pub(crate) status: HealthStatus,
    pub(crate) components: BTreeMap<&'static str, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) docs_url: String,
}

#[cfg(test)]
mod tests {
    use super::HealthStatus;

    #[test]
    fn worst_component_wins() {
        assert_eq!(HealthStatus::Healthy.max(HealthStatus::Degraded), HealthStatus::Degraded);
        assert_eq!(HealthStatus::Unhealthy.max(HealthStatus::Degraded), HealthStatus::Unhealthy);
        assert_eq!(serde_json::to_value(HealthStatus::Degraded).unwrap(), "degraded");
    }
}
