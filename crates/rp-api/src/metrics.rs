//! Prometheus counters exposed on `/metrics`.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Outcome {
    Ok,
    Error,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub route: String,
    pub outcome: Outcome,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Lookup {
    Hit,
    Miss,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CacheLabels {
    pub result: Lookup,
}

pub struct Metrics {
    registry: Registry,
    requests: Family<RequestLabels, Counter>,
    insight_cache: Family<CacheLabels, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("repute");
        let requests = Family::<RequestLabels, Counter>::default();
        registry.register("http_requests", "Handled API requests by route and outcome", requests.clone());
        let insight_cache = Family::<CacheLabels, Counter>::default();
        registry.register("insight_cache_lookups", "Dashboard insight cache hits and misses", insight_cache.clone());
        Self { registry, requests, insight_cache }
    }

    pub fn record_request(&self, route: &str, ok: bool) {
        let outcome = if ok { Outcome::Ok } else { Outcome::Error };
        self.requests
            .get_or_create(&RequestLabels { route: route.to_string(), outcome })
            .inc();
    }

    pub fn record_cache_lookup(&self, hit: bool) {
        let result = if hit { Lookup::Hit } else { Lookup::Miss };
        self.insight_cache.get_or_create(&CacheLabels { result }).inc();
    }

    /// OpenMetrics text exposition of every registered metric.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
