use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub inspections_total: IntCounterVec,
    pub inspection_latency_seconds: HistogramVec,
    pub matches_total: IntCounterVec,
    pub orders_created_total: IntCounter,
    pub pending_quotes: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let inspections_total = IntCounterVec::new(
            Opts::new("inspections_total", "Total car inspections by outcome"),
            &["outcome"],
        )
        .expect("valid inspections_total metric");

        let inspection_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "inspection_latency_seconds",
                "Latency of image analysis and matching in seconds",
            ),
            &["outcome"],
        )
        .expect("valid inspection_latency_seconds metric");

        let matches_total = IntCounterVec::new(
            Opts::new("matches_total", "Driver match attempts by outcome"),
            &["outcome"],
        )
        .expect("valid matches_total metric");

        let orders_created_total =
            IntCounter::new("orders_created_total", "Total orders persisted")
                .expect("valid orders_created_total metric");

        let pending_quotes = IntGauge::new("pending_quotes", "Quotes awaiting confirmation")
            .expect("valid pending_quotes metric");

        registry
            .register(Box::new(inspections_total.clone()))
            .expect("register inspections_total");
        registry
            .register(Box::new(inspection_latency_seconds.clone()))
            .expect("register inspection_latency_seconds");
        registry
            .register(Box::new(matches_total.clone()))
            .expect("register matches_total");
        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(pending_quotes.clone()))
            .expect("register pending_quotes");

        Self {
            registry,
            inspections_total,
            inspection_latency_seconds,
            matches_total,
            orders_created_total,
            pending_quotes,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
