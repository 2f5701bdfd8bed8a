use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub jobs_created_total: IntCounter,
    pub lifecycle_transitions_total: IntCounterVec,
    pub notifications_total: IntCounterVec,
    pub notices_in_queue: IntGauge,
    pub store_op_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let jobs_created_total =
            IntCounter::new("jobs_created_total", "Total jobs posted to the board")
                .expect("valid jobs_created_total metric");

        let lifecycle_transitions_total = IntCounterVec::new(
            Opts::new(
                "lifecycle_transitions_total",
                "Job lifecycle operations by action and outcome",
            ),
            &["action", "outcome"],
        )
        .expect("valid lifecycle_transitions_total metric");

        let notifications_total = IntCounterVec::new(
            Opts::new("notifications_total", "Notices emitted by channel"),
            &["channel"],
        )
        .expect("valid notifications_total metric");

        let notices_in_queue =
            IntGauge::new("notices_in_queue", "Lifecycle events awaiting dispatch")
                .expect("valid notices_in_queue metric");

        let store_op_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "store_op_seconds",
                "Blob store operation duration in seconds, simulated latency included",
            ),
            &["op"],
        )
        .expect("valid store_op_seconds metric");

        registry
            .register(Box::new(jobs_created_total.clone()))
            .expect("register jobs_created_total");
        registry
            .register(Box::new(lifecycle_transitions_total.clone()))
            .expect("register lifecycle_transitions_total");
        registry
            .register(Box::new(notifications_total.clone()))
            .expect("register notifications_total");
        registry
            .register(Box::new(notices_in_queue.clone()))
            .expect("register notices_in_queue");
        registry
            .register(Box::new(store_op_seconds.clone()))
            .expect("register store_op_seconds");

        Self {
            registry,
            jobs_created_total,
            lifecycle_transitions_total,
            notifications_total,
            notices_in_queue,
            store_op_seconds,
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
