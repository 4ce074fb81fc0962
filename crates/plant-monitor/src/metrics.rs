use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct LoopMetrics {
    pub cycles: IntCounter,
    pub vertical: IntCounter,
    pub non_vertical: IntCounter,
    pub camera_failures: IntCounterVec,
    pub plc_read_failures: IntCounter,
    pub plc_write_failures: IntCounter,
    pub last_session: IntGauge,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub monitor: LoopMetrics,
}

impl MetricsHub {
    pub fn new() -> Result<Self, String> {
        let registry = Registry::new();
        let err = |e: prometheus::Error| format!("metrics init error: {e}");
        let cycles = IntCounter::new("pv_cycles_total", "Capture cycles completed").map_err(err)?;
        let vertical =
            IntCounter::new("pv_vertical_total", "Cycles reported as vertical").map_err(err)?;
        let non_vertical =
            IntCounter::new("pv_non_vertical_total", "Cycles reported as not vertical")
                .map_err(err)?;
        let camera_failures = IntCounterVec::new(
            Opts::new(
                "pv_camera_failures_total",
                "Frames that could not be acquired or processed",
            ),
            &["camera"],
        )
        .map_err(err)?;
        let plc_read_failures =
            IntCounter::new("pv_plc_read_failures_total", "Failed controller reads")
                .map_err(err)?;
        let plc_write_failures =
            IntCounter::new("pv_plc_write_failures_total", "Failed controller writes")
                .map_err(err)?;
        let last_session =
            IntGauge::new("pv_last_session", "Last processed session number").map_err(err)?;
        let monitor = LoopMetrics {
            cycles,
            vertical,
            non_vertical,
            camera_failures,
            plc_read_failures,
            plc_write_failures,
            last_session,
        };
        let _ = registry.register(Box::new(monitor.cycles.clone()));
        let _ = registry.register(Box::new(monitor.vertical.clone()));
        let _ = registry.register(Box::new(monitor.non_vertical.clone()));
        let _ = registry.register(Box::new(monitor.camera_failures.clone()));
        let _ = registry.register(Box::new(monitor.plc_read_failures.clone()));
        let _ = registry.register(Box::new(monitor.plc_write_failures.clone()));
        let _ = registry.register(Box::new(monitor.last_session.clone()));
        Ok(Self { registry, monitor })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposition_lists_counters() {
        let hub = MetricsHub::new().unwrap();
        hub.monitor.cycles.inc();
        hub.monitor
            .camera_failures
            .with_label_values(&["169.254.207.2"])
            .inc();
        hub.monitor.last_session.set(4);
        let text = hub.encode_text();
        assert!(text.contains("pv_cycles_total 1"));
        assert!(text.contains("pv_camera_failures_total{camera=\"169.254.207.2\"} 1"));
        assert!(text.contains("pv_last_session 4"));
    }
}
