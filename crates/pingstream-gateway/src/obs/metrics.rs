//! Gateway metrics registry.
//!
//! Label values are `&'static str` reasons chosen by the gateway itself, so
//! no escaping is needed. The latency histogram uses fixed millisecond
//! buckets and keeps its sum in microseconds to stay integer-only.

use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use dashmap::DashMap;

/// Counter with a single `reason` label.
#[derive(Default)]
pub struct ReasonCounter {
    map: DashMap<&'static str, AtomicU64>,
}

impl ReasonCounter {
    pub fn inc(&self, reason: &'static str) {
        self.map
            .entry(reason)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, reason: &str) -> u64 {
        self.map
            .get(reason)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} counter");
        let mut rows: Vec<(&'static str, u64)> = self
            .map
            .iter()
            .map(|r| (*r.key(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort_unstable();
        for (reason, v) in rows {
            let _ = writeln!(out, "{name}{{reason=\"{reason}\"}} {v}");
        }
    }
}

#[derive(Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Default)]
pub struct Gauge(AtomicI64);

impl Gauge {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

// Upper bounds in milliseconds.
const LATENCY_BUCKETS_MS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000];

#[derive(Default)]
pub struct LatencyHistogram {
    count: AtomicU64,
    sum_micros: AtomicU64,
    buckets: [AtomicU64; LATENCY_BUCKETS_MS.len()],
}

impl LatencyHistogram {
    /// Record one probe latency (cumulative buckets).
    pub fn observe_ms(&self, millis: f64) {
        let micros = (millis.max(0.0) * 1000.0) as u64;
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_micros.fetch_add(micros, Ordering::Relaxed);
        for (i, &le) in LATENCY_BUCKETS_MS.iter().enumerate() {
            if micros <= le * 1000 {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} histogram");
        for (i, le) in LATENCY_BUCKETS_MS.iter().enumerate() {
            let n = self.buckets[i].load(Ordering::Relaxed);
            let _ = writeln!(out, "{name}_bucket{{le=\"{le}\"}} {n}");
        }
        let count = self.count();
        let sum_ms = self.sum_micros.load(Ordering::Relaxed) as f64 / 1000.0;
        let _ = writeln!(out, "{name}_bucket{{le=\"+Inf\"}} {count}");
        let _ = writeln!(out, "{name}_sum {sum_ms}");
        let _ = writeln!(out, "{name}_count {count}");
    }
}

#[derive(Default)]
pub struct GatewayMetrics {
    pub sessions_admitted: Counter,
    pub sessions_active: Gauge,
    pub sessions_ended: ReasonCounter,
    pub rejections: ReasonCounter,
    pub probe_latency: LatencyHistogram,
    draining: AtomicBool,
}

impl GatewayMetrics {
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "# TYPE pingstream_sessions_admitted_total counter\npingstream_sessions_admitted_total {}",
            self.sessions_admitted.get()
        );
        let _ = writeln!(
            out,
            "# TYPE pingstream_sessions_active gauge\npingstream_sessions_active {}",
            self.sessions_active.get()
        );
        self.sessions_ended.render("pingstream_sessions_ended_total", &mut out);
        self.rejections.render("pingstream_rejections_total", &mut out);
        self.probe_latency.render("pingstream_probe_latency_ms", &mut out);
        let _ = writeln!(
            out,
            "# TYPE pingstream_draining gauge\npingstream_draining {}",
            u8::from(self.is_draining())
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_buckets_are_cumulative() {
        let h = LatencyHistogram::default();
        h.observe_ms(0.4);
        h.observe_ms(7.0);
        h.observe_ms(9_000.0);

        let mut out = String::new();
        h.render("lat", &mut out);
        assert!(out.contains("lat_bucket{le=\"1\"} 1"));
        assert!(out.contains("lat_bucket{le=\"10\"} 2"));
        assert!(out.contains("lat_bucket{le=\"5000\"} 2"));
        assert!(out.contains("lat_bucket{le=\"+Inf\"} 3"));
        assert!(out.contains("lat_count 3"));
    }

    #[test]
    fn render_lists_reasons_sorted() {
        let m = GatewayMetrics::default();
        m.rejections.inc("unreachable");
        m.rejections.inc("limit");
        m.rejections.inc("limit");
        m.sessions_active.inc();

        let out = m.render();
        let limit = out.find("pingstream_rejections_total{reason=\"limit\"} 2");
        let unreachable = out.find("pingstream_rejections_total{reason=\"unreachable\"} 1");
        assert!(limit.is_some() && unreachable.is_some());
        assert!(limit < unreachable);
        assert!(out.contains("pingstream_sessions_active 1"));
        assert!(out.contains("pingstream_draining 0"));
    }
}
