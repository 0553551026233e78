//! The `statsd(client)` option's shape (§6): a DataDog-style forwarder for
//! histograms, counts, and service checks.
//!
//! No network client ships here — that's explicitly a non-core concern
//! (§1). This trait is the seam a real `dogstatsd`/`cadence` client would
//! implement; tests use an in-memory recorder.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCheckStatus {
    Ok,
    Warning,
    Critical,
}

pub trait StatsdSink: Send + Sync {
    fn histogram(&self, metric: &str, value: f64, tags: &[String]);
    fn count(&self, metric: &str, value: i64, tags: &[String]);
    fn service_check(&self, name: &str, status: ServiceCheckStatus, tags: &[String]);
}
