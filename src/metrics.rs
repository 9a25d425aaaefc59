/// Metrics and telemetry for Kouki Gallery
///
/// Prometheus-compatible gauges and counters for the upload pipeline,
/// store mutations, and open snapshot feeds, exposed at /metrics.
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_gauge, Encoder, IntCounter, IntGauge, TextEncoder,
};

lazy_static! {
    /// Photos successfully uploaded since start
    pub static ref UPLOADS_TOTAL: IntCounter = register_int_counter!(
        "gallery_uploads_total",
        "Total number of photos uploaded"
    )
    .unwrap();

    /// Photos deleted since start
    pub static ref DELETES_TOTAL: IntCounter = register_int_counter!(
        "gallery_deletes_total",
        "Total number of photos deleted"
    )
    .unwrap();

    /// Uploads rejected before reaching the store (size, decode, conflict)
    pub static ref UPLOADS_REJECTED_TOTAL: IntCounter = register_int_counter!(
        "gallery_uploads_rejected_total",
        "Total number of uploads rejected before persisting"
    )
    .unwrap();

    /// Photos currently in the backing store, per last derivation
    pub static ref PHOTOS_STORED: IntGauge = register_int_gauge!(
        "gallery_photos_stored",
        "Number of photos in the backing store"
    )
    .unwrap();

    /// Open WebSocket snapshot feeds
    pub static ref FEED_CLIENTS: IntGauge = register_int_gauge!(
        "gallery_feed_clients",
        "Number of open snapshot feed connections"
    )
    .unwrap();
}

/// Render all registered metrics in the Prometheus text format
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buf) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buf).unwrap_or_default()
}
