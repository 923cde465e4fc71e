//! Pipeline metrics.
//!
//! Counters and histograms are recorded through the `metrics` facade;
//! installing a recorder/exporter is the embedding process's concern.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Register metric descriptions.
///
/// Call once at process startup, after the recorder is installed.
pub fn describe_metrics() {
    describe_counter!(
        "mailcast_ingest_total",
        "Total number of ingested mail envelopes by outcome"
    );
    describe_counter!(
        "mailcast_push_deliveries_total",
        "Total number of push-channel delivery attempts by status"
    );
    describe_histogram!(
        "mailcast_push_delivery_duration_seconds",
        "Duration of push-channel delivery attempts in seconds"
    );
    describe_counter!(
        "mailcast_events_published_total",
        "Total number of side-channel publish attempts by status"
    );
    describe_counter!(
        "mailcast_addresses_registered_total",
        "Total number of addresses registered"
    );
    describe_counter!(
        "mailcast_addresses_deleted_total",
        "Total number of addresses deleted"
    );
}

/// Record one ingested envelope.
pub fn record_ingest(outcome: &'static str) {
    counter!("mailcast_ingest_total", "outcome" => outcome).increment(1);
}

/// Record one push-channel delivery attempt.
pub fn record_push_delivery(success: bool, duration: Duration) {
    let status = if success { "ok" } else { "error" };
    counter!("mailcast_push_deliveries_total", "status" => status).increment(1);
    histogram!("mailcast_push_delivery_duration_seconds").record(duration.as_secs_f64());
}

/// Record one side-channel publish attempt.
pub fn record_event_publish(success: bool) {
    let status = if success { "ok" } else { "error" };
    counter!("mailcast_events_published_total", "status" => status).increment(1);
}

/// Record a confirmed address registration.
pub fn record_address_registered() {
    counter!("mailcast_addresses_registered_total").increment(1);
}

/// Record an address deletion.
pub fn record_address_deleted() {
    counter!("mailcast_addresses_deleted_total").increment(1);
}
