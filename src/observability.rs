use biometrics::{Collector, Counter};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("banchan.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("banchan.client.request_errors");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("banchan.stream.events");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("banchan.stream.errors");
pub(crate) static STREAM_DROPPED_FRAMES: Counter =
    Counter::new("banchan.stream.dropped_frames");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_DROPPED_FRAMES);
}
