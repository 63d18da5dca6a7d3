use biometrics::{Collector, Counter, Moments};

pub(crate) static REVEAL_CHUNKS: Counter = Counter::new("mitra.reveal.chunks");
pub(crate) static REVEAL_CHARS: Counter = Counter::new("mitra.reveal.chars");
pub(crate) static REVEAL_UPDATES: Counter = Counter::new("mitra.reveal.updates");
pub(crate) static REVEAL_BLOCKED: Counter = Counter::new("mitra.reveal.blocked");
pub(crate) static REVEAL_FAILURES: Counter = Counter::new("mitra.reveal.failures");
pub(crate) static REVEAL_DURATION: Moments = Moments::new("mitra.reveal.duration_seconds");

pub(crate) static TEXT_TURNS: Counter = Counter::new("mitra.text.turns");
pub(crate) static TEXT_CLEARS: Counter = Counter::new("mitra.text.clears");
pub(crate) static IMAGE_TURNS: Counter = Counter::new("mitra.image.turns");
pub(crate) static IMAGE_UPLOADS: Counter = Counter::new("mitra.image.uploads");
pub(crate) static IMAGE_MISSING: Counter = Counter::new("mitra.image.missing");
pub(crate) static GATE_EMPTY: Counter = Counter::new("mitra.gate.empty_prompt");

pub(crate) static SESSIONS_STARTED: Counter = Counter::new("mitra.session.started");
pub(crate) static SESSIONS_ENDED: Counter = Counter::new("mitra.session.ended");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&REVEAL_CHUNKS);
    collector.register_counter(&REVEAL_CHARS);
    collector.register_counter(&REVEAL_UPDATES);
    collector.register_counter(&REVEAL_BLOCKED);
    collector.register_counter(&REVEAL_FAILURES);
    collector.register_moments(&REVEAL_DURATION);

    collector.register_counter(&TEXT_TURNS);
    collector.register_counter(&TEXT_CLEARS);
    collector.register_counter(&IMAGE_TURNS);
    collector.register_counter(&IMAGE_UPLOADS);
    collector.register_counter(&IMAGE_MISSING);
    collector.register_counter(&GATE_EMPTY);

    collector.register_counter(&SESSIONS_STARTED);
    collector.register_counter(&SESSIONS_ENDED);
}
