use std::sync::Arc;

use rxflow::{
    events::{listen, EventEmitter},
    Observable,
};

/// An observable of `"tick"` events together with the emitter driving it.
pub fn generate_u32_observable() -> (Arc<EventEmitter<u32>>, Observable<u32>) {
    let emitter = Arc::new(EventEmitter::new());
    let observable = listen(Arc::clone(&emitter), "tick");
    (emitter, observable)
}

/// Fires `"tick"` for every value in `range`, calling `between` after each one.
pub fn tick(
    emitter: &EventEmitter<u32>,
    range: std::ops::RangeInclusive<u32>,
    mut between: impl FnMut(u32),
) {
    for i in range {
        emitter.emit("tick", &i);
        between(i);
    }
}
