use std::{collections::HashMap, fmt, sync::Mutex};

use super::{EventTarget, Listener};
use crate::subscription::subscribe::lock;

/// An in-process [`EventTarget`] that fires events on demand.
///
/// Listeners are called in registration order. `emit` works from a snapshot of
/// the listener list, so a listener may detach itself (or others) while an event
/// is being dispatched; a listener removed mid-dispatch is still called for that
/// event if it was already in the snapshot.
///
/// ```
/// use std::sync::Arc;
///
/// use rxflow::events::{EventEmitter, EventTarget, Listener};
///
/// let emitter = EventEmitter::<String>::new();
/// let listener: Listener<String> = Arc::new(|e: &String| println!("got {}", e));
///
/// emitter.add_event_listener("message", Arc::clone(&listener));
/// emitter.emit("message", &"hello".to_string());
/// emitter.remove_event_listener("message", &listener);
/// ```
pub struct EventEmitter<E> {
    listeners: Mutex<HashMap<String, Vec<Listener<E>>>>,
}

impl<E> EventEmitter<E> {
    #[must_use]
    pub fn new() -> Self {
        EventEmitter {
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Calls every listener registered for `event_name` with `event` and returns
    /// how many were called.
    pub fn emit(&self, event_name: &str, event: &E) -> usize {
        let snapshot: Vec<Listener<E>> = match lock(&self.listeners).get(event_name) {
            Some(listeners) => listeners.clone(),
            None => return 0,
        };

        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }

    /// Returns the number of listeners registered for `event_name`.
    #[must_use]
    pub fn listener_count(&self, event_name: &str) -> usize {
        lock(&self.listeners).get(event_name).map_or(0, Vec::len)
    }
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = lock(&self.listeners);
        let mut map = f.debug_map();
        for (name, list) in listeners.iter() {
            map.entry(name, &list.len());
        }
        map.finish()
    }
}

fn same_listener<E>(a: &Listener<E>, b: &Listener<E>) -> bool {
    // Compare data pointers only; vtable pointers are not guaranteed unique.
    std::ptr::eq(
        std::sync::Arc::as_ptr(a).cast::<()>(),
        std::sync::Arc::as_ptr(b).cast::<()>(),
    )
}

impl<E: Clone + Send + 'static> EventTarget for EventEmitter<E> {
    type Event = E;

    fn add_event_listener(&self, event_name: &str, listener: Listener<E>) {
        lock(&self.listeners)
            .entry(event_name.to_owned())
            .or_default()
            .push(listener);
    }

    fn remove_event_listener(&self, event_name: &str, listener: &Listener<E>) {
        let mut listeners = lock(&self.listeners);
        if let Some(list) = listeners.get_mut(event_name) {
            if let Some(pos) = list.iter().position(|l| same_listener(l, listener)) {
                list.remove(pos);
            }
            if list.is_empty() {
                listeners.remove(event_name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[test]
    fn add_emit_remove() {
        let emitter = EventEmitter::<u32>::new();
        let total = Arc::new(AtomicUsize::new(0));
        let total_c = Arc::clone(&total);

        let listener: Listener<u32> = Arc::new(move |v: &u32| {
            total_c.fetch_add(*v as usize, Ordering::SeqCst);
        });
        emitter.add_event_listener("add", Arc::clone(&listener));

        assert_eq!(emitter.emit("add", &3), 1);
        assert_eq!(emitter.emit("other", &100), 0);

        emitter.remove_event_listener("add", &listener);
        // Removing twice is harmless.
        emitter.remove_event_listener("add", &listener);

        assert_eq!(emitter.emit("add", &3), 0);
        assert_eq!(total.load(Ordering::SeqCst), 3);
        assert_eq!(emitter.listener_count("add"), 0);
    }

    #[test]
    fn remove_only_detaches_the_given_listener() {
        let emitter = EventEmitter::<()>::new();
        let a: Listener<()> = Arc::new(|_: &()| {});
        let b: Listener<()> = Arc::new(|_: &()| {});

        emitter.add_event_listener("x", Arc::clone(&a));
        emitter.add_event_listener("x", Arc::clone(&b));
        emitter.remove_event_listener("x", &a);

        assert_eq!(emitter.listener_count("x"), 1);
        assert_eq!(emitter.emit("x", &()), 1);
    }
}
