//! Bridges discrete event sources into observables.
//!
//! Any type offering an add/remove listener pair keyed by an event name can
//! implement [`EventTarget`] and be turned into an [`Observable`] with
//! [`listen`]. [`EventEmitter`] is a ready-made in-process target.

mod emitter;

pub use emitter::*;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    observable::Observable,
    subscription::subscribe::{Completion, Subscription, UnsubscribeLogic},
};

/// Callback registered on an [`EventTarget`].
///
/// Targets identify listeners by pointer, so `remove_event_listener` must be
/// given a clone of the very `Arc` passed to `add_event_listener`.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A source of named events.
pub trait EventTarget: Send + Sync {
    /// Payload handed to listeners.
    type Event: Clone + Send + 'static;

    fn add_event_listener(&self, event_name: &str, listener: Listener<Self::Event>);

    /// Detaches `listener` if it is registered for `event_name`. Unknown
    /// listeners are ignored.
    fn remove_event_listener(&self, event_name: &str, listener: &Listener<Self::Event>);
}

/// Returns an observable of `event_name` events fired by `target`.
///
/// Each subscription attaches one listener, and every event becomes one `next`.
/// The stream never errors. Unsubscribing detaches the listener and then emits
/// a single `complete`.
pub fn listen<S>(target: Arc<S>, event_name: impl Into<String>) -> Observable<S::Event>
where
    S: EventTarget + 'static,
{
    let event_name: Arc<str> = Arc::from(event_name.into());

    Observable::new(move |sink| {
        let sink_l = sink.clone();
        let listener: Listener<S::Event> = Arc::new(move |event: &S::Event| {
            sink_l.next(event.clone());
        });

        target.add_event_listener(&event_name, Arc::clone(&listener));
        trace!(event = %event_name, "listener attached");

        let target = Arc::clone(&target);
        let event_name = Arc::clone(&event_name);
        Subscription::new(UnsubscribeLogic::Logic(Box::new(move || {
            target.remove_event_listener(&event_name, &listener);
            debug!(event = %event_name, "listener detached");
            sink.complete(Completion::empty());
        })))
    })
}
