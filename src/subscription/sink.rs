//! The producer-facing end of a subscription.

use std::{
    collections::VecDeque,
    error::Error,
    sync::{Arc, Mutex},
};

use tracing::trace;

use crate::{
    observer::Observer,
    subscription::subscribe::{lock, Completion, Subscriber, Subscription, Unsubscribeable},
};

enum Signal<T> {
    Next(T),
    Error(Arc<dyn Error + Send + Sync>),
    Complete(Completion),
}

impl<T> Signal<T> {
    fn is_terminal(&self) -> bool {
        !matches!(self, Signal::Next(_))
    }
}

struct SinkState<T> {
    // `None` while a signal is being delivered and after the sink is closed.
    subscriber: Option<Subscriber<T>>,
    pending: VecDeque<Signal<T>>,
    delivering: bool,
    closed: bool,
    teardown: Option<Subscription>,
}

/// Handle a producer uses to push signals to one subscriber.
///
/// Every call to `subscribe` creates a fresh `Sink` and passes it to the
/// observable's setup function. Clones share the same subscriber, so a producer
/// can hand copies to event handlers and to its own unsubscribe logic.
///
/// A `Sink` enforces the subscription protocol on behalf of the producer:
///
/// - once `error` or `complete` has been accepted every later signal is dropped,
///   and the producer's teardown (the `Subscription` its setup function returned)
///   is run;
/// - after the consumer unsubscribes nothing more reaches the subscriber;
/// - a signal pushed while the subscriber is still handling a previous one (a
///   handler that cancels a subscription, which in turn emits `complete`) is
///   delivered right after that handler returns, in the order it was pushed.
///   Unsubscribing from inside a handler does not discard signals queued this
///   way: they still reach the subscriber once the handler returns, even though
///   `unsubscribe` has already returned.
///
/// No lock is held while user code runs, so handlers may freely emit, subscribe
/// or unsubscribe.
pub struct Sink<T> {
    state: Arc<Mutex<SinkState<T>>>,
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        Sink {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Sink<T> {
    pub(crate) fn new(subscriber: Subscriber<T>) -> Self {
        Sink {
            state: Arc::new(Mutex::new(SinkState {
                subscriber: Some(subscriber),
                pending: VecDeque::new(),
                delivering: false,
                closed: false,
                teardown: None,
            })),
        }
    }

    pub fn next(&self, v: T) {
        self.push(Signal::Next(v));
    }

    pub fn error(&self, e: Arc<dyn Error + Send + Sync>) {
        self.push(Signal::Error(e));
    }

    pub fn complete(&self, completion: Completion) {
        self.push(Signal::Complete(completion));
    }

    /// Returns `true` once the stream terminated or the consumer unsubscribed.
    ///
    /// Producers that emit in a loop can check it to stop early.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }

    fn push(&self, mut signal: Signal<T>) {
        let mut subscriber = {
            let mut state = lock(&self.state);
            if state.closed {
                return;
            }
            if signal.is_terminal() {
                state.closed = true;
            }
            if state.delivering {
                state.pending.push_back(signal);
                return;
            }
            match state.subscriber.take() {
                Some(subscriber) => {
                    state.delivering = true;
                    subscriber
                }
                None => return,
            }
        };

        loop {
            match signal {
                Signal::Next(v) => subscriber.next(v),
                Signal::Error(e) => subscriber.error(e),
                Signal::Complete(c) => subscriber.complete(c),
            }

            let mut state = lock(&self.state);
            if let Some(pending) = state.pending.pop_front() {
                signal = pending;
                continue;
            }
            state.delivering = false;

            if !state.closed {
                state.subscriber = Some(subscriber);
                return;
            }
            let teardown = state.teardown.take();
            drop(state);
            drop(subscriber);

            if let Some(teardown) = teardown {
                trace!("stream terminated, releasing producer");
                teardown.unsubscribe();
            }
            return;
        }
    }

    /// Stores the producer's teardown. Runs it right away if the stream already
    /// terminated or was cancelled while the producer was being set up.
    pub(crate) fn attach_teardown(&self, teardown: Subscription) {
        let mut state = lock(&self.state);
        if state.closed {
            drop(state);
            teardown.unsubscribe();
            return;
        }
        state.teardown = Some(teardown);
    }

    /// Consumer-side cancellation.
    ///
    /// The producer is released first, while the sink is still open, so any
    /// `complete` it emits from its teardown still reaches the subscriber.
    pub(crate) fn cancel(&self) {
        let teardown = lock(&self.state).teardown.take();
        if let Some(teardown) = teardown {
            trace!("subscription cancelled");
            teardown.unsubscribe();
        }

        let subscriber = {
            let mut state = lock(&self.state);
            state.closed = true;
            if state.delivering {
                // The delivery loop drops the subscriber once it unwinds.
                None
            } else {
                state.pending.clear();
                state.subscriber.take()
            }
        };
        drop(subscriber);
    }
}

impl<T: Send + 'static> From<Sink<T>> for Subscriber<T> {
    /// A `Subscriber` that forwards every signal to `sink` unchanged.
    fn from(sink: Sink<T>) -> Self {
        let sink_e = sink.clone();
        let sink_c = sink.clone();

        Subscriber::new(
            move |v| sink.next(v),
            move |e| sink_e.error(e),
            move |c| sink_c.complete(c),
        )
    }
}
