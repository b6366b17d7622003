//! The `observable` module provides the building blocks for creating and composing
//! observables.

use std::{
    error::Error,
    sync::{Arc, Mutex},
};

use tracing::debug;

use crate::{
    errors::ObservableError,
    subscription::{
        sink::Sink,
        subscribe::{
            lock, Completion, Subscribeable, Subscriber, Subscription, UnsubscribeLogic,
            Unsubscribeable,
        },
    },
};

/// The `Observable` struct represents a source of values that can be observed
/// and transformed.
///
/// An `Observable` only describes how to produce values. Each call to
/// `subscribe` runs the setup function again with a fresh [`Sink`], so two
/// subscribers never share producer state. Cloning an `Observable` is cheap and
/// yields the same description.
///
/// The setup function runs synchronously inside `subscribe`. It may emit right
/// away or hand the sink to some event source that emits later. It returns the
/// `Subscription` releasing whatever it acquired, or [`Subscription::nil`] when
/// there is nothing to release.
///
/// # Example
///
/// ```
/// use rxflow::{Completion, Observable, ObservableExt, Subscribeable, Subscriber, Subscription};
///
/// let emit_3 = Observable::new(|sink| {
///     for i in 1..=3 {
///         sink.next(i);
///     }
///     sink.complete(Completion::empty());
///     Subscription::nil()
/// });
///
/// let mut observer = Subscriber::on_next(|v| println!("Emitted {}", v));
/// observer.on_complete(|_| println!("Completed"));
///
/// emit_3.map(|v| v * 2).subscribe(observer);
/// ```
///
/// [`Sink`]: crate::Sink
/// [`Subscription::nil`]: crate::Subscription::nil
pub struct Observable<T> {
    subscribe_fn: Arc<dyn Fn(Sink<T>) -> Subscription + Send + Sync>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Observable {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
        }
    }
}

impl<T> Observable<T> {
    /// Creates a new `Observable` with the provided setup function.
    pub fn new(sf: impl Fn(Sink<T>) -> Subscription + Send + Sync + 'static) -> Self {
        Observable {
            subscribe_fn: Arc::new(sf),
        }
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Emits every item of `values` in order, then completes.
    pub fn of(values: impl IntoIterator<Item = T>) -> Self
    where
        T: Clone + Sync,
    {
        let values: Vec<T> = values.into_iter().collect();
        Observable::new(move |sink| {
            for v in &values {
                if sink.is_closed() {
                    break;
                }
                sink.next(v.clone());
            }
            sink.complete(Completion::empty());
            Subscription::nil()
        })
    }

    /// Completes immediately without emitting.
    #[must_use]
    pub fn empty() -> Self {
        Observable::new(|sink| {
            sink.complete(Completion::empty());
            Subscription::nil()
        })
    }

    /// Never emits and never terminates.
    #[must_use]
    pub fn never() -> Self {
        Observable::new(|_| Subscription::nil())
    }

    /// Emits `error` on every subscription.
    pub fn throw(error: impl Error + Send + Sync + 'static) -> Self {
        let error: Arc<dyn Error + Send + Sync> = Arc::new(error);
        Observable::new(move |sink| {
            sink.error(Arc::clone(&error));
            Subscription::nil()
        })
    }
}

impl<T: Send + 'static> Subscribeable for Observable<T> {
    type ObsType = T;

    fn subscribe(&self, s: Subscriber<Self::ObsType>) -> Subscription {
        let sink = Sink::new(s);
        let teardown = (self.subscribe_fn)(sink.clone());
        sink.attach_teardown(teardown);

        Subscription::new(UnsubscribeLogic::Logic(Box::new(move || sink.cancel())))
    }
}

/// The `ObservableExt` trait provides the operators that derive new observables
/// from existing ones.
pub trait ObservableExt<T: 'static>: Subscribeable<ObsType = T> {
    /// Transforms the items emitted by the observable using a transformation
    /// function.
    ///
    /// `error` and `complete` pass through untouched. A panic inside `f` is not
    /// caught and unwinds into whatever call emitted the value; use [`try_map`]
    /// for transforms that can fail.
    ///
    /// [`try_map`]: ObservableExt::try_map
    fn map<U, F>(self, f: F) -> Observable<U>
    where
        Self: Sized + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
        U: Send + 'static,
    {
        let f = Arc::new(f);
        Observable::new(move |sink: Sink<U>| {
            let f = Arc::clone(&f);
            let sink_e = sink.clone();
            let sink_c = sink.clone();

            self.subscribe(Subscriber::new(
                move |v| sink.next(f(v)),
                move |observable_error| sink_e.error(observable_error),
                move |completion| sink_c.complete(completion),
            ))
        })
    }

    /// Like [`map`], but `f` may fail. The first `Err` is emitted as an
    /// [`ObservableError::Transform`] error, which ends the stream.
    ///
    /// [`map`]: ObservableExt::map
    fn try_map<U, E, F>(self, f: F) -> Observable<U>
    where
        Self: Sized + Send + Sync + 'static,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        U: Send + 'static,
    {
        let f = Arc::new(f);
        Observable::new(move |sink: Sink<U>| {
            let f = Arc::clone(&f);
            let sink_e = sink.clone();
            let sink_c = sink.clone();

            self.subscribe(Subscriber::new(
                move |v| match f(v) {
                    Ok(u) => sink.next(u),
                    Err(e) => sink.error(ObservableError::Transform(Box::new(e)).into_shared()),
                },
                move |observable_error| sink_e.error(observable_error),
                move |completion| sink_c.complete(completion),
            ))
        })
    }

    /// Filters the items emitted by the observable based on a predicate function.
    fn filter<P>(self, predicate: P) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        P: Fn(&T) -> bool + Send + Sync + 'static,
        T: Send,
    {
        let predicate = Arc::new(predicate);
        Observable::new(move |sink: Sink<T>| {
            let predicate = Arc::clone(&predicate);
            let sink_e = sink.clone();
            let sink_c = sink.clone();

            self.subscribe(Subscriber::new(
                move |v| {
                    if predicate(&v) {
                        sink.next(v);
                    }
                },
                move |observable_error| sink_e.error(observable_error),
                move |completion| sink_c.complete(completion),
            ))
        })
    }

    /// Mirrors the observable until `control` emits its first signal of any kind.
    ///
    /// `next`, `error` and `complete` from `control` all end the result with
    /// `complete`. The payload of that signal is carried in the [`Completion`]:
    /// the value for `next`, the `Arc<dyn Error + Send + Sync>` for `error`, and
    /// the control's own completion payload for `complete`. Errors from the
    /// source itself pass through unchanged.
    ///
    /// Unsubscribing cancels the source first, then `control`.
    fn take_until<U>(self, control: Observable<U>) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        U: Send + Sync + 'static,
        T: Send,
    {
        Observable::new(move |sink: Sink<T>| {
            let source = self.subscribe(sink.clone().into());
            let control = control.subscribe(stop_on_any_signal(sink));

            let subscriptions = TakeUntilSubscriptions { source, control };
            Subscription::new(UnsubscribeLogic::Logic(Box::new(move || {
                subscriptions.unsubscribe();
            })))
        })
    }

    /// Maps every item to an inner observable and follows only the most recent one.
    ///
    /// Shorthand for `map(project).switch_latest()`.
    fn switch_map<R, F>(self, project: F) -> Observable<R>
    where
        Self: Sized + Send + Sync + 'static,
        F: Fn(T) -> Observable<R> + Send + Sync + 'static,
        R: Send + 'static,
    {
        self.map(project).switch_latest()
    }
}

impl<O, T: 'static> ObservableExt<T> for O where O: Subscribeable<ObsType = T> {}

struct TakeUntilSubscriptions {
    source: Subscription,
    control: Subscription,
}

impl Unsubscribeable for TakeUntilSubscriptions {
    fn unsubscribe(&self) {
        self.source.unsubscribe();
        self.control.unsubscribe();
    }
}

/// Subscriber for the `take_until` control stream. Every channel maps to the
/// same action: complete the result stream.
fn stop_on_any_signal<T, U>(sink: Sink<T>) -> Subscriber<U>
where
    T: Send + 'static,
    U: Send + Sync + 'static,
{
    let stop = Arc::new(move |completion: Completion| {
        debug!("take_until control signalled, completing");
        sink.complete(completion);
    });
    let stop_e = Arc::clone(&stop);
    let stop_c = Arc::clone(&stop);

    Subscriber::new(
        move |v: U| stop(Completion::with_value(v)),
        move |observable_error| stop_e(Completion::with_value(observable_error)),
        move |completion| stop_c(completion),
    )
}

impl<R: Send + 'static> Observable<Observable<R>> {
    /// Flattens an observable of observables, always following the newest inner
    /// observable.
    ///
    /// Each outer value cancels the previous inner subscription before the new
    /// one is subscribed, so at most one inner stream is live. Inner `next` and
    /// `error` reach the subscriber; an inner `complete` does not end the
    /// result. Outer `error` and `complete` are forwarded as they arrive.
    ///
    /// Unsubscribing cancels the current inner subscription, then the outer one.
    #[must_use]
    pub fn switch_latest(self) -> Observable<R> {
        Observable::new(move |sink: Sink<R>| {
            let state = Arc::new(Mutex::new(SwitchLatestState::default()));
            let state_n = Arc::clone(&state);
            let sink_n = sink.clone();
            let sink_e = sink.clone();

            let outer = self.subscribe(Subscriber::new(
                move |inner: Observable<R>| switch_to(&state_n, &sink_n, &inner),
                move |observable_error| sink_e.error(observable_error),
                move |completion| sink.complete(completion),
            ));
            SwitchLatestState::store_outer(&state, outer);

            Subscription::new(UnsubscribeLogic::Logic(Box::new(move || {
                SwitchLatestState::release(&state);
            })))
        })
    }
}

/// Per-subscription state of `switch_latest`.
#[derive(Default)]
struct SwitchLatestState {
    inner: Option<Subscription>,
    outer: Option<Subscription>,
    closed: bool,
}

impl SwitchLatestState {
    fn store_outer(state: &Mutex<Self>, outer: Subscription) {
        let mut guard = lock(state);
        if guard.closed {
            drop(guard);
            outer.unsubscribe();
            return;
        }
        guard.outer = Some(outer);
    }

    fn release(state: &Mutex<Self>) {
        let (inner, outer) = {
            let mut guard = lock(state);
            guard.closed = true;
            (guard.inner.take(), guard.outer.take())
        };
        if let Some(inner) = inner {
            inner.unsubscribe();
        }
        if let Some(outer) = outer {
            outer.unsubscribe();
        }
    }
}

fn switch_to<R: Send + 'static>(
    state: &Mutex<SwitchLatestState>,
    sink: &Sink<R>,
    inner: &Observable<R>,
) {
    // The previous inner stream is fully released before the next one starts.
    let previous = lock(state).inner.take();
    if let Some(previous) = previous {
        debug!("switching to latest inner stream");
        previous.unsubscribe();
    }

    let sink_n = sink.clone();
    let sink_e = sink.clone();
    let mut subscriber = Subscriber::on_next(move |v| sink_n.next(v));
    subscriber.on_error(move |observable_error| sink_e.error(observable_error));

    let current = inner.subscribe(subscriber);

    let mut guard = lock(state);
    if guard.closed {
        drop(guard);
        current.unsubscribe();
        return;
    }
    guard.inner = Some(current);
}
