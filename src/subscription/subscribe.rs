use std::{
    any::Any,
    error::Error,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::observer::Observer;

/// A trait for types that can be subscribed to, allowing consumers to receive
/// values emitted by an observable stream.
pub trait Subscribeable {
    /// The type of items emitted by the observable stream.
    type ObsType;

    /// Subscribes to the observable stream and specifies how to handle emitted values.
    ///
    /// The producer starts synchronously inside this call and may already emit
    /// (or even complete) before it returns. A `Subscription` is always returned,
    /// and cancelling it after the stream terminated is a no-op.
    ///
    /// # Arguments
    ///
    /// - `s`: A `Subscriber` that handles emitted values and other events from
    ///        the observable stream.
    fn subscribe(&self, s: Subscriber<Self::ObsType>) -> Subscription;
}

/// A trait for types that can be unsubscribed, allowing the clean release of resources
/// associated with a subscription.
pub trait Unsubscribeable {
    /// Unsubscribes from a subscription and releases associated resources.
    ///
    /// Only the first call has an effect. Calling it again, after the stream has
    /// already terminated, or from inside a handler driven by the very same
    /// subscription is safe.
    fn unsubscribe(&self);
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Optional payload carried by a `complete` signal.
///
/// Most producers complete without a value. Operators that end a stream because
/// of some other signal, such as `take_until`, attach that signal's payload so
/// consumers can inspect why the stream ended.
#[derive(Clone, Default)]
pub struct Completion(Option<Arc<dyn Any + Send + Sync>>);

impl Completion {
    #[must_use]
    pub fn empty() -> Self {
        Completion(None)
    }

    pub fn with_value<V: Any + Send + Sync>(value: V) -> Self {
        Completion(Some(Arc::new(value)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the payload if there is one and it is of type `V`.
    #[must_use]
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.0.as_deref().and_then(|v| v.downcast_ref::<V>())
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Completion(Some(..))"),
            None => f.write_str("Completion(None)"),
        }
    }
}

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type CompleteFn = Box<dyn FnMut(Completion) + Send>;
type ErrorFn = Box<dyn FnMut(Arc<dyn Error + Send + Sync>) + Send>;

/// A type that acts as an observer, allowing users to handle emitted values, errors,
/// and completion when subscribing to an `Observable`.
///
/// Only the `next` handler is mandatory. Missing `error` and `complete` handlers
/// accept their signal silently. Once `error` or `complete` has been handled the
/// `Subscriber` ignores every further signal.
pub struct Subscriber<NextFnType> {
    next_fn: NextFn<NextFnType>,
    complete_fn: Option<CompleteFn>,
    error_fn: Option<ErrorFn>,
    completed: bool,
    errored: bool,
}

impl<NextFnType> Subscriber<NextFnType> {
    /// Creates a new `Subscriber` instance with custom handling functions for emitted
    /// values, errors, and completion.
    pub fn new(
        next_fn: impl FnMut(NextFnType) + 'static + Send,
        error_fn: impl FnMut(Arc<dyn Error + Send + Sync>) + 'static + Send,
        complete_fn: impl FnMut(Completion) + 'static + Send,
    ) -> Self {
        Subscriber {
            next_fn: Box::new(next_fn),
            complete_fn: Some(Box::new(complete_fn)),
            error_fn: Some(Box::new(error_fn)),
            completed: false,
            errored: false,
        }
    }

    /// Create a new Subscriber with the provided `next` function.
    pub fn on_next(next_fn: impl FnMut(NextFnType) + 'static + Send) -> Self {
        Subscriber {
            next_fn: Box::new(next_fn),
            complete_fn: None,
            error_fn: None,
            completed: false,
            errored: false,
        }
    }

    /// A `Subscriber` that accepts every signal and does nothing with it.
    #[must_use]
    pub fn noop() -> Self {
        Self::on_next(|_| {})
    }

    /// Set the completion function for the Subscriber.
    pub fn on_complete(&mut self, complete_fn: impl FnMut(Completion) + 'static + Send) {
        self.complete_fn = Some(Box::new(complete_fn));
    }

    /// Set the error-handling function for the Subscriber.
    pub fn on_error(
        &mut self,
        error_fn: impl FnMut(Arc<dyn Error + Send + Sync>) + 'static + Send,
    ) {
        self.error_fn = Some(Box::new(error_fn));
    }

    /// Returns `true` once `error` or `complete` has been handled.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.completed || self.errored
    }
}

impl<T: 'static> Subscriber<T> {
    /// Adapts any [`Observer`] into a `Subscriber`.
    pub fn from_observer<O>(observer: O) -> Self
    where
        O: Observer<NextFnType = T> + Send + 'static,
    {
        let o_shared = Arc::new(Mutex::new(observer));
        let o_cloned_e = Arc::clone(&o_shared);
        let o_cloned_c = Arc::clone(&o_shared);

        Subscriber::new(
            move |v| lock(&o_shared).next(v),
            move |e| lock(&o_cloned_e).error(e),
            move |c| lock(&o_cloned_c).complete(c),
        )
    }
}

impl<T> Observer for Subscriber<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        if self.is_closed() {
            return;
        }
        (self.next_fn)(v);
    }

    fn error(&mut self, observable_error: Arc<dyn Error + Send + Sync>) {
        if self.is_closed() {
            return;
        }
        self.errored = true;
        if let Some(efn) = &mut self.error_fn {
            (efn)(observable_error);
        }
    }

    fn complete(&mut self, completion: Completion) {
        if self.is_closed() {
            return;
        }
        self.completed = true;
        if let Some(cfn) = &mut self.complete_fn {
            (cfn)(completion);
        }
    }
}

/// Represents a subscription to an observable, allowing it to be cancelled.
///
/// `Subscription` is a cheap handle: clones share the same teardown, which runs
/// at most once no matter how many clones call `unsubscribe`.
#[derive(Clone)]
pub struct Subscription {
    unsubscribe_logic: Arc<Mutex<Option<UnsubscribeLogic>>>,
}

impl Subscription {
    /// Creates a new `Subscription` that runs `unsubscribe_logic` when cancelled.
    ///
    /// See [`UnsubscribeLogic`] for the available strategies.
    #[must_use]
    pub fn new(unsubscribe_logic: UnsubscribeLogic) -> Self {
        Subscription {
            unsubscribe_logic: Arc::new(Mutex::new(Some(unsubscribe_logic))),
        }
    }

    /// A subscription with nothing to release, for fully synchronous producers.
    #[must_use]
    pub fn nil() -> Self {
        Self::new(UnsubscribeLogic::Nil)
    }

    /// Returns `true` once `unsubscribe` has been called on this subscription or
    /// any of its clones.
    ///
    /// This tracks cancellation only. A stream that already terminated on its
    /// own still reports `false` until it is unsubscribed.
    #[must_use]
    pub fn is_unsubscribed(&self) -> bool {
        lock(&self.unsubscribe_logic).is_none()
    }
}

impl Unsubscribeable for Subscription {
    fn unsubscribe(&self) {
        // Release the lock before running the logic; it may re-enter this handle.
        let logic = lock(&self.unsubscribe_logic).take();
        if let Some(logic) = logic {
            logic.unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("unsubscribed", &self.is_unsubscribed())
            .finish()
    }
}

/// Enumerates various unsubscribe logic options for a subscription.
pub enum UnsubscribeLogic {
    /// No specific unsubscribe logic.
    Nil,

    /// If one subscription depends on another. Wrapped subscription's unsubscribe
    /// will be called upon unsubscribing.
    Wrapped(Box<Subscription>),

    /// Unsubscribe logic defined by a function.
    Logic(Box<dyn FnOnce() + Send>),
}

impl UnsubscribeLogic {
    fn unsubscribe(self) {
        match self {
            UnsubscribeLogic::Nil => (),
            UnsubscribeLogic::Wrapped(subscription) => subscription.unsubscribe(),
            UnsubscribeLogic::Logic(fnc) => fnc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::ObservableError;

    #[test]
    fn subscriber_absorbs_signals_after_terminal() {
        let nexts = Arc::new(Mutex::new(Vec::new()));
        let nexts_c = Arc::clone(&nexts);
        let terminals = Arc::new(AtomicUsize::new(0));
        let terminals_e = Arc::clone(&terminals);
        let terminals_c = Arc::clone(&terminals);

        let mut s = Subscriber::new(
            move |v: i32| nexts_c.lock().unwrap().push(v),
            move |_| {
                terminals_e.fetch_add(1, Ordering::SeqCst);
            },
            move |_| {
                terminals_c.fetch_add(1, Ordering::SeqCst);
            },
        );

        s.next(1);
        s.complete(Completion::empty());
        s.next(2);
        s.error(ObservableError::message("late").into_shared());
        s.complete(Completion::empty());

        assert!(s.is_closed());
        assert_eq!(*nexts.lock().unwrap(), vec![1]);
        assert_eq!(terminals.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn partial_subscriber_accepts_missing_channels() {
        let mut s = Subscriber::<u8>::noop();
        s.error(ObservableError::message("ignored").into_shared());
        assert!(s.is_closed());
    }

    #[test]
    fn subscription_runs_logic_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_c = Arc::clone(&calls);

        let s = Subscription::new(UnsubscribeLogic::Logic(Box::new(move || {
            calls_c.fetch_add(1, Ordering::SeqCst);
        })));
        let wrapper = Subscription::new(UnsubscribeLogic::Wrapped(Box::new(s.clone())));

        assert!(!s.is_unsubscribed());
        wrapper.unsubscribe();
        wrapper.unsubscribe();
        s.unsubscribe();

        assert!(s.is_unsubscribed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn completion_payload_downcasts() {
        let c = Completion::with_value(7_u32);
        assert_eq!(c.downcast_ref::<u32>(), Some(&7));
        assert_eq!(c.downcast_ref::<i64>(), None);
        assert!(Completion::empty().is_empty());
    }
}
