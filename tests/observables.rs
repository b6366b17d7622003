mod custom_error;
mod register_emissions;

use std::{
    error::Error,
    sync::{Arc, Mutex},
};

use custom_error::CustomError;
use register_emissions::register_emissions_subscriber;
use rxflow::{
    subscribe::{Completion, Subscriber, Subscription},
    Observable, Observer, Subscribeable, Unsubscribeable,
};

#[test]
fn unchained_observable() {
    let value = 100;
    let o = Subscriber::new(
        move |v| {
            assert_eq!(
                v, value,
                "expected integer value {} but {} is emitted",
                value, v
            );
        },
        |_observable_error| {},
        move |_| {},
    );

    let s = Observable::new(move |sink| {
        sink.next(value);
        Subscription::nil()
    });

    s.subscribe(o);
}

#[test]
fn observable_with_custom_error() {
    let (make_subscriber, nexts, completes, errors) = register_emissions_subscriber::<i32>();
    let caught = Arc::new(Mutex::new(false));
    let caught_c = Arc::clone(&caught);

    let mut observer = make_subscriber();
    observer.on_error(move |e| {
        *caught_c.lock().unwrap() = e.downcast_ref::<CustomError>().is_some();
    });

    Observable::<i32>::throw(CustomError).subscribe(observer);
    Observable::<i32>::throw(CustomError).subscribe(make_subscriber());

    assert!(*caught.lock().unwrap(), "error payload should be passed through");
    assert!(nexts.lock().unwrap().is_empty());
    assert!(completes.lock().unwrap().is_empty());
    assert_eq!(*errors.lock().unwrap(), vec!["Custom error occurred"]);
}

#[test]
fn empty_and_never() {
    let (make_subscriber, nexts, completes, errors) = register_emissions_subscriber::<u8>();

    Observable::empty().subscribe(make_subscriber());
    let never = Observable::never().subscribe(make_subscriber());
    never.unsubscribe();

    assert!(nexts.lock().unwrap().is_empty());
    assert_eq!(completes.lock().unwrap().len(), 1);
    assert!(errors.lock().unwrap().is_empty());
}

#[derive(Default)]
struct Collect {
    values: Arc<Mutex<Vec<String>>>,
}

impl Observer for Collect {
    type NextFnType = &'static str;

    fn next(&mut self, v: Self::NextFnType) {
        self.values.lock().unwrap().push(v.to_string());
    }

    fn error(&mut self, e: Arc<dyn Error + Send + Sync>) {
        self.values.lock().unwrap().push(format!("error: {}", e));
    }

    fn complete(&mut self, _: Completion) {
        self.values.lock().unwrap().push("done".to_string());
    }
}

#[test]
fn full_observer_through_adapter() {
    let collect = Collect::default();
    let values = Arc::clone(&collect.values);

    Observable::of(["a", "b"]).subscribe(Subscriber::from_observer(collect));

    assert_eq!(*values.lock().unwrap(), vec!["a", "b", "done"]);
}

#[test]
fn subscription_returned_after_synchronous_completion() {
    let (make_subscriber, nexts, completes, _) = register_emissions_subscriber();

    let subscription = Observable::of([1, 2, 3]).subscribe(make_subscriber());
    assert!(!subscription.is_unsubscribed());

    // Cancelling an already completed stream is a no-op.
    subscription.unsubscribe();
    subscription.unsubscribe();

    assert_eq!(*nexts.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(completes.lock().unwrap().len(), 1);
}
