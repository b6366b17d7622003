use std::sync::{Arc, Mutex};

use rxflow::subscribe::{Completion, Subscriber};

/// Returns a factory of subscribers that all record into the same buffers:
/// emitted values, completions (with their payload) and error messages.
#[allow(clippy::type_complexity)]
pub fn register_emissions_subscriber<T: Send + 'static>() -> (
    impl Fn() -> Subscriber<T>,
    Arc<Mutex<Vec<T>>>,
    Arc<Mutex<Vec<Completion>>>,
    Arc<Mutex<Vec<String>>>,
) {
    let nexts = Arc::new(Mutex::new(Vec::with_capacity(5)));
    let completes = Arc::new(Mutex::new(Vec::with_capacity(5)));
    let errors = Arc::new(Mutex::new(Vec::with_capacity(5)));

    let nexts_c = Arc::clone(&nexts);
    let completes_c = Arc::clone(&completes);
    let errors_c = Arc::clone(&errors);

    let make_subscriber = move || {
        let nexts_c = Arc::clone(&nexts_c);
        let completes_c = Arc::clone(&completes_c);
        let errors_c = Arc::clone(&errors_c);

        Subscriber::new(
            move |n| {
                // Track next() calls.
                nexts_c.lock().unwrap().push(n);
            },
            move |e| {
                // Track error() calls.
                errors_c.lock().unwrap().push(e.to_string());
            },
            move |c| {
                // Track complete() calls.
                completes_c.lock().unwrap().push(c);
            },
        )
    };
    (make_subscriber, nexts, completes, errors)
}
