//! `rxflow` is a small push-based reactive stream engine.
//!
//! An [`Observable`] describes a sequence of values produced by some source (an
//! event emitter, a timer, another observable). Nothing happens until it is
//! subscribed to; every subscription re-runs the producer and returns a
//! [`Subscription`] that tears it down again.
//!
//! Signals flow from producer to consumer, cancellation flows the other way:
//!
//! ```text
//! producer --next/error/complete--> operators --> Subscriber
//! producer <---------unsubscribe--- operators <-- Subscription
//! ```
//!
//! Delivery is synchronous. A signal reaches the `Subscriber` inside whatever call
//! emitted it, and there are no internal threads or queues beyond the re-entrancy
//! handling described on [`Sink`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use rxflow::events::{listen, EventEmitter};
//! use rxflow::{ObservableExt, Subscribeable, Subscriber, Unsubscribeable};
//!
//! let element = Arc::new(EventEmitter::<i32>::new());
//!
//! let subscription = listen(Arc::clone(&element), "click")
//!     .map(|v| v * 10)
//!     .subscribe(Subscriber::on_next(|v| println!("clicked {}", v)));
//!
//! element.emit("click", &1);
//! element.emit("click", &2);
//!
//! // Detaches the listener from `element` and completes the subscriber.
//! subscription.unsubscribe();
//! assert_eq!(element.listener_count("click"), 0);
//! ```
//!
//! [`Observable`]: observable::Observable
//! [`Subscription`]: subscribe::Subscription
//! [`Sink`]: subscription::sink::Sink

mod errors;
pub mod events;
pub mod observable;
pub mod observer;
pub mod subscription;

pub use errors::*;
pub use observable::{Observable, ObservableExt};
pub use observer::Observer;
pub use subscription::sink::Sink;
pub use subscription::subscribe;
pub use subscription::subscribe::{
    Completion, Subscribeable, Subscriber, Subscription, UnsubscribeLogic, Unsubscribeable,
};
