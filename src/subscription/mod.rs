//! Provides structures and traits related to subscription management.
//!
//! This module includes `Subscriber` for handling observed values, errors, and
//! completions, `Subscription` for cancelling a subscription, and the `Sink`
//! handed to producers for emitting signals.
pub mod sink;
pub mod subscribe;
