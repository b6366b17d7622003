use std::{error::Error, sync::Arc};

use crate::subscribe::Completion;

/// The three-channel signal interface every consumer implements.
///
/// After `error` or `complete` has been received no further signal is delivered
/// on the same subscription. Implement this trait for types that handle every
/// channel; use [`Subscriber`] when only some of them matter.
///
/// [`Subscriber`]: crate::subscribe::Subscriber
pub trait Observer {
    type NextFnType;

    fn next(&mut self, _: Self::NextFnType);
    fn error(&mut self, _: Arc<dyn Error + Send + Sync>);
    fn complete(&mut self, _: Completion);
}
