//! Tracking mouse drags
//!
//! Every `mousedown` on the element starts a stream of `mousemove` events that
//! lasts until a `mouseup` anywhere in the document. `switch_latest` always
//! follows the most recent of these streams. The mouse is simulated with two
//! `EventEmitter`s standing in for the element and the document.
//!
//! To run this example, execute `cargo run --example mouse_drags`.
//! Set `RUST_LOG=rxflow=trace` to see subscriptions being created and released.

use std::sync::Arc;

use rxflow::{
    events::{listen, EventEmitter},
    subscribe::Subscriber,
    Observable, ObservableExt, Subscribeable, Unsubscribeable,
};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug)]
struct MouseEvent {
    x: i32,
    y: i32,
}

type Target = Arc<EventEmitter<MouseEvent>>;

fn mouse_drags(element: &Target, document: &Target) -> Observable<MouseEvent> {
    let moves_on = Arc::clone(element);
    let document = Arc::clone(document);

    listen(Arc::clone(element), "mousedown")
        .map(move |_| {
            listen(Arc::clone(&moves_on), "mousemove")
                .take_until(listen(Arc::clone(&document), "mouseup"))
        })
        .switch_latest()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let element: Target = Arc::new(EventEmitter::new());
    let document: Target = Arc::new(EventEmitter::new());

    let cancel = mouse_drags(&element, &document).subscribe(Subscriber::new(
        |e: MouseEvent| println!("DRAG: <{}:{}>", e.x, e.y),
        |e| println!("ERROR: {}", e),
        |c| println!("COMPLETE: {:?}", c),
    ));

    let mv = |x, y| element.emit("mousemove", &MouseEvent { x, y });

    mv(5, 5); // Not dragging yet.
    element.emit("mousedown", &MouseEvent { x: 10, y: 10 });
    for i in 1..=3 {
        mv(10 + i, 10 + 2 * i);
    }
    document.emit("mouseup", &MouseEvent { x: 13, y: 16 });
    mv(40, 40); // Released, ignored.

    element.emit("mousedown", &MouseEvent { x: 50, y: 50 });
    mv(51, 52);

    cancel.unsubscribe();
    mv(60, 60);
}
