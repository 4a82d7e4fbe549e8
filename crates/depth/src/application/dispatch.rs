use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{BookSnapshot, SequencedUpdate};

type ResetHandler = Arc<dyn Fn() + Send + Sync>;
type ReadyHandler = Arc<dyn Fn(&BookSnapshot, &[SequencedUpdate]) + Send + Sync>;
type PushHandler = Arc<dyn Fn(&SequencedUpdate) + Send + Sync>;

/// An event leaving the buffer, dispatched after the state lock is released
#[derive(Debug)]
pub(crate) enum DepthEvent {
    /// Baseline invalidated; subscribers should drop derived state
    Reset,
    /// Baseline committed together with the replayed deltas, in arrival order
    Ready(BookSnapshot, Vec<SequencedUpdate>),
    /// Delta applied on an established baseline
    Push(SequencedUpdate),
}

/// Subscriber registry for the three depth event kinds
///
/// Handlers run synchronously in registration order. The handler list is
/// cloned out of its lock before invocation, so a handler may call back into
/// the buffer (including `reset`) or register further handlers without
/// deadlocking.
pub(crate) struct EventDispatcher {
    reset_handlers: Mutex<Vec<ResetHandler>>,
    ready_handlers: Mutex<Vec<ReadyHandler>>,
    push_handlers: Mutex<Vec<PushHandler>>,
}

impl EventDispatcher {
    pub(crate) fn new() -> Self {
        EventDispatcher {
            reset_handlers: Mutex::new(Vec::new()),
            ready_handlers: Mutex::new(Vec::new()),
            push_handlers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn on_reset(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.reset_handlers.lock().push(Arc::new(handler));
    }

    pub(crate) fn on_ready(
        &self,
        handler: impl Fn(&BookSnapshot, &[SequencedUpdate]) + Send + Sync + 'static,
    ) {
        self.ready_handlers.lock().push(Arc::new(handler));
    }

    pub(crate) fn on_push(&self, handler: impl Fn(&SequencedUpdate) + Send + Sync + 'static) {
        self.push_handlers.lock().push(Arc::new(handler));
    }

    pub(crate) fn dispatch(&self, event: DepthEvent) {
        match event {
            DepthEvent::Reset => {
                let handlers = self.reset_handlers.lock().clone();
                for handler in handlers {
                    handler();
                }
            }
            DepthEvent::Ready(snapshot, updates) => {
                let handlers = self.ready_handlers.lock().clone();
                for handler in handlers {
                    handler(&snapshot, &updates);
                }
            }
            DepthEvent::Push(update) => {
                let handlers = self.push_handlers.lock().clone();
                for handler in handlers {
                    handler(&update);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookfeed_core::SliceOrderBook;

    #[test]
    fn test_handlers_run_in_registration_order() {
        let dispatcher = EventDispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            dispatcher.on_push(move |_| order.lock().push(tag));
        }

        dispatcher.dispatch(DepthEvent::Push(SequencedUpdate::single(
            1,
            SliceOrderBook::new("BTCUSDT"),
        )));

        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_handler_may_register_another_handler() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let fired = Arc::new(Mutex::new(0u32));

        let inner_dispatcher = Arc::clone(&dispatcher);
        let inner_fired = Arc::clone(&fired);
        dispatcher.on_reset(move || {
            let fired = Arc::clone(&inner_fired);
            inner_dispatcher.on_reset(move || *fired.lock() += 1);
        });

        // must not deadlock; the newly registered handler only runs next time
        dispatcher.dispatch(DepthEvent::Reset);
        assert_eq!(*fired.lock(), 0);

        dispatcher.dispatch(DepthEvent::Reset);
        assert_eq!(*fired.lock(), 1);
    }
}
