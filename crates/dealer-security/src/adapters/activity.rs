//! Activity source driven by the host.
//!
//! The UI layer forwards pointer, keyboard and touch events through
//! [`ManualActivitySource::emit`]; tests call it directly.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::session::{ActivityKind, ListenerOptions};
use crate::ports::{ActivityHandler, ActivitySource, ListenerId};

struct Registration {
    kinds: Vec<ActivityKind>,
    options: ListenerOptions,
    handler: ActivityHandler,
}

#[derive(Default)]
pub struct ManualActivitySource {
    listeners: Mutex<HashMap<ListenerId, Registration>>,
    next_id: AtomicU64,
}

impl ManualActivitySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one activity event to every listener registered for `kind`.
    ///
    /// Capturing listeners run first. Handlers are called without holding
    /// the registry lock so they may register or unregister.
    pub fn emit(&self, kind: ActivityKind) {
        let mut handlers: Vec<(bool, ActivityHandler)> = self
            .listeners
            .lock()
            .values()
            .filter(|r| r.kinds.contains(&kind))
            .map(|r| (r.options.capture, r.handler.clone()))
            .collect();
        handlers.sort_by_key(|(capture, _)| !*capture);

        for (_, handler) in handlers {
            handler(kind);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn options_of(&self, id: ListenerId) -> Option<ListenerOptions> {
        self.listeners.lock().get(&id).map(|r| r.options)
    }
}

impl ActivitySource for ManualActivitySource {
    fn register(
        &self,
        kinds: &[ActivityKind],
        options: ListenerOptions,
        handler: ActivityHandler,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().insert(
            id,
            Registration {
                kinds: kinds.to_vec(),
                options,
                handler,
            },
        );
        id
    }

    fn unregister(&self, id: ListenerId) {
        self.listeners.lock().remove(&id);
    }
}

impl std::fmt::Debug for ManualActivitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualActivitySource")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
