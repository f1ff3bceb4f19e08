use combat_core::{MessageSink, Notice, NoticeKind};
use tracing::{debug, info, trace};

use super::bus::{Event, EventBus};

/// [`MessageSink`] that logs each notice and publishes it on the bus.
#[derive(Clone)]
pub struct BusSink {
    bus: EventBus,
}

impl BusSink {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl MessageSink for BusSink {
    fn notify(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Ambient { .. } => trace!(actor = %notice.actor, "{notice}"),
            NoticeKind::Died => info!(actor = %notice.actor, "{notice}"),
            _ => debug!(actor = %notice.actor, "{notice}"),
        }
        self.bus.publish(Event::from_notice(notice));
    }
}
