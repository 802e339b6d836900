use crate::events::{EventKind, HostEvent, Subscriptions};
use crate::experience::Experience;
use crate::scheduler::{FrameScheduler, TickOutcome};

/// Experience plus its scheduler, fed through one subscription table.
pub struct Runtime {
    pub experience: Experience,
    pub scheduler: FrameScheduler,
    events: Subscriptions<Runtime>,
}

impl Runtime {
    pub fn new(experience: Experience) -> Self {
        let mut events = Subscriptions::new();
        events.subscribe(EventKind::Scroll, on_scroll);
        events.subscribe(EventKind::Resize, on_resize);
        events.subscribe(EventKind::Visibility, on_visibility);
        Self {
            experience,
            scheduler: FrameScheduler::new(),
            events,
        }
    }

    pub fn subscriptions_mut(&mut self) -> &mut Subscriptions<Runtime> {
        &mut self.events
    }

    pub fn dispatch(&mut self, event: HostEvent) -> usize {
        let events = std::mem::take(&mut self.events);
        let handled = events.dispatch(self, &event);
        self.events = events;
        handled
    }

    pub fn start(&mut self, now_ms: f64) -> bool {
        self.scheduler.start(&mut self.experience, now_ms)
    }

    pub fn stop(&mut self) -> bool {
        self.scheduler.stop()
    }

    pub fn tick(&mut self, now_ms: f64) -> TickOutcome {
        self.scheduler.tick(&mut self.experience, now_ms)
    }
}

fn on_scroll(rt: &mut Runtime, event: &HostEvent) {
    if let HostEvent::Scroll { offset } = *event {
        rt.experience.handle_scroll(offset);
    }
}

fn on_resize(rt: &mut Runtime, _: &HostEvent) {
    rt.experience.handle_resize();
}

fn on_visibility(rt: &mut Runtime, event: &HostEvent) {
    if let HostEvent::Visibility { hidden, now_ms } = *event {
        if hidden {
            rt.stop();
        } else {
            rt.start(now_ms);
        }
    }
}
