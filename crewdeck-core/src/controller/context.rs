use tokio::time::Instant;
use url::Url;

use crate::controller::events::PageEffect;
use crate::util::timer::TimerService;
use crate::view::tree::ViewTree;

/// State shared by every behavior on one page: the view, the timer table,
/// the current location and the effect log.
///
/// Behaviors own their own state and borrow this mutably while they handle
/// an event. Only the single event-processing thread ever touches it.
#[derive(Debug)]
pub struct PageContext {
    pub view: ViewTree,
    pub timers: TimerService,
    pub location: Url,
    pub now: Instant,
    effects: Vec<PageEffect>,
}

impl PageContext {
    pub fn new(view: ViewTree, location: Url) -> Self {
        Self {
            view,
            timers: TimerService::new(),
            location,
            now: Instant::now(),
            effects: Vec::new(),
        }
    }

    #[inline]
    pub fn emit(&mut self, effect: PageEffect) {
        self.effects.push(effect);
    }

    #[inline]
    pub fn effects(&self) -> &[PageEffect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<PageEffect> {
        std::mem::take(&mut self.effects)
    }
}
