//! Debounced auto-submit for a search input.
//!
//! Every input event cancels the pending submission before scheduling a new
//! one, so only the last keystroke of a burst can ever submit.

use compact_str::CompactString;
use tracing::{debug, trace};

use crate::config::SEARCH_DEBOUNCE;
use crate::controller::context::PageContext;
use crate::controller::events::PageEffect;
use crate::controller::navigation::form_submission_url;
use crate::error::AppResult;
use crate::model::search::{PendingSearch, should_submit};
use crate::util::timer::{TimerHandle, TimerKind};
use crate::view::tree::{NodeId, Tag};

#[derive(Debug)]
pub struct SearchSubmitController {
    input: NodeId,
    pending: Option<PendingSearch>,
}

impl SearchSubmitController {
    pub const fn bind(input: NodeId) -> Self {
        Self {
            input,
            pending: None,
        }
    }

    #[inline]
    pub const fn input(&self) -> NodeId {
        self.input
    }

    #[inline]
    pub fn pending(&self) -> Option<&PendingSearch> {
        self.pending.as_ref()
    }

    /// Input-change event: restart the quiet period.
    pub fn on_input(&mut self, cx: &mut PageContext, value: &str) {
        self.cancel(cx);
        let timer = cx
            .timers
            .schedule(cx.now, SEARCH_DEBOUNCE, TimerKind::SearchDebounce(self.input));
        trace!("search: {} rescheduled for {:?}", self.input, value);
        self.pending = Some(PendingSearch {
            query: CompactString::from(value),
            scheduled_at: cx.now,
            timer,
        });
    }

    /// Debounce timer fired. Returns whether a submission was emitted.
    ///
    /// The field's value at fire time decides, not the value captured at
    /// schedule time. A missing enclosing form is a silent no-op.
    pub fn on_timer(&mut self, cx: &mut PageContext, fired: TimerHandle) -> AppResult<bool> {
        match &self.pending {
            Some(pending) if pending.timer == fired => {}
            _ => {
                trace!("search: stale debounce timer for {} ignored", self.input);
                return Ok(false);
            }
        }
        self.pending = None;

        let Some(query) = cx.view.value(self.input) else {
            debug!("search: input {} is gone", self.input);
            return Ok(false);
        };
        if !should_submit(query) {
            debug!("search: query {:?} too short, not submitting", query);
            return Ok(false);
        }

        let Some(form) = cx.view.closest(self.input, |el| el.tag == Tag::Form) else {
            debug!("search: no enclosing form for {}", self.input);
            return Ok(false);
        };

        let url = form_submission_url(&cx.view, form, &cx.location)?;
        debug!("search: submitting {}", url);
        cx.emit(PageEffect::SubmitForm {
            form,
            url: url.into(),
        });
        Ok(true)
    }

    /// Drop the pending submission, if any.
    pub fn cancel(&mut self, cx: &mut PageContext) {
        if let Some(pending) = self.pending.take() {
            cx.timers.cancel(pending.timer);
        }
    }
}
