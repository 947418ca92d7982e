//! crewdeck-core: interaction-state engine for the crew admin pages
//! -------------------------------------------------------------------------
//! The behavior layer that sits on top of server-rendered markup: toasts,
//! debounced search, bulk row selection, clipboard copy, upload checks and
//! the small navigation helpers around them. Everything runs on one
//! cooperative timeline driven by [`EventLoop`].

pub mod error;

pub mod config;

pub mod logging;
pub use logging::Logger;

/// --- Page model: element arena and JSON fixtures ---
pub mod view {
    pub mod tree;
    pub use tree::{Element, NodeId, SelectedFile, Tag, ViewTree};

    pub mod fixture;
    pub use fixture::{ClipboardBehavior, PageFixture, ScriptedEvent};
}

/// --- State owned by behaviors ---
pub mod model {
    pub mod search;
    pub use search::{PendingSearch, should_submit};

    pub mod selection;
    pub use selection::{SelectionSnapshot, SelectionState, SelectionStateMachine};

    pub mod toast;
    pub use toast::{Severity, ToastEntry, ToastId};
}

/// --- Behaviors, dispatch and the event loop ---
pub mod controller {
    pub mod context;
    pub use context::PageContext;

    pub mod events;
    pub use events::{KeyPress, PageEffect, PageEvent};

    pub mod toast_manager;
    pub use toast_manager::ToastManager;

    pub mod search_submit;
    pub use search_submit::SearchSubmitController;

    pub mod bulk_selection;
    pub use bulk_selection::BulkSelection;

    pub mod copy_actions;
    pub use copy_actions::{CopyActions, CopyRequestId, CopyTarget, PendingCopy};

    pub mod upload;

    pub mod navigation;

    pub mod keyboard;

    pub mod form_guard;
    pub use form_guard::SubmitGuard;

    pub mod page;
    pub use page::Page;

    pub mod event_loop;
    pub use event_loop::{EventLoop, LoopMetrics};
}

pub mod util {
    pub mod humanize;

    pub mod timer;
    pub use timer::{FiredTimer, TimerHandle, TimerKind, TimerService};
}

pub use config::Config;
pub use controller::{EventLoop, Page, PageEffect, PageEvent};
pub use error::{AppError, AppResult};
