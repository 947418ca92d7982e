//! Tracing setup: sequence-numbered lines stamped with page time, to stderr
//! and to a daily rolling file.

use std::{
    fs,
    str::FromStr,
    sync::{
        OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use anyhow::{Context, Result};
use tokio::time::Instant;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::Directive,
    fmt::{
        self, FmtContext, FormattedFields,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::LoggingConfig;

pub struct Logger;

impl Logger {
    /// Call **once** near the start of `main`. Keep the returned guard alive
    /// for the lifetime of the program or buffered file lines are lost.
    pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
        let make_filter = || -> Result<EnvFilter> {
            Ok(EnvFilter::from_default_env().add_directive(
                Directive::from_str(&config.level).context("Invalid log level in config")?,
            ))
        };

        let (file_layer, guard) = match &config.directory {
            Some(dir) => {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

                // daily rolling file appender → <dir>/<prefix>.YYYY-MM-DD
                let appender = rolling::daily(dir, config.file_prefix.as_str());
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let layer = fmt::layer()
                    .event_format(PageClockFormat)
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(make_filter()?);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        let stderr_layer = if config.stderr {
            Some(
                fmt::layer()
                    .event_format(PageClockFormat)
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_filter(make_filter()?),
            )
        } else {
            None
        };

        tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer)
            .try_init()
            .context("Failed to install global tracing subscriber")?;

        Ok(guard)
    }
}

static SEQ: AtomicUsize = AtomicUsize::new(1);

/// Page clock origin, set by the first formatted line. Reads tokio time, so
/// a replay on the paused clock logs virtual offsets.
static ORIGIN: OnceLock<Instant> = OnceLock::new();

/// `SEQ +S.mmms LEVEL target span{fields}:span: message`
struct PageClockFormat;

impl<S, N> FormatEvent<S, N> for PageClockFormat
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut w: Writer<'_>,
        ev: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        let origin = *ORIGIN.get_or_init(Instant::now);
        let page_time = Instant::now().saturating_duration_since(origin);

        let meta = ev.metadata();
        write!(
            w,
            "{seq:06} +{}.{:03}s {:<5} {} ",
            page_time.as_secs(),
            page_time.subsec_millis(),
            meta.level(),
            meta.target(),
        )?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(w, "{}", span.name())?;
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>()
                    && !fields.is_empty()
                {
                    write!(w, "{{{fields}}}")?;
                }
                write!(w, ":")?;
            }
            write!(w, " ")?;
        }

        ctx.field_format().format_fields(w.by_ref(), ev)?;
        writeln!(w)
    }
}
