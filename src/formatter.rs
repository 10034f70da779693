//! Log formatter that stamps every line with the wall clock and where the simulation is: the
//! tick, the level being played and how long it has been running.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

static TICK_COUNTER: AtomicU64 = AtomicU64::new(0);
/// `usize::MAX` until a level has been reported.
static LEVEL: AtomicUsize = AtomicUsize::new(usize::MAX);
static LEVEL_MILLIS: AtomicU64 = AtomicU64::new(0);

/// Ticks are printed as four hex digits and wrap.
const TICK_DISPLAY_MASK: u64 = 0xFFFF;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:4]");

const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// `HH:MM:SS.ssss 0xTICK L1 +12.345s LEVEL span{fields}: target: message fields`
///
/// The level and its clock are left out until [`set_session`] has been called.
pub struct TickFormatter;

impl<S, N> FormatEvent<S, N> for TickFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();

        let timestamp = OffsetDateTime::now_utc().format(&TIMESTAMP_FORMAT).map_err(|e| {
            eprintln!("Failed to format timestamp: {e}");
            fmt::Error
        })?;
        styled(&mut writer, DIM, timestamp)?;
        writer.write_char(' ')?;

        styled(&mut writer, DIM, SessionStamp::current())?;
        writer.write_char(' ')?;

        write_level(&mut writer, meta.level())?;
        writer.write_char(' ')?;

        if let Some(scope) = ctx.event_scope() {
            let mut any = false;
            for span in scope.from_root() {
                any = true;
                styled(&mut writer, BOLD, span.metadata().name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        styled(&mut writer, BOLD, "{")?;
                        write!(writer, "{fields}")?;
                        styled(&mut writer, BOLD, "}")?;
                    }
                }
                styled(&mut writer, DIM, ":")?;
            }
            if any {
                writer.write_char(' ')?;
            }
        }

        styled(&mut writer, DIM, format_args!("{}:", meta.target()))?;
        writer.write_char(' ')?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn write_level(writer: &mut Writer<'_>, level: &Level) -> fmt::Result {
    let (color, text) = match *level {
        Level::TRACE => ("\x1b[35m", "TRACE"),
        Level::DEBUG => ("\x1b[34m", "DEBUG"),
        Level::INFO => ("\x1b[32m", " INFO"),
        Level::WARN => ("\x1b[33m", " WARN"),
        Level::ERROR => ("\x1b[31m", "ERROR"),
    };
    styled(writer, color, text)
}

/// Writes `value` wrapped in `style` when the writer supports ANSI, plain otherwise.
fn styled(writer: &mut Writer<'_>, style: &str, value: impl fmt::Display) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "{style}{value}{RESET}")
    } else {
        write!(writer, "{value}")
    }
}

/// Where the simulation stood when a line was logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStamp {
    pub tick: u64,
    /// Zero-based level index.
    pub level: Option<usize>,
    /// Time spent in the current level.
    pub elapsed: Duration,
}

impl SessionStamp {
    pub fn current() -> Self {
        let level = LEVEL.load(Ordering::Relaxed);
        Self {
            tick: get_tick_count(),
            level: (level != usize::MAX).then_some(level),
            elapsed: Duration::from_millis(LEVEL_MILLIS.load(Ordering::Relaxed)),
        }
    }
}

impl fmt::Display for SessionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.tick & TICK_DISPLAY_MASK)?;
        if let Some(level) = self.level {
            write!(
                f,
                " L{} +{}.{:03}s",
                level + 1,
                self.elapsed.as_secs(),
                self.elapsed.subsec_millis()
            )?;
        }
        Ok(())
    }
}

/// Records the level being played and its elapsed time for subsequent log lines.
pub fn set_session(level: usize, elapsed: Duration) {
    LEVEL.store(level, Ordering::Relaxed);
    LEVEL_MILLIS.store(elapsed.as_millis().try_into().unwrap_or(u64::MAX), Ordering::Relaxed);
}

/// Call once per simulation tick.
pub fn increment_tick() {
    TICK_COUNTER.fetch_add(1, Ordering::Relaxed);
}

pub fn get_tick_count() -> u64 {
    TICK_COUNTER.load(Ordering::Relaxed)
}
