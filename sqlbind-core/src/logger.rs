use std::sync::Arc;
use std::time::Instant;

use crate::options::LogSettings;

pub(crate) const TARGET: &str = "sqlbind::query";

// `tracing` takes its level as a constant, so each level gets its own arm
macro_rules! enabled_at {
    ($level:expr) => {
        match $level {
            tracing::Level::ERROR => tracing::enabled!(target: TARGET, tracing::Level::ERROR),
            tracing::Level::WARN => tracing::enabled!(target: TARGET, tracing::Level::WARN),
            tracing::Level::INFO => tracing::enabled!(target: TARGET, tracing::Level::INFO),
            tracing::Level::DEBUG => tracing::enabled!(target: TARGET, tracing::Level::DEBUG),
            tracing::Level::TRACE => tracing::enabled!(target: TARGET, tracing::Level::TRACE),
        }
    };
}

macro_rules! event_at {
    ($level:expr, $($fields:tt)*) => {
        match $level {
            tracing::Level::ERROR => tracing::event!(target: TARGET, tracing::Level::ERROR, $($fields)*),
            tracing::Level::WARN => tracing::event!(target: TARGET, tracing::Level::WARN, $($fields)*),
            tracing::Level::INFO => tracing::event!(target: TARGET, tracing::Level::INFO, $($fields)*),
            tracing::Level::DEBUG => tracing::event!(target: TARGET, tracing::Level::DEBUG, $($fields)*),
            tracing::Level::TRACE => tracing::event!(target: TARGET, tracing::Level::TRACE, $($fields)*),
        }
    };
}

/// The `tracing` and `log` levels for `filter`, or `None` when it is off.
fn levels(filter: log::LevelFilter) -> Option<(tracing::Level, log::Level)> {
    let level = filter.to_level()?;

    let tracing_level = match level {
        log::Level::Error => tracing::Level::ERROR,
        log::Level::Warn => tracing::Level::WARN,
        log::Level::Info => tracing::Level::INFO,
        log::Level::Debug => tracing::Level::DEBUG,
        log::Level::Trace => tracing::Level::TRACE,
    };

    Some((tracing_level, level))
}

/// Follows one execution of a statement, from `execute` until its result set is drained or
/// abandoned, and logs it once when dropped.
pub(crate) struct QueryLogger {
    sql: Arc<str>,
    batch_rows: usize,
    rows_affected: u64,
    rows_returned: u64,
    start: Instant,
    settings: LogSettings,
}

impl QueryLogger {
    pub(crate) fn new(sql: Arc<str>, batch_rows: usize, settings: LogSettings) -> Self {
        Self {
            sql,
            batch_rows,
            rows_affected: 0,
            rows_returned: 0,
            start: Instant::now(),
            settings,
        }
    }

    pub(crate) fn increase_rows_affected(&mut self, n: u64) {
        self.rows_affected += n;
    }

    pub(crate) fn increment_rows_returned(&mut self) {
        self.rows_returned += 1;
    }

    fn emit(&self) {
        let elapsed = self.start.elapsed();
        let slow = elapsed >= self.settings.slow_statements_duration;

        let filter = if slow {
            self.settings.slow_statements_level
        } else {
            self.settings.statements_level
        };

        let Some((tracing_level, log_level)) = levels(filter) else {
            return;
        };

        // either a `log` logger or a `tracing` subscriber may be listening
        if !(log::log_enabled!(target: TARGET, log_level) || enabled_at!(tracing_level)) {
            return;
        }

        let mut summary = parse_query_summary(&self.sql);

        let statement = if summary == *self.sql {
            String::new()
        } else {
            summary.push_str(" …");
            format!("\n\n{}\n", self.sql)
        };

        event_at!(
            tracing_level,
            summary,
            db.statement = statement,
            batch_rows = self.batch_rows,
            rows_affected = self.rows_affected,
            rows_returned = self.rows_returned,
            ?elapsed,
            elapsed_secs = elapsed.as_secs_f64(),
            slow,
            slow_threshold = ?self.settings.slow_statements_duration,
        );
    }
}

impl Drop for QueryLogger {
    fn drop(&mut self) {
        self.emit();
    }
}

/// The first four words of a statement, used as the log message.
pub fn parse_query_summary(sql: &str) -> String {
    sql.split_whitespace()
        .take(4)
        .collect::<Vec<&str>>()
        .join(" ")
}
