//! Leveled diagnostics injected into every solver call.
//!
//! Solvers never print. They report progress through a `&mut dyn Diagnostics`
//! argument: [`Tracing`] forwards to the `tracing` ecosystem, [`Silent`]
//! drops everything, [`Recorder`] keeps messages for inspection and
//! [`Callback`] adapts a closure.

use std::fmt;

pub use tracing::Level;

/// Receiver for solver diagnostics.
pub trait Diagnostics {
    /// Whether messages at `level` are wanted. Solvers skip formatting when
    /// this returns `false`.
    fn enabled(&self, level: Level) -> bool {
        let _ = level;
        true
    }

    /// Receive one message.
    fn record(&mut self, level: Level, message: fmt::Arguments<'_>);
}

/// Emit a diagnostic if the receiver wants its level.
macro_rules! emit {
    ($diag:expr, $level:expr, $($arg:tt)+) => {{
        let level = $level;
        if $diag.enabled(level) {
            $diag.record(level, format_args!($($arg)+));
        }
    }};
}
pub(crate) use emit;

/// Forwards every message as a `tracing` event with target `newtonic_optim`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tracing;

impl Diagnostics for Tracing {
    fn enabled(&self, level: Level) -> bool {
        match level {
            Level::ERROR => tracing::enabled!(target: "newtonic_optim", Level::ERROR),
            Level::WARN => tracing::enabled!(target: "newtonic_optim", Level::WARN),
            Level::INFO => tracing::enabled!(target: "newtonic_optim", Level::INFO),
            Level::DEBUG => tracing::enabled!(target: "newtonic_optim", Level::DEBUG),
            _ => tracing::enabled!(target: "newtonic_optim", Level::TRACE),
        }
    }

    fn record(&mut self, level: Level, message: fmt::Arguments<'_>) {
        // `tracing::event!` needs the level as a constant
        match level {
            Level::ERROR => tracing::event!(target: "newtonic_optim", Level::ERROR, "{}", message),
            Level::WARN => tracing::event!(target: "newtonic_optim", Level::WARN, "{}", message),
            Level::INFO => tracing::event!(target: "newtonic_optim", Level::INFO, "{}", message),
            Level::DEBUG => tracing::event!(target: "newtonic_optim", Level::DEBUG, "{}", message),
            _ => tracing::event!(target: "newtonic_optim", Level::TRACE, "{}", message),
        }
    }
}

/// Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Diagnostics for Silent {
    fn enabled(&self, _level: Level) -> bool {
        false
    }

    fn record(&mut self, _level: Level, _message: fmt::Arguments<'_>) {}
}

/// Keeps messages at or above a verbosity threshold.
#[derive(Debug, Clone)]
pub struct Recorder {
    max_level: Level,
    events: Vec<(Level, String)>,
}

impl Recorder {
    /// Record messages whose level is at least as severe as `max_level`
    /// (`Level::DEBUG` keeps ERROR through DEBUG).
    pub fn new(max_level: Level) -> Self {
        Recorder {
            max_level,
            events: Vec::new(),
        }
    }

    /// Recorded `(level, message)` pairs in emission order.
    pub fn events(&self) -> &[(Level, String)] {
        &self.events
    }

    /// Messages recorded at exactly `level`.
    pub fn messages_at(&self, level: Level) -> impl Iterator<Item = &str> + '_ {
        self.events
            .iter()
            .filter(move |(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Recorder::new(Level::TRACE)
    }
}

impl Diagnostics for Recorder {
    fn enabled(&self, level: Level) -> bool {
        // `tracing::Level` orders TRACE > DEBUG > ... > ERROR
        level <= self.max_level
    }

    fn record(&mut self, level: Level, message: fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.events.push((level, message.to_string()));
        }
    }
}

/// Adapts a closure `FnMut(Level, &str)`.
pub struct Callback<G>(pub G);

impl<G: FnMut(Level, &str)> Diagnostics for Callback<G> {
    fn record(&mut self, level: Level, message: fmt::Arguments<'_>) {
        match message.as_str() {
            Some(s) => (self.0)(level, s),
            None => (self.0)(level, &message.to_string()),
        }
    }
}

impl<G> fmt::Debug for Callback<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}
