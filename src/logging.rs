//! Process-wide log severity threshold.
//!
//! The library emits diagnostics through the [`log`] facade only; it never
//! installs a logger. The enclosing application picks one (`env_logger`,
//! `tracing-log`, ...) and these accessors adjust how chatty the library — and
//! everything else behind the facade — is allowed to be.

use log::LevelFilter;

/// Set the maximum severity that will be emitted.
///
/// Wraps [`log::set_max_level`]; affects the whole process, not just this
/// library.
pub fn set_severity_threshold(level: LevelFilter) {
    log::set_max_level(level);
}

/// Current maximum emitted severity.
pub fn severity_threshold() -> LevelFilter {
    log::max_level()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_round_trips() {
        let previous = severity_threshold();
        set_severity_threshold(LevelFilter::Warn);
        assert_eq!(severity_threshold(), LevelFilter::Warn);
        set_severity_threshold(previous);
    }
}
