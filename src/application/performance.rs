//! Performance measurements
//!
//! An explicit timing context owned by the compiler host. Measurements are
//! scoped guards: the elapsed time is recorded when the guard drops, so it is
//! recorded on early returns too.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Measure {
    pub count: usize,
    pub total: Duration,
}

#[derive(Debug, Default)]
pub struct PerformanceContext {
    measures: RefCell<BTreeMap<&'static str, Measure>>,
}

impl PerformanceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start measuring `name` until the returned guard drops.
    #[must_use = "the measurement ends when the guard is dropped"]
    pub fn measure(&self, name: &'static str) -> MeasureGuard<'_> {
        MeasureGuard {
            context: self,
            name,
            started: Instant::now(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Measure> {
        self.measures.borrow().get(name).copied()
    }

    pub fn reset(&self) {
        self.measures.borrow_mut().clear();
    }

    /// One `name: seconds` line per measure, sorted by name.
    pub fn report_lines(&self) -> Vec<String> {
        self.measures
            .borrow()
            .iter()
            .map(|(name, measure)| {
                format!("{:<20}{:>9.2}s", format!("{name} time:"), measure.total.as_secs_f64())
            })
            .collect()
    }

    fn record(&self, name: &'static str, elapsed: Duration) {
        let mut measures = self.measures.borrow_mut();
        let entry = measures.entry(name).or_default();
        entry.count += 1;
        entry.total += elapsed;
    }
}

/// Guard returned by [`PerformanceContext::measure`].
pub struct MeasureGuard<'a> {
    context: &'a PerformanceContext,
    name: &'static str,
    started: Instant,
}

impl Drop for MeasureGuard<'_> {
    fn drop(&mut self) {
        self.context.record(self.name, self.started.elapsed());
    }
}
