//! Log capture for unit tests
//!
//! One process-wide logger records every message with the thread that
//! emitted it, so parallel tests only see their own warnings.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, Once};
use std::thread::{self, ThreadId};

struct CaptureLogger {
    records: Mutex<Vec<(ThreadId, Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.push((thread::current().id(), record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};
static INIT: Once = Once::new();

fn take_for_current_thread() -> Vec<(Level, String)> {
    let id = thread::current().id();
    let mut records = LOGGER.records.lock().unwrap_or_else(|e| e.into_inner());
    let (mine, others): (Vec<_>, Vec<_>) = records.drain(..).partition(|(t, _, _)| *t == id);
    *records = others;
    mine.into_iter().map(|(_, level, msg)| (level, msg)).collect()
}

/// Run `f`, returning its result and the warnings it logged on this thread
pub(crate) fn warnings_during<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });

    take_for_current_thread();
    let result = f();
    let warnings = take_for_current_thread()
        .into_iter()
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, msg)| msg)
        .collect();
    (result, warnings)
}
