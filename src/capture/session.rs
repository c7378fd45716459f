use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use parking_lot::{RwLock, RwLockReadGuard};

use super::output::OutputFiles;
use crate::types::{Activity, SensorKind};

/// The session currently recording. Immutable once published.
#[derive(Debug)]
pub struct ActiveSession {
    pub activity: Activity,
    pub start_time: Instant,
    pub started_at: DateTime<Local>,
    pub files: OutputFiles,
}

impl ActiveSession {
    pub fn new(activity: Activity, start_time: Instant, files: OutputFiles) -> Self {
        Self {
            activity,
            start_time,
            started_at: Local::now(),
            files,
        }
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start_time)
    }
}

/// Per-stream counters shown in the status bar.
#[derive(Debug, Default)]
pub struct StreamCounters {
    written: [AtomicU64; 3],
    failed: [AtomicU64; 3],
}

impl StreamCounters {
    pub fn record_written(&self, kind: SensorKind) {
        if let Some(i) = kind.stream_index() {
            self.written[i].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failed(&self, kind: SensorKind) {
        if let Some(i) = kind.stream_index() {
            self.failed[i].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn written(&self, kind: SensorKind) -> u64 {
        kind.stream_index()
            .map_or(0, |i| self.written[i].load(Ordering::Relaxed))
    }

    pub fn failed(&self, kind: SensorKind) -> u64 {
        kind.stream_index()
            .map_or(0, |i| self.failed[i].load(Ordering::Relaxed))
    }

    pub fn reset(&self) {
        for counter in self.written.iter().chain(self.failed.iter()) {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// State shared between the controller (sole writer, UI thread) and the sample router
/// (reader, sensor delivery thread).
///
/// Appends run under a read guard on `active`; clearing the session takes the write guard,
/// so once [`SessionHandle::end`] returns no append is in flight.
#[derive(Debug, Default)]
pub struct SessionHandle {
    recording: AtomicBool,
    activity: AtomicUsize,
    active: RwLock<Option<Arc<ActiveSession>>>,
    pub counters: StreamCounters,
}

impl SessionHandle {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    pub fn activity(&self) -> Activity {
        Activity::from_code(self.activity.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub(crate) fn set_activity(&self, activity: Activity) {
        self.activity.store(activity.code(), Ordering::Release);
    }

    pub(crate) fn begin(&self, session: ActiveSession) -> Arc<ActiveSession> {
        let session = Arc::new(session);
        self.counters.reset();
        *self.active.write() = Some(Arc::clone(&session));
        self.recording.store(true, Ordering::Release);
        session
    }

    pub(crate) fn end(&self) -> Option<Arc<ActiveSession>> {
        self.recording.store(false, Ordering::Release);
        self.active.write().take()
    }

    /// Read guard over the active session; `None` inside when idle.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Option<Arc<ActiveSession>>> {
        self.active.read()
    }

    pub fn current(&self) -> Option<Arc<ActiveSession>> {
        self.active.read().clone()
    }
}
