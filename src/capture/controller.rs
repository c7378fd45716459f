use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use log::{error, info, warn};

use super::error::CaptureError;
use super::output::{trim_tail_lines, OutputFiles, TrimReport};
use super::session::{ActiveSession, SessionHandle};
use super::ticker::{DisplayEvent, ElapsedTicker, RepaintFn};
use crate::config::CaptureConfig;
use crate::types::{Activity, SensorKind};
use crate::utils::format_elapsed;

/// Source of the three motion-sensor streams.
///
/// Implementations deliver events to a [`super::SampleRouter`] on their own thread; the
/// controller only decides which streams are wanted.
pub trait SensorHub {
    /// Whether the sensor exists at all. Missing sensors are never subscribed.
    fn is_available(&self, kind: SensorKind) -> bool;

    fn subscribe(&mut self, kind: SensorKind, sampling_period: Duration) -> Result<(), CaptureError>;

    fn unsubscribe_all(&mut self);
}

/// Result of a completed stop.
#[derive(Debug)]
pub struct StopReport {
    pub session: Arc<ActiveSession>,
    pub trimmed: Vec<(SensorKind, TrimReport)>,
}

/// What a start/stop toggle did.
#[derive(Debug)]
pub enum ToggleOutcome {
    Started(Arc<ActiveSession>),
    Stopped(StopReport),
}

/// Owns the session lifecycle. Lives on the UI thread and is the only writer of
/// [`SessionHandle`].
pub struct CaptureController<H: SensorHub> {
    hub: H,
    session: Arc<SessionHandle>,
    output_root: PathBuf,
    sampling_period: Duration,
    tick_interval: Duration,
    trim_lines: usize,
    display: Sender<DisplayEvent>,
    repaint: Option<RepaintFn>,
    ticker: Option<ElapsedTicker>,
}

impl<H: SensorHub> CaptureController<H> {
    pub fn new(
        hub: H,
        session: Arc<SessionHandle>,
        config: &CaptureConfig,
        display: Sender<DisplayEvent>,
    ) -> Self {
        for kind in SensorKind::RECORDED {
            if !hub.is_available(kind) {
                error!("{} sensor not found!", kind.display_name());
            }
        }

        Self {
            hub,
            session,
            output_root: config.output_root(),
            sampling_period: config.sampling_period(),
            tick_interval: config.tick_interval(),
            trim_lines: config.trim_lines,
            display,
            repaint: None,
            ticker: None,
        }
    }

    /// Callback run after every display update so the UI wakes up.
    pub fn set_repaint(&mut self, repaint: RepaintFn) {
        self.repaint = Some(repaint);
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_recording()
    }

    pub fn activity(&self) -> Activity {
        self.session.activity()
    }

    pub fn session(&self) -> &Arc<SessionHandle> {
        &self.session
    }

    pub fn select_activity(&mut self, code: usize) -> Result<Activity, CaptureError> {
        let activity = Activity::from_code(code).ok_or(CaptureError::UnknownActivity(code))?;
        self.session.set_activity(activity);
        Ok(activity)
    }

    /// Start/stop button handler; always takes the valid transition.
    pub fn toggle(&mut self) -> Result<ToggleOutcome, CaptureError> {
        if self.is_recording() {
            self.stop().map(ToggleOutcome::Stopped)
        } else {
            self.start().map(ToggleOutcome::Started)
        }
    }

    pub fn start(&mut self) -> Result<Arc<ActiveSession>, CaptureError> {
        self.start_at(Instant::now())
    }

    pub fn start_at(&mut self, now: Instant) -> Result<Arc<ActiveSession>, CaptureError> {
        if self.session.is_recording() {
            return Err(CaptureError::AlreadyRecording);
        }

        let activity = self.session.activity();
        let files = OutputFiles::resolve(&self.output_root, activity);
        files.prepare()?;

        let active = self.session.begin(ActiveSession::new(activity, now, files));

        for kind in SensorKind::RECORDED {
            if !self.hub.is_available(kind) {
                continue;
            }
            if let Err(e) = self.hub.subscribe(kind, self.sampling_period) {
                error!("{}", e);
            }
        }

        self.ticker = Some(ElapsedTicker::spawn(
            now,
            self.tick_interval,
            self.display.clone(),
            self.repaint.clone(),
        ));

        info!(
            "Recording started: activity {}, output {}",
            activity,
            active.files.directory.display()
        );
        Ok(active)
    }

    pub fn stop(&mut self) -> Result<StopReport, CaptureError> {
        // waits for any in-flight append before returning
        let session = self.session.end().ok_or(CaptureError::NotRecording)?;

        self.hub.unsubscribe_all();

        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
        if self
            .display
            .try_send(DisplayEvent::Elapsed(format_elapsed(Duration::ZERO)))
            .is_err()
        {
            warn!("Failed to reset elapsed display");
        }
        if let Some(repaint) = &self.repaint {
            repaint();
        }

        let mut trimmed = Vec::new();
        for (kind, path) in session.files.iter() {
            match trim_tail_lines(path, self.trim_lines) {
                Ok(Some(report)) => {
                    info!(
                        "Trimmed {}: removed {} lines, {} bytes kept",
                        path.display(),
                        report.lines_removed,
                        report.bytes_kept
                    );
                    trimmed.push((kind, report));
                }
                Ok(None) => {}
                Err(e) => error!("Failed to trim {}: {}", path.display(), e),
            }
        }

        info!(
            "Recording stopped after {}",
            format_elapsed(session.elapsed_at(Instant::now()))
        );
        Ok(StopReport { session, trimmed })
    }
}

impl<H: SensorHub> Drop for CaptureController<H> {
    fn drop(&mut self) {
        if self.is_recording() {
            if let Err(e) = self.stop() {
                warn!("Failed to stop recording on shutdown: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::router::{RouteOutcome, SampleRouter};
    use crate::types::SensorEvent;
    use crossbeam_channel::{unbounded, Receiver};
    use std::collections::HashSet;
    use std::fs;
    use std::sync::atomic::{AtomicBool, Ordering};
    use parking_lot::Mutex;
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct HubLog {
        subscribed: Vec<(SensorKind, Duration)>,
        unsubscribe_calls: usize,
    }

    struct FakeHub {
        available: HashSet<SensorKind>,
        log: Arc<Mutex<HubLog>>,
        fail_gravity: bool,
    }

    impl SensorHub for FakeHub {
        fn is_available(&self, kind: SensorKind) -> bool {
            self.available.contains(&kind)
        }

        fn subscribe(&mut self, kind: SensorKind, sampling_period: Duration) -> Result<(), CaptureError> {
            if self.fail_gravity && kind == SensorKind::Gravity {
                return Err(CaptureError::Subscribe {
                    kind,
                    reason: "broker refused".to_string(),
                });
            }
            self.log.lock().subscribed.push((kind, sampling_period));
            Ok(())
        }

        fn unsubscribe_all(&mut self) {
            self.log.lock().unsubscribe_calls += 1;
        }
    }

    struct Fixture {
        dir: TempDir,
        controller: CaptureController<FakeHub>,
        router: SampleRouter,
        display: Receiver<DisplayEvent>,
        log: Arc<Mutex<HubLog>>,
    }

    fn fixture_with(available: &[SensorKind], fail_gravity: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = CaptureConfig {
            output_dir: dir.path().to_string_lossy().into_owned(),
            tick_interval_ms: 50,
            ..CaptureConfig::default()
        };
        let log = Arc::new(Mutex::new(HubLog::default()));
        let hub = FakeHub {
            available: available.iter().copied().collect(),
            log: Arc::clone(&log),
            fail_gravity,
        };
        let session = SessionHandle::new();
        let router = SampleRouter::new(Arc::clone(&session), config.warmup());
        let (tx, rx) = unbounded();
        let controller = CaptureController::new(hub, session, &config, tx);
        Fixture {
            dir,
            controller,
            router,
            display: rx,
            log,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(&SensorKind::RECORDED, false)
    }

    fn gravity(t: i64) -> SensorEvent {
        SensorEvent::new(SensorKind::Gravity, t, [0.1, 9.7, 0.2])
    }

    #[test]
    fn start_subscribes_and_creates_activity_dir() {
        let mut f = fixture();
        f.controller.select_activity(2).unwrap();
        let active = f.controller.start().unwrap();

        assert!(f.controller.is_recording());
        assert_eq!(active.files.directory, f.dir.path().join("2"));
        assert!(active.files.directory.is_dir());

        let log = f.log.lock();
        let kinds: Vec<SensorKind> = log.subscribed.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, SensorKind::RECORDED.to_vec());
        assert!(log.subscribed.iter().all(|(_, p)| *p == Duration::from_millis(10)));
    }

    #[test]
    fn missing_sensor_is_never_subscribed() {
        let mut f = fixture_with(&[SensorKind::LinearAcceleration, SensorKind::Gravity], false);
        f.controller.start().unwrap();
        let kinds: Vec<SensorKind> = f.log.lock().subscribed.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![SensorKind::LinearAcceleration, SensorKind::Gravity]);
    }

    #[test]
    fn failed_subscribe_does_not_abort_start() {
        let mut f = fixture_with(&SensorKind::RECORDED, true);
        f.controller.start().unwrap();
        assert!(f.controller.is_recording());
        assert_eq!(f.log.lock().subscribed.len(), 2);
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let mut f = fixture();
        assert!(matches!(f.controller.stop(), Err(CaptureError::NotRecording)));
        f.controller.start().unwrap();
        assert!(matches!(f.controller.start(), Err(CaptureError::AlreadyRecording)));
        f.controller.stop().unwrap();
    }

    #[test]
    fn rejects_unknown_activity() {
        let mut f = fixture();
        assert!(matches!(
            f.controller.select_activity(7),
            Err(CaptureError::UnknownActivity(7))
        ));
        assert_eq!(f.controller.activity().code(), 0);
    }

    #[test]
    fn end_to_end_gravity_sample() {
        let mut f = fixture();
        f.controller.select_activity(2).unwrap();
        let start = Instant::now();
        let active = f.controller.start_at(start).unwrap();

        assert_eq!(
            f.router.route(&gravity(2_000_000_000), start + Duration::from_secs(2)),
            RouteOutcome::WarmingUp
        );
        assert_eq!(
            f.router.route(&gravity(6_000_000_000), start + Duration::from_secs(6)),
            RouteOutcome::Written
        );

        let path = active.files.path_for(SensorKind::Gravity).unwrap().to_path_buf();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "2,6000000,1.000000000e-01,9.700000000e+00,2.000000000e-01\n"
        );
    }

    #[test]
    fn stop_trims_tail_and_unsubscribes() {
        let mut f = fixture();
        let start = Instant::now();
        let active = f.controller.start_at(start).unwrap();
        let at = start + Duration::from_secs(10);

        for i in 0..300 {
            f.router.route(&SensorEvent::new(SensorKind::LinearAcceleration, i, [1.0, 2.0, 3.0]), at);
        }
        for i in 0..700 {
            f.router.route(&gravity(i), at);
        }
        let gravity_path = active.files.path_for(SensorKind::Gravity).unwrap().to_path_buf();
        let gravity_before = fs::read_to_string(&gravity_path).unwrap();

        let report = f.controller.stop().unwrap();
        assert!(!f.controller.is_recording());
        assert_eq!(f.log.lock().unsubscribe_calls, 1);

        let linear_path = active.files.path_for(SensorKind::LinearAcceleration).unwrap();
        assert_eq!(fs::read_to_string(linear_path).unwrap(), "");

        let gravity_after = fs::read_to_string(&gravity_path).unwrap();
        assert_eq!(gravity_after.lines().count(), 200);
        assert!(gravity_before.starts_with(&gravity_after));

        // gyro never received anything, so it was never created and not trimmed
        assert_eq!(report.trimmed.len(), 2);
    }

    #[test]
    fn nothing_written_after_stop() {
        let mut f = fixture();
        let start = Instant::now();
        let active = f.controller.start_at(start).unwrap();
        f.controller.stop().unwrap();

        let outcome = f.router.route(&gravity(1), start + Duration::from_secs(30));
        assert_eq!(outcome, RouteOutcome::NotRecording);
        assert!(!active.files.path_for(SensorKind::Gravity).unwrap().exists());
    }

    #[test]
    fn toggle_alternates_and_resets_display() {
        let mut f = fixture();
        assert!(matches!(f.controller.toggle().unwrap(), ToggleOutcome::Started(_)));
        assert!(f.controller.is_recording());
        assert!(f.display.recv_timeout(Duration::from_secs(1)).is_ok());

        assert!(matches!(f.controller.toggle().unwrap(), ToggleOutcome::Stopped(_)));
        assert!(!f.controller.is_recording());
        let last = f.display.try_iter().last().unwrap();
        assert_eq!(last, DisplayEvent::Elapsed("00:00:00".to_string()));
    }

    #[test]
    fn repaint_runs_on_stop() {
        let mut f = fixture();
        let woke = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&woke);
        f.controller.set_repaint(Arc::new(move || flag.store(true, Ordering::SeqCst)));
        f.controller.start().unwrap();
        f.controller.stop().unwrap();
        assert!(woke.load(Ordering::SeqCst));
    }

    #[test]
    fn sessions_for_different_activities_use_separate_dirs() {
        let mut f = fixture();
        let start = Instant::now();
        f.controller.select_activity(1).unwrap();
        let walking = f.controller.start_at(start).unwrap();
        f.router.route(&gravity(1), start + Duration::from_secs(6));
        f.controller.stop().unwrap();

        f.controller.select_activity(4).unwrap();
        let sitting = f.controller.start_at(start).unwrap();
        assert_ne!(walking.files.directory, sitting.files.directory);
        f.controller.stop().unwrap();
    }
}
