use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick, Sender, TrySendError};
use log::{debug, warn};

use crate::utils::format_elapsed;

/// Updates pushed to whatever renders the elapsed time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    Elapsed(String),
}

/// Wakes the consuming surface after an event is queued (e.g. `egui::Context::request_repaint`).
pub type RepaintFn = Arc<dyn Fn() + Send + Sync + 'static>;

/// Periodic elapsed-time tick running on its own thread; dropped or stopped on session end.
pub struct ElapsedTicker {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ElapsedTicker {
    /// Emits immediately and then every `interval` until stopped.
    pub fn spawn(
        start_time: Instant,
        interval: Duration,
        display: Sender<DisplayEvent>,
        repaint: Option<RepaintFn>,
    ) -> Self {
        let (cancel_tx, cancel_rx) = bounded::<()>(0);

        let handle = thread::spawn(move || {
            let ticks = tick(interval);
            let emit = || {
                let text = format_elapsed(start_time.elapsed());
                match display.try_send(DisplayEvent::Elapsed(text)) {
                    Ok(()) => {}
                    // UI is behind; the next tick carries a fresher value anyway
                    Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => return false,
                }
                if let Some(repaint) = &repaint {
                    repaint();
                }
                true
            };

            if !emit() {
                return;
            }
            loop {
                select! {
                    recv(ticks) -> _ => {
                        if !emit() {
                            warn!("Display channel disconnected, ticker exiting");
                            break;
                        }
                    }
                    recv(cancel_rx) -> _ => break,
                }
            }
            debug!("Elapsed ticker stopped");
        });

        Self {
            cancel: Some(cancel_tx),
            handle: Some(handle),
        }
    }

    /// Cancels the tick and waits for the thread; no event is emitted after this returns.
    pub fn stop(&mut self) {
        // dropping the sender wakes the select with a disconnect
        self.cancel.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Elapsed ticker thread panicked");
            }
        }
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn emits_immediately_then_periodically() {
        let (tx, rx) = unbounded();
        let mut ticker = ElapsedTicker::spawn(Instant::now(), Duration::from_millis(20), tx, None);

        let first = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(first, DisplayEvent::Elapsed("00:00:00".to_string()));
        assert!(rx.recv_timeout(Duration::from_secs(1)).is_ok());

        ticker.stop();
        while rx.try_recv().is_ok() {}
        std::thread::sleep(Duration::from_millis(60));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn reports_elapsed_from_start_time() {
        let (tx, rx) = unbounded();
        let start = Instant::now()
            .checked_sub(Duration::from_secs(3_725))
            .expect("clock too close to its origin");
        let _ticker = ElapsedTicker::spawn(start, Duration::from_secs(60), tx, None);

        let DisplayEvent::Elapsed(text) = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(text, "01:02:05");
    }

    #[test]
    fn calls_repaint_on_each_tick() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let (tx, rx) = unbounded();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let mut ticker = ElapsedTicker::spawn(
            Instant::now(),
            Duration::from_secs(60),
            tx,
            Some(Arc::new(move || {
                seen.fetch_add(1, Ordering::SeqCst);
            })),
        );
        rx.recv_timeout(Duration::from_secs(1)).unwrap();
        ticker.stop();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
