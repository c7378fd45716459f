use crossbeam_channel::Receiver;

use crate::capture::DisplayEvent;
use crate::utils::format_elapsed;

/// 应用状态管理模块
/// UI-side state only; recording state lives in the capture controller.

/// 界面显示状态
#[derive(Debug)]
pub struct AppState {
    pub elapsed_text: String,
    pub status_message: String,
    pub display_receiver: Receiver<DisplayEvent>,
}

impl AppState {
    pub fn new(display_receiver: Receiver<DisplayEvent>) -> Self {
        Self {
            elapsed_text: format_elapsed(std::time::Duration::ZERO),
            status_message: String::new(),
            display_receiver,
        }
    }

    /// Applies every queued display update; the latest one wins.
    pub fn drain_display_events(&mut self) {
        while let Ok(event) = self.display_receiver.try_recv() {
            match event {
                DisplayEvent::Elapsed(text) => self.elapsed_text = text,
            }
        }
    }
}
