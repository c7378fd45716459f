use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use eframe::Frame;
use log::{error, info};

use super::state::AppState;
use crate::capture::{CaptureController, DisplayEvent, SensorHub, ToggleOutcome};
use crate::types::Activity;

pub struct SensorMonitorApp<H: SensorHub> {
    // 界面状态
    pub state: AppState,

    // 采集控制器
    pub controller: CaptureController<H>,
}

impl<H: SensorHub> SensorMonitorApp<H> {
    pub fn new(
        ctx: &egui::Context,
        mut controller: CaptureController<H>,
        display_receiver: Receiver<DisplayEvent>,
    ) -> Self {
        // ticker runs on its own thread; wake the UI whenever it pushes an update
        let repaint_ctx = ctx.clone();
        controller.set_repaint(Arc::new(move || repaint_ctx.request_repaint()));

        info!("应用启动，选择活动后点击 Start 开始记录");

        Self {
            state: AppState::new(display_receiver),
            controller,
        }
    }

    pub fn toggle_recording(&mut self) {
        match self.controller.toggle() {
            Ok(ToggleOutcome::Started(session)) => {
                self.state.status_message = format!("Recording {}", session.activity.label());
            }
            Ok(ToggleOutcome::Stopped(report)) => {
                let dropped: usize = report.trimmed.iter().map(|(_, trim)| trim.lines_removed).sum();
                self.state.status_message = format!(
                    "Saved to {} ({} trailing lines dropped)",
                    report.session.files.directory.display(),
                    dropped
                );
            }
            Err(e) => {
                error!("Start/stop failed: {}", e);
                self.state.status_message = e.to_string();
            }
        }
    }

    pub fn select_activity(&mut self, activity: Activity) {
        if let Err(e) = self.controller.select_activity(activity.code()) {
            self.state.status_message = e.to_string();
        }
    }
}

impl<H: SensorHub> eframe::App for SensorMonitorApp<H> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // 设置明亮模式主题
        ctx.set_visuals(egui::Visuals::light());

        self.state.drain_display_events();

        // 渲染UI组件
        crate::app::ui::render_status_bar(self, ctx);
        crate::app::ui::render_main_panel(self, ctx);

        if self.controller.is_recording() {
            // keeps the sample counters moving between ticks
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
