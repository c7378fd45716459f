use egui::Color32;

use crate::app::app_core::SensorMonitorApp;
use crate::capture::SensorHub;
use crate::types::SensorKind;

pub fn render_status_bar<H: SensorHub>(app: &mut SensorMonitorApp<H>, ctx: &egui::Context) {
    egui::TopBottomPanel::top("status_bar")
        .min_height(40.0)
        .show(ctx, |ui| {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.label("Status:");

                let (status_text, status_color) = if app.controller.is_recording() {
                    ("Recording", Color32::from_rgb(0, 150, 0)) // 绿色
                } else {
                    ("Idle", Color32::from_rgb(150, 0, 0)) // 红色
                };
                ui.colored_label(status_color, status_text);

                if let Some(session) = app.controller.session().current() {
                    ui.separator();
                    ui.label(format!("Since {}", session.started_at.format("%H:%M:%S")));
                    ui.separator();
                    ui.label(format!("Output: {}", session.files.directory.display()));
                }
            });
            ui.add_space(5.0);
        });

    egui::TopBottomPanel::bottom("bottom_status_bar")
        .min_height(25.0)
        .show(ctx, |ui| {
            ui.add_space(3.0);
            ui.horizontal(|ui| {
                let counters = &app.controller.session().counters;
                for kind in SensorKind::RECORDED {
                    match counter_label(kind, counters.written(kind), counters.failed(kind)) {
                        (text, Some(color)) => ui.colored_label(color, text),
                        (text, None) => ui.label(text),
                    };
                    ui.separator();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if !app.state.status_message.is_empty() {
                        ui.colored_label(Color32::from_rgb(0, 100, 200), &app.state.status_message);
                    }
                });
            });
            ui.add_space(3.0);
        });
}

/// 每路传感器的计数文本，写入失败时标红
fn counter_label(kind: SensorKind, written: u64, failed: u64) -> (String, Option<Color32>) {
    let text = format!("{}: {}", kind.display_name(), written);
    if failed > 0 {
        (format!("{} ({} failed)", text, failed), Some(Color32::from_rgb(200, 0, 0)))
    } else {
        (text, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_label_flags_failures() {
        assert_eq!(counter_label(SensorKind::Gravity, 12, 0), ("Gravity: 12".to_string(), None));
        assert_eq!(
            counter_label(SensorKind::Gyroscope, 3, 2),
            ("Gyroscope: 3 (2 failed)".to_string(), Some(Color32::from_rgb(200, 0, 0)))
        );
    }
}
