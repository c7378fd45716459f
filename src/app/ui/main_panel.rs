use egui::{Color32, RichText};

use crate::app::app_core::SensorMonitorApp;
use crate::capture::SensorHub;
use crate::types::Activity;

pub fn render_main_panel<H: SensorHub>(app: &mut SensorMonitorApp<H>, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let is_recording = app.controller.is_recording();

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            ui.label("Activity:");

            // 记录中不允许切换活动
            ui.add_enabled_ui(!is_recording, |ui| {
                let current = app.controller.activity();
                let mut selected = current;
                egui::ComboBox::from_id_salt("activity_selector")
                    .selected_text(current.label())
                    .width(140.0)
                    .show_ui(ui, |ui| {
                        for activity in Activity::all() {
                            ui.selectable_value(&mut selected, activity, activity.label());
                        }
                    });
                if selected != current {
                    app.select_activity(selected);
                }
            });
        });

        ui.add_space(20.0);

        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new(&app.state.elapsed_text)
                    .size(48.0)
                    .monospace()
                    .color(Color32::BLACK),
            );

            ui.add_space(20.0);

            let (button_text, button_color) = if is_recording {
                ("⏹ Stop", Color32::from_rgb(200, 60, 60)) // 红色
            } else {
                ("▶ Start", Color32::from_rgb(0, 150, 0)) // 绿色
            };
            let button = egui::Button::new(RichText::new(button_text).size(20.0).color(Color32::WHITE))
                .fill(button_color)
                .min_size(egui::vec2(160.0, 48.0));

            if ui.add(button).clicked() {
                app.toggle_recording();
            }
        });
    });
}
