use chrono::Local;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use std::io::Write;

/// Colored `time LEVEL [file:line] message` output; `RUST_LOG` overrides the `info` default.
/// Dependency chatter from the MQTT stack and the window backend is capped at `warn`.
pub fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("rumqttc", LevelFilter::Warn)
        .filter_module("eframe", LevelFilter::Warn)
        .filter_module("egui_glow", LevelFilter::Warn)
        .format(|buf, record| {
            let time = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let level_color = match record.level() {
                Level::Error => "\x1b[31m\x1b[1m", // 红色
                Level::Warn => "\x1b[33m\x1b[1m",  // 黄色
                Level::Info => "\x1b[32m\x1b[1m",  // 绿色
                Level::Debug => "\x1b[36m\x1b[1m", // 青色
                Level::Trace => "\x1b[90m\x1b[1m", // 灰色
            };
            writeln!(
                buf,
                "{}{} {:<5}\x1b[0m [{}:{}] {}",
                time,
                level_color,
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args(),
            )
        })
        .init();
}
