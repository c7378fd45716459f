use std::time::Duration;

/// 将时长格式化为 HH:MM:SS（小时不取模）
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;

    format!("{:02}:{:02}:{:02}", hours, minutes % 60, seconds % 60)
}
