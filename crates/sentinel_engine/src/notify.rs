//! Best-effort user notifications. Delivery failures are logged, never returned.

use std::process::Command;
use std::thread;

use sentinel_logging::{sentinel_info, sentinel_warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Stay on screen until dismissed.
    pub sticky: bool,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Desktop notifications via `notify-send` on Linux and `osascript` on macOS.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new("sentinel")
    }
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    fn command(&self, notification: &Notification) -> Result<Command, String> {
        if cfg!(target_os = "macos") {
            let mut command = Command::new("osascript");
            command.arg("-e").arg(applescript(notification));
            Ok(command)
        } else if cfg!(unix) {
            let mut command = Command::new("notify-send");
            command.arg(format!("--app-name={}", self.app_name));
            if notification.sticky {
                command.arg("--urgency=critical").arg("--expire-time=0");
            }
            command.arg(&notification.title).arg(&notification.body);
            Ok(command)
        } else {
            Err("no desktop notification backend on this platform".to_string())
        }
    }
}

impl Notifier for DesktopNotifier {
    /// Returns once the helper is launched on its own thread.
    fn notify(&self, notification: &Notification) {
        let mut command = match self.command(notification) {
            Ok(command) => command,
            Err(err) => {
                sentinel_warn!("Notification {:?} dropped: {}", notification.title, err);
                return;
            }
        };
        let title = notification.title.clone();
        let spawned = thread::Builder::new()
            .name("notify".into())
            .spawn(move || match run(&mut command) {
                Ok(()) => sentinel_info!("Notified: {}", title),
                Err(err) => sentinel_warn!("Notification {:?} dropped: {}", title, err),
            });
        if let Err(err) = spawned {
            sentinel_warn!("Notification {:?} dropped: {}", notification.title, err);
        }
    }
}

fn run(command: &mut Command) -> Result<(), String> {
    let tool = command.get_program().to_string_lossy().into_owned();
    let output = command
        .output()
        .map_err(|e| format!("{tool} failed: {e}"))?;
    if output.status.success() {
        Ok(())
    } else {
        Err(format!("{tool} exited with: {}", output.status))
    }
}

/// Sticky notifications are shown as an alert dialog, which stays open until
/// dismissed.
fn applescript(notification: &Notification) -> String {
    let title = escape_applescript(&notification.title);
    let body = escape_applescript(&notification.body);
    if notification.sticky {
        format!(r#"display alert "{title}" message "{body}""#)
    } else {
        format!(r#"display notification "{body}" with title "{title}""#)
    }
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Writes notifications to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        sentinel_info!(
            "[notification] {}: {}",
            notification.title,
            notification.body.replace('\n', " | ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applescript_quotes_and_backslashes_are_escaped() {
        assert_eq!(escape_applescript(r#"a "b" \c"#), r#"a \"b\" \\c"#);
    }

    #[test]
    fn sticky_notification_becomes_alert_on_macos() {
        let mut notification = Notification {
            title: "New results published".to_string(),
            body: "1 new:\n-> \"Optics\"".to_string(),
            sticky: true,
        };
        assert_eq!(
            applescript(&notification),
            r#"display alert "New results published" message "1 new:
-> \"Optics\"""#
        );

        notification.sticky = false;
        assert!(applescript(&notification).starts_with("display notification "));
    }
}
