//! Panic handler module
//!
//! - Server mode: colored report with backtrace, appended to crash.log
//! - CLI mode: one-line message, appended to crash.log

use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic;

const CRASH_LOG: &str = "crash.log";

/// Running mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Server,
    Cli,
}

/// Install custom panic hook
pub fn install_panic_hook(mode: RunMode) {
    panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "Unknown location".to_string());

        let backtrace = std::backtrace::Backtrace::force_capture();
        let report = CrashReport {
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            thread: std::thread::current().name().unwrap_or("<unnamed>").to_string(),
            message,
            location,
            backtrace: format!("{:?}", backtrace),
        };

        if let Err(e) = report.append_to(CRASH_LOG) {
            eprintln!("Failed to write crash log: {}", e);
        }

        match mode {
            #[cfg(feature = "server")]
            RunMode::Server => report.display_colored(),
            #[cfg(not(feature = "server"))]
            RunMode::Server => report.display_simple(),
            RunMode::Cli => report.display_simple(),
        }
    }));
}

struct CrashReport {
    timestamp: String,
    thread: String,
    message: String,
    location: String,
    backtrace: String,
}

impl CrashReport {
    fn append_to(&self, path: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        writeln!(file, "==========================================")?;
        writeln!(file, "slideforge crash - {}", self.timestamp)?;
        writeln!(file, "==========================================")?;
        writeln!(file, "Thread: {}", self.thread)?;
        writeln!(file, "Message: {}", self.message)?;
        writeln!(file, "Location: {}", self.location)?;
        writeln!(file, "\nBacktrace:")?;
        writeln!(file, "{}", self.backtrace)?;
        writeln!(file, "==========================================\n")?;
        Ok(())
    }

    #[cfg(feature = "server")]
    fn display_colored(&self) {
        use colored::Colorize;

        let rule = "═══════════════════════════════════════════════════".red().bold();
        eprintln!();
        eprintln!("{}", rule);
        eprintln!("{} {}", "PANIC in thread".red().bold(), self.thread.red());
        eprintln!("{}", rule);
        eprintln!("{} {}", "Reason:".yellow().bold(), self.message.white());
        eprintln!("{} {}", "Location:".yellow().bold(), self.location.white());
        eprintln!();
        eprintln!("{}", "Backtrace:".yellow().bold());
        eprintln!("{}", self.backtrace.dimmed());
        eprintln!("{}", format!("Details saved to {}", CRASH_LOG).cyan());
        eprintln!("{}", rule);
        eprintln!();
    }

    fn display_simple(&self) {
        eprintln!();
        eprintln!("slideforge panicked: {}", self.message);
        eprintln!("Details saved to {}", CRASH_LOG);
        eprintln!();
    }
}
