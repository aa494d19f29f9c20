//! Terminal output.
//!
//! Rendered reports go to stdout through [`document`]. Everything else
//! (status lines, warnings, errors) goes to stderr, so `--format json`
//! output can be piped straight into another program.

use console::{Emoji, style};
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// When set, only errors and documents are printed.
static QUIET_MODE: AtomicBool = AtomicBool::new(false);

static VERBOSITY: AtomicU8 = AtomicU8::new(0);

pub static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "OK ");
pub static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "!! ");
pub static ERROR: Emoji<'_, '_> = Emoji("❌ ", "ERR ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");

pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::SeqCst);
}

pub fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::SeqCst)
}

/// Level 0 is normal output, level 1+ enables verbose output.
pub fn set_verbosity(level: u8) {
    VERBOSITY.store(level, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSITY.load(Ordering::SeqCst) >= 1
}

pub fn success(msg: &str) {
    if !is_quiet() {
        eprintln!("{} {}", SUCCESS, style(msg).green());
    }
}

pub fn warning(msg: &str) {
    if !is_quiet() {
        eprintln!("{} {}", WARNING, style(msg).yellow());
    }
}

/// Print an error message. Never suppressed.
pub fn error(msg: &str) {
    eprintln!("{} {}", ERROR, style(msg).red().bold());
}

pub fn info(msg: &str) {
    if !is_quiet() {
        eprintln!("{} {}", INFO, style(msg).cyan());
    }
}

/// Only shown at verbosity 1 and above.
pub fn verbose(msg: &str) {
    if is_verbose() && !is_quiet() {
        eprintln!("{}", style(msg).dim());
    }
}

/// Write a rendered report to stdout, ending with exactly one newline.
pub fn document(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.trim_end_matches('\n').as_bytes())?;
    stdout.write_all(b"\n")?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_functions() {
        set_quiet(false);
        set_verbosity(0);

        // Smoke test
        success("Test success");
        warning("Test warning");
        error("Test error");
        info("Test info");
        verbose("Not shown");
    }

    #[test]
    fn test_quiet_and_verbosity() {
        set_quiet(true);
        assert!(is_quiet());
        set_quiet(false);
        assert!(!is_quiet());

        set_verbosity(2);
        assert!(is_verbose());
        set_verbosity(0);
        assert!(!is_verbose());
    }

    #[test]
    fn test_document_writes() {
        assert!(document("# Report\n\n").is_ok());
    }
}
