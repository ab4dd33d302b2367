//! Diagnostic logger ([`Logger`]).
//!
//! The logger prints errors and warnings to stderr and counts them.
//! With the `no-logger` feature enabled, diagnostics are only counted.

#[cfg(not(feature = "no-logger"))]
use colored::*;

/// A logger that counts and prints diagnostics.
#[derive(Debug, Default)]
pub struct Logger {
  err_num: usize,
  warn_num: usize,
}

impl Logger {
  /// Creates a new logger.
  pub fn new() -> Self {
    Self::default()
  }

  /// Logs an error.
  #[cfg(feature = "no-logger")]
  pub fn log_error(&mut self, _: &str) {
    self.err_num += 1;
  }

  /// Logs an error.
  #[cfg(not(feature = "no-logger"))]
  pub fn log_error(&mut self, message: &str) {
    self.err_num += 1;
    eprintln!("{}: {}", "error".bright_red(), message);
  }

  /// Logs a warning.
  #[cfg(feature = "no-logger")]
  pub fn log_warning(&mut self, _: &str) {
    self.warn_num += 1;
  }

  /// Logs a warning.
  #[cfg(not(feature = "no-logger"))]
  pub fn log_warning(&mut self, message: &str) {
    self.warn_num += 1;
    eprintln!("{}: {}", "warning".yellow(), message);
  }

  /// Logs global information (total error/warning number).
  #[cfg(feature = "no-logger")]
  pub fn log_global(&self) {}

  /// Logs global information (total error/warning number).
  #[cfg(not(feature = "no-logger"))]
  pub fn log_global(&self) {
    if self.err_num == 0 && self.warn_num == 0 {
      return;
    }
    // error info
    if self.err_num != 0 {
      eprint!("{} {}", self.err_num, "error".bright_red());
      if self.err_num > 1 {
        eprint!("{}", "s".bright_red());
      }
    }
    // seperator
    if self.err_num != 0 && self.warn_num != 0 {
      eprint!(" and ");
    }
    // warning info
    if self.warn_num != 0 {
      eprint!("{} {}", self.warn_num, "warning".yellow());
      if self.warn_num > 1 {
        eprint!("{}", "s".yellow());
      }
    }
    eprintln!(" emitted");
  }

  /// Returns the number of errors.
  pub fn error_num(&self) -> usize {
    self.err_num
  }

  /// Returns the number of warnings.
  pub fn warning_num(&self) -> usize {
    self.warn_num
  }

  /// Checks if there are some errors.
  pub fn has_error(&self) -> bool {
    self.err_num != 0
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn count_diagnostics() {
    let mut logger = Logger::new();
    assert!(!logger.has_error());
    logger.log_warning("phi is incomplete");
    logger.log_warning("phi is incomplete");
    logger.log_error("unknown incoming block");
    assert_eq!(logger.warning_num(), 2);
    assert_eq!(logger.error_num(), 1);
    assert!(logger.has_error());
    logger.log_global();
  }
}
