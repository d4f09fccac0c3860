//! Environment variable management for testing
//!
//! Tests that exercise env-var precedence mutate process-global state, so
//! every mutation goes through a guard that restores the original value on
//! drop.

use std::env;

/// Guards a single environment variable, restoring its original value (or
/// absence) when dropped.
pub struct EnvVarGuard {
  name: String,
  original: Option<String>,
}

impl EnvVarGuard {
  /// Capture the current value of `name` without changing it.
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      original: env::var(name).ok(),
    }
  }

  /// Set the guarded variable to `value`.
  pub fn set(&self, value: &str) {
    // SAFETY: tests that mutate the environment are process-global by nature;
    // the guard restores the previous value on drop.
    unsafe {
      env::set_var(&self.name, value);
    }
  }

  /// Remove the guarded variable from the environment.
  pub fn clear(&self) {
    // SAFETY: see `set`.
    unsafe {
      env::remove_var(&self.name);
    }
  }
}

impl Drop for EnvVarGuard {
  fn drop(&mut self) {
    match &self.original {
      // SAFETY: restoring the value captured at construction time.
      Some(val) => unsafe {
        env::set_var(&self.name, val);
      },
      // SAFETY: the variable was unset when the guard was created.
      None => unsafe {
        env::remove_var(&self.name);
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_env_var_guard_restores_value() {
    let name = "DESKHAND_TEST_GUARD_RESTORE";
    // SAFETY: test-local variable name, removed again below.
    unsafe {
      env::set_var(name, "before");
    }

    {
      let guard = EnvVarGuard::new(name);
      guard.set("during");
      assert_eq!(env::var(name).as_deref(), Ok("during"));
    }
    assert_eq!(env::var(name).as_deref(), Ok("before"));

    // SAFETY: cleanup of a test-local variable.
    unsafe {
      env::remove_var(name);
    }
  }

  #[test]
  fn test_env_var_guard_restores_absence() {
    let name = "DESKHAND_TEST_GUARD_ABSENT";
    {
      let guard = EnvVarGuard::new(name);
      guard.set("temporary");
      assert!(env::var(name).is_ok());
    }
    assert!(env::var(name).is_err());
  }
}
