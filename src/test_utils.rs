//! Guard for tests that touch process-global state.
//!
//! Environment variables and the working directory are shared by every
//! test thread, so tests that mutate either hold this guard: it
//! serializes them and restores whatever it changed on drop.

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

static PROCESS_STATE: Mutex<()> = Mutex::new(());

#[must_use]
pub struct TestProcess {
    _guard: MutexGuard<'static, ()>,
    saved_cwd: PathBuf,
    saved_vars: BTreeMap<OsString, Option<OsString>>,
}

impl TestProcess {
    pub fn new() -> Self {
        Self {
            _guard: PROCESS_STATE.lock().unwrap_or_else(|e| e.into_inner()),
            saved_cwd: env::current_dir().expect("current dir"),
            saved_vars: BTreeMap::new(),
        }
    }

    pub fn chdir(&mut self, path: impl AsRef<Path>) {
        env::set_current_dir(path.as_ref()).expect("chdir");
    }

    pub fn set_var(&mut self, key: impl Into<OsString>, value: impl AsRef<OsStr>) {
        let key = key.into();
        self.save_var(&key);
        unsafe {
            env::set_var(&key, value);
        }
    }

    fn save_var(&mut self, key: &OsStr) {
        self.saved_vars
            .entry(key.to_os_string())
            .or_insert_with(|| env::var_os(key));
    }
}

impl Drop for TestProcess {
    fn drop(&mut self) {
        for (key, previous) in std::mem::take(&mut self.saved_vars) {
            match previous {
                Some(value) => unsafe {
                    env::set_var(&key, value);
                },
                None => unsafe {
                    env::remove_var(&key);
                },
            }
        }
        let _ = env::set_current_dir(&self.saved_cwd);
    }
}
