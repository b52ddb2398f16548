#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
pub(crate) static ENV_LOCK: Mutex<()> = Mutex::new(());

#[cfg(test)]
pub(crate) static TRACING_LOCK: Mutex<()> = Mutex::new(());

#[cfg(test)]
pub(crate) fn set_env_var(key: &str, value: impl AsRef<std::ffi::OsStr>) {
    unsafe {
        std::env::set_var(key, value);
    }
}

#[cfg(test)]
pub(crate) fn remove_env_var(key: &str) {
    unsafe {
        std::env::remove_var(key);
    }
}
