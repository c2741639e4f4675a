use log::{info, log_enabled, Level};

/// Log to console if info logging is enabled.
pub fn log(message: &'static str, data: impl AsRef<str>) {
    if log_enabled!(Level::Info) {
        info!("{message} - {}", data.as_ref());
    }
}

/// Pick one element of a slice uniformly at random.
pub fn pick<T>(items: &[T]) -> Option<&T> {
    if items.is_empty() {
        None
    } else {
        items.get(fastrand::usize(0..items.len()))
    }
}
