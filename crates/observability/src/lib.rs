//! Process-wide logging setup.

/// Tracing subscriber configuration.
pub mod tracing;

/// Initialize process-wide tracing.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::Json);
}
