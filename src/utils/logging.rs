// ============================================================================
// Logging Setup
// Console subscriber for binaries and demos
// ============================================================================

use tracing::Level;

/// Install a formatted console subscriber at `level`.
///
/// Returns false when a global subscriber was already installed, which is
/// normal when several tests or embedding applications call this.
pub fn init_logging(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok()
}
