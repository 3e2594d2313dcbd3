// Remote-callable operation names, mirrored in contracts/bridge-methods.json.

// ── Session lifetime ───────────────────────────────────────────────
pub const INIT: &str = "init";
pub const DESTROY: &str = "destroy";

// ── Editor control ─────────────────────────────────────────────────
pub const SCROLL_TO_BUFFER_RANGE: &str = "scrollToBufferRange";
pub const OPEN_SOURCE: &str = "openSource";

/// All operations a registered editor endpoint answers.
pub const IMPLEMENTED_METHODS: &[&str] = &[INIT, DESTROY, SCROLL_TO_BUFFER_RANGE, OPEN_SOURCE];
