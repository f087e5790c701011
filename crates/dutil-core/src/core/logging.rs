//! Debug diagnostics for container internals
//!
//! Diagnostics are compiled only with the `debug-logging` feature and are
//! enabled at runtime through the `DUTIL_DEBUG` environment variable:
//!
//! ```bash
//! # Enable all diagnostics
//! DUTIL_DEBUG=1 cargo test --features debug-logging
//!
//! # Enable diagnostics for modules whose path contains "mem_pool"
//! DUTIL_DEBUG=mem_pool cargo test --features debug-logging
//! ```
//!
//! Output goes through `tracing::debug!`, so a subscriber must be installed
//! to see it. Failures are never reported here; they are returned.

/// Runtime switch for diagnostics, read once from the environment
#[cfg(feature = "debug-logging")]
pub mod switch {
    use std::sync::OnceLock;

    /// Parsed `DUTIL_DEBUG` value
    struct DebugSwitch {
        all: bool,
        patterns: Vec<String>,
    }

    static SWITCH: OnceLock<DebugSwitch> = OnceLock::new();

    fn load() -> &'static DebugSwitch {
        SWITCH.get_or_init(|| match std::env::var("DUTIL_DEBUG") {
            Ok(v) if v == "1" || v == "all" || v.eq_ignore_ascii_case("true") => DebugSwitch {
                all: true,
                patterns: Vec::new(),
            },
            Ok(v) => DebugSwitch {
                all: false,
                patterns: v.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect(),
            },
            Err(_) => DebugSwitch {
                all: false,
                patterns: Vec::new(),
            },
        })
    }

    /// Check if diagnostics are enabled for the given module path
    pub fn is_debug_enabled(module_path: &str) -> bool {
        let switch = load();
        switch.all || switch.patterns.iter().any(|p| module_path.contains(p.as_str()))
    }
}

/// Stub switch when the `debug-logging` feature is disabled
#[cfg(not(feature = "debug-logging"))]
pub mod switch {
    /// Always false without the `debug-logging` feature
    #[allow(dead_code)] // Used by macros
    pub fn is_debug_enabled(_module_path: &str) -> bool {
        false
    }
}

/// Emit a diagnostic line when enabled for the calling module.
///
/// ```ignore
/// debug_log!("rehash: {} -> {} buckets", old, new);
/// ```
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug-logging")]
        {
            if $crate::core::logging::switch::is_debug_enabled(module_path!()) {
                tracing::debug!($($arg)*);
            }
        }
    };
}
