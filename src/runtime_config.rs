//! Environment-based runtime configuration.
//!
//! ## `RESTWIRE_STACK_SIZE`
//!
//! Stack size for connection coroutines, in decimal (`65536`) or hex
//! (`0x10000`). Default: 64 KB. Total memory is roughly
//! `stack_size x concurrent_connections`; tune down for very high connection
//! counts, up for handlers with deep call chains.

use std::env;

const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Runtime configuration loaded from environment variables.
///
/// Load this at startup with [`RuntimeConfig::from_env()`] and hand it to the
/// server before traffic begins.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for connection coroutines in bytes (default: 64 KB / 0x10000).
    pub stack_size: usize,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = match env::var("RESTWIRE_STACK_SIZE") {
            Ok(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(DEFAULT_STACK_SIZE)
                } else {
                    val.parse().unwrap_or(DEFAULT_STACK_SIZE)
                }
            }
            Err(_) => DEFAULT_STACK_SIZE,
        };
        RuntimeConfig { stack_size }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}
