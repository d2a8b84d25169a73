//! Global configuration for trackfill runtime behavior.
//!
//! This module provides thread-safe global configuration that affects
//! input checking without adding overhead to the fill loop.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag for the optional input validation pass.
///
/// When enabled, engines built with [`crate::fill::FillEngine::new`] check
/// that the track is sorted and pairwise disjoint before filling, and the
/// bedGraph loader rejects out-of-order records.
///
/// This is set once at startup and read when engines and readers are built.
static VALIDATE_INPUTS: AtomicBool = AtomicBool::new(false);

/// Enable or disable input validation.
///
/// # Example
///
/// ```
/// use trackfill::config;
///
/// // Enable at startup before building any engine
/// config::set_validate_inputs(true);
/// assert!(config::is_validate_inputs());
/// # config::set_validate_inputs(false);
/// ```
#[inline]
pub fn set_validate_inputs(enabled: bool) {
    VALIDATE_INPUTS.store(enabled, Ordering::Release);
}

/// Check if input validation is enabled.
#[inline]
pub fn is_validate_inputs() -> bool {
    VALIDATE_INPUTS.load(Ordering::Acquire)
}
