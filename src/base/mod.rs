//! Base types and error handling.
//!
//! Provides foundational types mirroring Chromium's `net/base/`:
//! - [`NetError`]: Network error codes matching `net_error_list.h`

pub mod neterror;

pub use neterror::NetError;

#[cfg(test)]
mod tests;
