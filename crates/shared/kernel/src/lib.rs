//! Kernel utilities shared by the engine crates.
//!
//! Holds the contracts the engine consumes from the outside world
//! ([`directory`]), in-memory implementations of those contracts for tests
//! and the replay tool ([`memory`]), plus the ambient helpers: config
//! loading, an injectable [`clock::Clock`], id generation and
//! [`batch::BatchReport`].
//!
//! ## ID generation
//! ```rust
//! # use jal_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Config loading
//! ```rust,ignore
//! use jal_domain::config::EngineConfig;
//! use jal_kernel::config::load_config;
//!
//! let cfg: EngineConfig = load_config(Some("config/engine.toml"))?;
//! ```
pub mod batch;
pub mod clock;
pub mod config;
pub mod directory;
mod error;
pub mod ids;
pub mod memory;

pub use crate::error::{KernelError, KernelErrorExt};

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use jal_domain as domain;
pub use nanoid::nanoid;

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}
