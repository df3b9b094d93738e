//! # CLI Command Implementations
//!
//! Each command lives in its own file and contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `ruff_sync` library.
//!
//! `ruff-sync` has a single command, `sync`, which runs when the binary is
//! invoked.

pub mod sync;
