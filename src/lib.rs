//! # xpipack Core Library
//!
//! This crate provides the core functionality for the `xpipack` packager,
//! which assembles a browser-extension package (`.xpi`, a plain ZIP archive)
//! from a manifest of include entries.
//!
//! It is designed to be used by the `xpipack` command-line application, but
//! its public API can also be used to drive packaging programmatically.
//!
//! ## Key Modules
//!
//! - [`manifest`]: The data-driven include list (built-in layout or JSON).
//! - [`packager`]: Validation, recursive directory copy, and atomic archive
//!   finalization.
//!
//! ## Examples
//!
//! ```no_run
//! use std::path::Path;
//! use xpipack::manifest::Manifest;
//!
//! let manifest = Manifest::builtin();
//! let written = xpipack::packager::run(
//!     &manifest,
//!     Path::new("."),
//!     Path::new("build/extension.xpi"),
//!     false,
//! )?;
//! println!("{written} files packaged");
//! # Ok::<(), xpipack::PackError>(())
//! ```

pub mod cli;
pub mod error;
pub mod manifest;
pub mod packager;

pub use error::PackError;
