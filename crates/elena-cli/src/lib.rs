//! Elena CLI library.
//!
//! Output formatting for the `elena` binary, kept in a library so it can be
//! unit tested without spawning the process.

pub mod output;
