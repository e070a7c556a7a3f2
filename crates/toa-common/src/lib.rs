//! TOA Common Library
//!
//! Shared error handling, logging and file codecs for the TOA batch tools.
//!
//! # Overview
//!
//! - **Error Handling**: `ToaError` with the stable error codes printed by every tool
//! - **Logging**: tracing subscriber setup driven by the `--trace` flag and `TOA_LOG_*`
//! - **Codecs**: plain or gzip ISO-8859-1 line streams, resolved once per path
//!
//! # Example
//!
//! ```no_run
//! use toa_common::codec::LineReader;
//! use toa_common::Result;
//!
//! fn count_lines(path: &str) -> Result<u64> {
//!     let mut reader = LineReader::open(path)?;
//!     while reader.next_line()?.is_some() {}
//!     Ok(reader.line_number())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod codec;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use codec::{Codec, LineReader, LineWriter};
pub use error::{Result, ToaError};
