//! # buglink
//!
//! Annotates source-control changelog text with Bugzilla links.
//!
//! ## Features
//!
//! - **Bug-ID linking**: find bug references with a configurable
//!   pattern and wrap them in anchors to the tracker
//! - **Summary tooltips**: batch-resolve the referenced bugs to
//!   one-line summaries in a single XML-RPC round trip
//! - **Self-healing session**: lazy transport construction and a
//!   one-shot re-login when the tracker expires the session
//! - **Fail-open annotation**: lookup and pattern problems degrade to
//!   plain links or unannotated text, never a broken build
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use buglink::{Annotator, Session, TrackerConfig};
//!
//! # async fn example() -> buglink::Result<()> {
//! let config = TrackerConfig {
//!     base_url: "https://bugs.example.com".to_string(),
//!     use_tooltips: true,
//!     ..Default::default()
//! };
//! let session = Session::new(&config)?;
//!
//! let annotator = Annotator::new(&config, Some(&session));
//! let html = annotator.annotate("Fixes 123 and 456").await;
//! println!("{}", html);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Changelog annotation pass
pub mod annotate;

/// Administrative validation checks
pub mod check;

/// Tracker connection and annotation configuration
pub mod config;

/// Error types used throughout the library
pub mod error;

/// Markup buffer for span-wrapping rewrites
pub mod markup;

/// Bug-ID pattern compilation and extraction
pub mod pattern;

/// Tracker client over XML-RPC
pub mod session;

/// XML-RPC wire format
pub mod xmlrpc;

/// Test utilities for exercising the client without a network
#[doc(hidden)]
pub mod test_utils;

// Re-export core types
pub use annotate::Annotator;
pub use config::{FallbackPolicy, TrackerConfig, YamlConfig};
pub use error::{BuglinkError, Result};
pub use markup::MarkupText;
pub use session::{HttpTransport, Session, Transport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
