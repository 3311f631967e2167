//! Extraction engine boundary.
//!
//! The engine is the black box that knows how to talk to media sites. It has
//! two capabilities:
//!
//! - **catalogue**: list the raw streams available for a URL without fetching
//!   any payload
//! - **materialize**: fetch one output file for a URL given an opaque
//!   retrieval directive
//!
//! The production binding, [`YtDlpEngine`], shells out to `yt-dlp`.
//!
//! # Example
//!
//! ```ignore
//! use tubefetch_core::engine::{EngineConfig, ExtractionEngine, YtDlpEngine};
//!
//! let engine = YtDlpEngine::new(EngineConfig::default());
//! engine.validate().await?;
//!
//! let streams = engine.catalogue("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//! println!("{} streams", streams.len());
//! ```

mod config;
mod error;
mod traits;
mod types;
mod ytdlp;

pub use config::EngineConfig;
pub use error::EngineError;
pub use traits::ExtractionEngine;
pub use types::{MaterializeRequest, MaterializedOutput, StreamDescriptor};
pub use ytdlp::YtDlpEngine;
