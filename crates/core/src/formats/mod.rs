//! Format resolution: from a noisy stream catalogue to user-facing quality
//! labels, and from a label back to a retrieval directive.

mod directive;
mod label;
mod resolver;
mod types;

pub use directive::RetrievalDirective;
pub use label::{label_height, nearest_label, quality_label, HIGH_FRAME_RATE, MAX_DISPLAY_HEIGHT};
pub use resolver::resolve_formats;
pub use types::{FormatEntry, ResolvedFormats};
