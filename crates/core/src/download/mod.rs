//! Download orchestration: session + quality label -> materialized file.

mod locate;
mod orchestrator;

pub use locate::locate_output;
pub use orchestrator::{plan_directive, DirectivePlan, DownloadOrchestrator, DownloadedFile};
