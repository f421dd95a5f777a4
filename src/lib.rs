//! # seedprint – pagination and layout-flow engine for business documents
//!
//! This crate turns variable-length order and label records into fixed-size
//! physical output: multi-page letter documents, 30-up label sheets and
//! continuous label rolls. The stages are:
//!
//! 1. **Validate** – raw request records → typed content plus a manifest of
//!    skipped items and substituted values ([`model`], [`label`])
//! 2. **Place** – continuous documents flow through the capacity-driven
//!    [`pagination`] engine; sheet labels go through the [`grid`] engine
//! 3. **Compose** – per document type drawing ([`slips`], [`label_print`])
//! 4. **Render** – drawing calls land on a [`surface::RenderSurface`]: PDF
//!    bytes via printpdf ([`render`]) or a recorded command stream
//!
//! [`pipeline`] ties the stages together for one print job.

pub mod capacity;
pub mod error;
pub mod fonts;
pub mod grid;
pub mod label;
pub mod label_print;
pub mod layout_config;
pub mod model;
pub mod pagination;
pub mod pipeline;
pub mod render;
pub mod samples;
pub mod slips;
pub mod surface;
pub mod variant;

// Re-exports for convenience
pub use capacity::{pages_required, slots_required, CapacityTable};
pub use error::{ItemIssue, Manifest, PrintError, SurfaceError};
pub use layout_config::EngineConfig;
pub use pagination::{FlowEngine, FlowObserver};
pub use pipeline::{print_job, render_copies, PrintContext, PrintJob, PrintOutcome};
pub use surface::{RecordingSurface, RenderSurface};
