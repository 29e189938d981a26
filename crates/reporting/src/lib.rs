//! Engagement reporting — executive brief, terminal dashboard, and
//! Markdown/PDF/slide-deck exports of the brief.

pub mod brief;
pub mod dashboard;
pub mod export;

pub use brief::{compose_brief, BriefDocument};
pub use dashboard::{render_dashboard, DashboardView};
pub use export::{export_brief, ExportFormat, ExportedDocument};
