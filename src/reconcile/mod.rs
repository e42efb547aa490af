//! Reconciler
//!
//! Keeps the layout, the two record stores and the exposure set mutually
//! consistent under block insertion and removal, and under variation
//! changes of the owning property or of element types.

mod collapse;
mod reconciler;
mod report;

pub use collapse::choose_survivor;
pub use reconciler::{NewBlock, Reconciler};
pub use report::{ReconcileReport, ReconcileWarning};
