//! Publish Projector
//!
//! Pure, culture-filtered view of a draft block value. See `projector`.

mod cultures;
mod projector;

pub use cultures::{PublishCultures, INVARIANT_CULTURE};
pub use projector::{project, Projector};
