pub mod click;
pub mod tagging;

pub use click::ClickDescriptor;
pub use tagging::{TaggingOutcome, TaggingPipeline, TaggingPolicy};
