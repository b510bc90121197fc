pub mod clipboard;
pub mod collector;
pub mod document;
pub mod errors;
pub mod filter;
pub mod logger;
pub mod reporting;
pub mod source;
pub mod utils;

pub use collector::Collector;
pub use document::Document;
pub use errors::CollectError;
pub use filter::FileFilter;
pub use source::{dispatch, Source};
