pub mod analyzer;
pub mod reduce;
pub mod report;
pub mod timeline;
pub mod types;
