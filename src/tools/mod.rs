// Pure link classification
pub mod tag;
pub mod urls;

// Page handling
pub mod batch;
pub mod fetch;
pub mod links;
