#![doc = include_str!("../README.md")]

pub mod api;
pub mod cli;
pub mod error;
pub mod selectors;
pub mod sites;
pub mod store;
pub mod tools;
pub mod types;


pub use error::{Result, TaggerError};
pub use sites::SiteRegistry;
pub use store::{LinkStore, LocalFsStore};
pub use tools::tag::{classify_and_tag, make_tagged_url, tag_same_owner, update_tagged_urls};
pub use types::*;
