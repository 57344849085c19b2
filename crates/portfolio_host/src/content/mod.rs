//! Portfolio content contracts: the data types, the source trait, and its adapters.

mod cached;
mod source;
mod types;

pub use cached::CachedContentSource;
pub use source::{ContentFuture, ContentSnapshot, ContentSource, MemoryContentSource};
pub use types::{Education, Experience, Profile, ProfileLink, Project};
