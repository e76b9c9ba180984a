//! Data model for the sync service

pub mod card;
pub mod catalog_item;
pub mod extracted;
pub mod feed;

pub use card::{CardAttribute, SubmissionCard};
pub use catalog_item::{AttrValue, CatalogItem, Characteristic, ItemAttribute, ItemKind, SyncCandidate};
pub use extracted::{ExtractedProductData, FieldOverrides};
pub use feed::{FeedState, FeedStatus};
