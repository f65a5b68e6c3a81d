//! Table mapping metadata.
//!
//! Types declare their mapping through [`EntityDescriptor`] (usually generated by
//! `#[derive(Entity)]`); [`discover`] validates it once per type and caches the
//! resulting [`TypeMetadata`] for the life of the process.

mod attrs;
mod metadata;

pub use attrs::{
    ColumnAttr, EntityDescriptor, EnumBehavior, InsertUpdateBehavior, KeyBehavior,
    MemberDescriptor, TableAttr,
};
pub use metadata::{ColumnDescriptor, TypeMetadata, discover, discover_type};
