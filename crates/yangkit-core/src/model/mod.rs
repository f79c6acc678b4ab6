//! Entity tree model
//!
//! Schema-typed configuration/state trees held in a slot arena. Schemas
//! describe the closed set of leaves and children each entity type declares.

mod entity;
mod leaf;
mod schema;
mod tree;
mod yfilter;

pub use entity::{Entity, EntityId, EntityPath};
pub use leaf::LeafData;
pub use schema::{AugmentCapabilities, ChildSchema, EntitySchema, EntitySchemaBuilder};
pub use tree::{EntityRef, EntityTree};
pub use yfilter::YFilter;
