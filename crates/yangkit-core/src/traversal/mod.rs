//! Entity search and extraction
//!
//! Resolves which subtree of a full tree a sparse filter entity denotes and
//! hands it back as an independently owned tree.

mod lookup;

pub use lookup::{
    entity_list_to_string, find_child_entity, get_child_entity_from_top,
    get_top_entity_from_filter,
};
