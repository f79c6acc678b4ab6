//! Yangkit Core - schema-typed entity trees and subtree codecs
//!
//! This crate provides the in-memory kernel used to exchange configuration and
//! state with model-driven management devices, including:
//! - Entity trees held in a slot arena, with per-type schema tables
//! - Filter search and subtree extraction (detach into a new tree)
//! - XML and JSON subtree codecs with namespace/module qualification
//! - Capability tables for cross-namespace decoding
//!
//! No I/O happens here; sessions and RPC execution live in `yangkit-engine`.

pub mod codec;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod traversal;

// Re-export commonly used types
pub use codec::{
    codec_for, CapabilityTable, CodecContext, EncodingFormat, JsonSubtreeCodec, ModuleCapability,
    SubtreeCodec, XmlSubtreeCodec,
};
pub use errors::{ExError, ExErrorKind, Result, YangkitError};
pub use model::{
    AugmentCapabilities, EntityId, EntityRef, EntitySchema, EntityTree, LeafData, YFilter,
};
