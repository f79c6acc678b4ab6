//! Subtree codecs
//!
//! Convert entity trees to and from wire documents. Both codecs share one
//! contract: `encode` serializes the subtree rooted at an entity, `decode`
//! populates a template tree from a payload whose root names the template.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::model::{EntityId, EntityRef, EntityTree};

mod capabilities;
mod json;
mod xml;

pub use capabilities::{CapabilityTable, CodecContext, ModuleCapability};
pub use json::JsonSubtreeCodec;
pub use xml::XmlSubtreeCodec;

/// Wire encoding negotiated by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingFormat {
    Xml,
    Json,
}

impl fmt::Display for EncodingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingFormat::Xml => f.write_str("xml"),
            EncodingFormat::Json => f.write_str("json"),
        }
    }
}

/// Entity tree to wire document conversion
pub trait SubtreeCodec {
    /// Serialize the subtree rooted at `entity`
    ///
    /// # Errors
    ///
    /// `Serialization` if the writer fails.
    fn encode(&self, entity: EntityRef<'_>) -> Result<String>;

    /// Populate `template` from `payload`
    ///
    /// # Errors
    ///
    /// `InvalidPayload` for malformed documents, `ProtocolMismatch` when the
    /// payload root does not name the template, `UnexpectedElement` for
    /// undeclared names.
    fn decode(&self, payload: &str, template: EntityTree, ctx: &CodecContext) -> Result<EntityTree>;
}

/// Compact codec for `format`
pub fn codec_for(format: EncodingFormat) -> Box<dyn SubtreeCodec> {
    match format {
        EncodingFormat::Xml => Box::new(XmlSubtreeCodec::new()),
        EncodingFormat::Json => Box::new(JsonSubtreeCodec::new()),
    }
}

/// Capability table for one decode: the context's own, or a private copy
/// extended by the template's augment hook
fn decode_capabilities<'a>(
    template: &EntityTree,
    ctx: &'a CodecContext,
) -> Cow<'a, CapabilityTable> {
    match template
        .root_schema()
        .and_then(|s| s.augment_capabilities())
    {
        Some(hook) => {
            let mut table = ctx.capabilities().clone();
            hook.apply(&mut table);
            Cow::Owned(table)
        }
        None => Cow::Borrowed(ctx.capabilities()),
    }
}

/// Whether a child element is written: it carries an operation, holds data
/// or is a presence container
fn is_emitted(tree: &EntityTree, id: EntityId) -> bool {
    tree.has_operation(id) || tree.has_data(id) || tree.is_presence_container(id)
}
