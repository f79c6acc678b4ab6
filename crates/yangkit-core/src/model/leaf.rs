use serde::{Deserialize, Serialize};

use super::yfilter::YFilter;

/// Value and bookkeeping for one leaf of an entity
///
/// Values are opaque strings; no type coercion happens anywhere in the kernel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafData {
    pub value: String,
    pub is_set: bool,
    /// Namespace of a prefixed value (identityref), empty otherwise
    pub namespace: String,
    pub namespace_prefix: String,
    pub yfilter: YFilter,
}

impl LeafData {
    /// An unset leaf
    pub fn new() -> Self {
        Self::default()
    }

    /// A leaf holding `value`
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_set: true,
            ..Self::default()
        }
    }

    /// Whether the codec must emit an element for this leaf
    pub fn to_be_created(&self) -> bool {
        self.is_set || self.yfilter.is_set()
    }

    /// Whether a prefixed `xmlns:<prefix>` declaration belongs on the leaf element
    pub fn has_prefixed_namespace(&self) -> bool {
        !self.namespace.is_empty() && !self.namespace_prefix.is_empty()
    }
}
