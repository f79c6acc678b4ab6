use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::YangkitError;

/// Edit/select verb attached to an entity or leaf
///
/// `NotSet` is the absence of any verb. `Read` marks a node as selected
/// without content and is never written as an `operation` attribute; every
/// other verb is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YFilter {
    #[default]
    NotSet,
    Read,
    Create,
    Delete,
    Merge,
    Replace,
    Remove,
}

impl YFilter {
    /// True for every variant except `NotSet`
    pub fn is_set(&self) -> bool {
        *self != YFilter::NotSet
    }

    /// True when the verb must be serialized as an `operation` attribute
    pub fn requires_attribute(&self) -> bool {
        !matches!(self, YFilter::NotSet | YFilter::Read)
    }

    /// Wire name used in the `operation` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            YFilter::NotSet => "not_set",
            YFilter::Read => "read",
            YFilter::Create => "create",
            YFilter::Delete => "delete",
            YFilter::Merge => "merge",
            YFilter::Replace => "replace",
            YFilter::Remove => "remove",
        }
    }
}

impl fmt::Display for YFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for YFilter {
    type Err = YangkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(YFilter::Read),
            "create" => Ok(YFilter::Create),
            "delete" => Ok(YFilter::Delete),
            "merge" => Ok(YFilter::Merge),
            "replace" => Ok(YFilter::Replace),
            "remove" => Ok(YFilter::Remove),
            other => Err(YangkitError::InvalidPayload {
                message: format!("Unknown operation '{}'", other),
            }),
        }
    }
}
