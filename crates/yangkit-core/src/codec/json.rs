//! JSON subtree codec
//!
//! Same contract as the XML codec over RFC 7951 shaped documents: a single
//! `"module:name"` root member, list children as arrays, leaves as strings.
//! Filter operations travel as `"@"` / `"@<leaf>"` annotation objects; a leaf
//! that only carries an operation is `null`.
//!
//! Member names carry their module, so decoding never consults the
//! capability table.

use std::time::Instant;

use serde_json::{Map, Value};
use tracing::{debug, error};

use super::{is_emitted, CodecContext, SubtreeCodec};
use crate::errors::{Result, YangkitError};
use crate::logging_facility::macros::elapsed_ms;
use crate::model::{EntityId, EntityRef, EntityTree, YFilter};
use crate::{log_op_end, log_op_error, log_op_start};

const ANNOTATION_PREFIX: char = '@';
const OPERATION_MEMBER: &str = "operation";
const RPC_INPUT: &str = "input";

/// Entity tree ⇄ JSON subtree document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonSubtreeCodec {
    pretty: bool,
}

impl JsonSubtreeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn encode_impl(&self, entity: EntityRef<'_>) -> Result<String> {
        let tree = entity.tree();
        let schema = tree.entity(entity.id())?.schema();

        let mut document = Map::new();
        document.insert(schema.qualified_name(), encode_entity(tree, entity.id())?);
        let document = Value::Object(document);

        let text = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(text)
    }

    fn decode_impl(&self, payload: &str, mut template: EntityTree) -> Result<EntityTree> {
        let document: Value =
            serde_json::from_str(payload).map_err(|e| YangkitError::InvalidPayload {
                message: e.to_string(),
            })?;

        let (member, body) = document
            .as_object()
            .and_then(|o| o.iter().next())
            .ok_or_else(|| YangkitError::InvalidPayload {
                message: "expected an object with a single root member".to_string(),
            })?;

        let root = template.root();
        let expected = template.yang_name(root).to_string();
        if local_name(member) != expected {
            let err = YangkitError::ProtocolMismatch {
                expected,
                found: member.clone(),
            };
            error!("{}", err);
            return Err(err);
        }
        let body = as_object(member, body)?;

        let wraps_input = template.entity(root)?.schema().child(RPC_INPUT).is_some();
        for (name, value) in body.iter().filter(|(n, _)| !is_annotation(n)) {
            let target = if wraps_input && name != RPC_INPUT {
                template.add_child(root, RPC_INPUT)?
            } else {
                root
            };
            decode_member(&mut template, target, name, value)?;
        }
        decode_annotations(&mut template, root, body)?;
        Ok(template)
    }
}

impl SubtreeCodec for JsonSubtreeCodec {
    fn encode(&self, entity: EntityRef<'_>) -> Result<String> {
        log_op_start!("json_encode", yang_name = entity.yang_name());
        let start = Instant::now();

        let result = self.encode_impl(entity).map_err(|e| {
            log_op_error!("json_encode", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!("json_encode", duration_ms = elapsed_ms(start));
        Ok(result)
    }

    fn decode(
        &self,
        payload: &str,
        template: EntityTree,
        _ctx: &CodecContext,
    ) -> Result<EntityTree> {
        let root = template.root();
        log_op_start!("json_decode", yang_name = template.yang_name(root));
        let start = Instant::now();

        let result = self.decode_impl(payload, template).map_err(|e| {
            log_op_error!("json_decode", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!("json_decode", duration_ms = elapsed_ms(start));
        Ok(result)
    }
}

fn encode_entity(tree: &EntityTree, id: EntityId) -> Result<Value> {
    let entity = tree.entity(id)?;
    let mut object = Map::new();

    if entity.yfilter().requires_attribute() {
        object.insert(
            ANNOTATION_PREFIX.to_string(),
            operation_annotation(entity.yfilter()),
        );
    }
    for (name, leaf) in tree.entity_path(id)?.value_paths {
        if leaf.yfilter.requires_attribute() {
            object.insert(
                format!("{}{}", ANNOTATION_PREFIX, name),
                operation_annotation(leaf.yfilter),
            );
        }
        let value = if leaf.is_set {
            Value::String(leaf.value)
        } else {
            Value::Null
        };
        object.insert(name, value);
    }

    for child in entity.children().values().copied() {
        if !is_emitted(tree, child) {
            continue;
        }
        let child_entity = tree.entity(child)?;
        let member = child_entity.declared_name().to_string();
        let encoded = encode_entity(tree, child)?;
        if child_entity.is_list_member() {
            match object
                .entry(member)
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(entries) => entries.push(encoded),
                _ => {
                    return Err(YangkitError::Internal {
                        message: format!(
                            "list '{}' collides with a leaf",
                            child_entity.yang_name()
                        ),
                    })
                }
            }
        } else {
            object.insert(member, encoded);
        }
    }
    debug!(
        "Encoded '{}' with {} members",
        tree.absolute_path(id),
        object.len()
    );
    Ok(Value::Object(object))
}

fn is_annotation(member: &str) -> bool {
    member.starts_with(ANNOTATION_PREFIX)
}

fn operation_annotation(yfilter: YFilter) -> Value {
    let mut annotation = Map::new();
    let operation = Value::String(yfilter.as_str().to_string());
    annotation.insert(OPERATION_MEMBER.to_string(), operation);
    Value::Object(annotation)
}

fn decode_object(tree: &mut EntityTree, id: EntityId, object: &Map<String, Value>) -> Result<()> {
    for (name, value) in object.iter().filter(|(n, _)| !is_annotation(n)) {
        decode_member(tree, id, name, value)?;
    }
    decode_annotations(tree, id, object)
}

fn decode_member(tree: &mut EntityTree, id: EntityId, name: &str, value: &Value) -> Result<()> {
    let child_name = if tree.entity(id)?.schema().child(name).is_some() {
        Some(name)
    } else if tree.entity(id)?.schema().child(local_name(name)).is_some() {
        Some(local_name(name))
    } else {
        None
    };

    if let Some(child_name) = child_name {
        debug!(
            "Creating child entity '{}' in '{}'",
            child_name,
            tree.yang_name(id)
        );
        match value {
            Value::Array(entries) => {
                for entry in entries {
                    decode_child(tree, id, child_name, entry)?;
                }
                Ok(())
            }
            other => decode_child(tree, id, child_name, other),
        }
    } else if tree.entity(id)?.schema().declares_leaf(local_name(name)) {
        decode_leaf(tree, id, local_name(name), value)
    } else {
        let err = YangkitError::UnexpectedElement {
            element: name.to_string(),
            container: tree.yang_name(id).to_string(),
        };
        error!("{}", err);
        Err(err)
    }
}

fn decode_child(tree: &mut EntityTree, id: EntityId, name: &str, value: &Value) -> Result<()> {
    let child = tree.add_child(id, name)?;
    match value {
        Value::Object(object) => decode_object(tree, child, object)?,
        Value::Null => {}
        _ => {
            return Err(YangkitError::InvalidPayload {
                message: format!("'{}' must be an object", name),
            })
        }
    }
    if tree.entity(child)?.is_list_member() {
        tree.review(child)?;
    }
    Ok(())
}

fn decode_leaf(tree: &mut EntityTree, id: EntityId, leaf: &str, value: &Value) -> Result<()> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => {
            debug!("Creating leaf '{}' with no value", leaf);
            return tree.set_filter(id, leaf, YFilter::Read);
        }
        Value::Array(items) if items.len() == 1 && items[0].is_null() => {
            debug!("Creating leaf '{}' with no value", leaf);
            return tree.set_filter(id, leaf, YFilter::Read);
        }
        _ => {
            return Err(YangkitError::InvalidPayload {
                message: format!("leaf '{}' must be a scalar", leaf),
            })
        }
    };
    debug!("Creating leaf '{}' with value '{}'", leaf, text);
    tree.set_value(id, leaf, text)
}

/// Apply `"@"` and `"@<leaf>"` operation annotations of one object
fn decode_annotations(
    tree: &mut EntityTree,
    id: EntityId,
    object: &Map<String, Value>,
) -> Result<()> {
    for (name, value) in object.iter().filter(|(n, _)| is_annotation(n)) {
        let Some(operation) = value.get(OPERATION_MEMBER).and_then(Value::as_str) else {
            continue;
        };
        let operation: YFilter = operation.parse()?;
        let target = &name[ANNOTATION_PREFIX.len_utf8()..];
        if target.is_empty() {
            tree.set_entity_filter(id, operation)?;
        } else {
            tree.set_filter(id, local_name(target), operation)?;
        }
    }
    Ok(())
}

fn as_object<'v>(name: &str, value: &'v Value) -> Result<&'v Map<String, Value>> {
    value.as_object().ok_or_else(|| YangkitError::InvalidPayload {
        message: format!("'{}' must be an object", name),
    })
}

fn local_name(member: &str) -> &str {
    member.rsplit(':').next().unwrap_or(member)
}
