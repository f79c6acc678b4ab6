//! XML subtree codec
//!
//! Encoding walks the entity tree and writes events with `quick-xml`; decoding
//! parses the payload into a namespace-aware `roxmltree` document and replays
//! it onto a template tree.

use std::sync::Arc;
use std::time::Instant;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use roxmltree::{Document, Node};
use tracing::{debug, error};

use super::{decode_capabilities, is_emitted, CapabilityTable, CodecContext, SubtreeCodec};
use crate::errors::{Result, YangkitError};
use crate::logging_facility::macros::elapsed_ms;
use crate::model::{EntityId, EntityRef, EntitySchema, EntityTree, LeafData, YFilter};
use crate::{log_op_end, log_op_error, log_op_start};

const OPERATION_ATTRIBUTE: &str = "operation";
const RPC_INPUT: &str = "input";
const XML_PREFIX: &str = "xml";

/// Entity tree ⇄ XML subtree document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XmlSubtreeCodec {
    pretty: bool,
}

impl XmlSubtreeCodec {
    /// Compact output, no whitespace between elements
    pub fn new() -> Self {
        Self::default()
    }

    /// Output indented by two spaces per level
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    fn encode_impl(&self, entity: EntityRef<'_>) -> Result<String> {
        let writer = if self.pretty {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        let mut encoder = XmlEncoder {
            tree: entity.tree(),
            writer,
        };
        encoder.encode_entity(entity.id(), true)?;
        String::from_utf8(encoder.writer.into_inner()).map_err(|e| YangkitError::Serialization {
            message: e.to_string(),
        })
    }

    fn decode_impl(
        &self,
        payload: &str,
        mut template: EntityTree,
        ctx: &CodecContext,
    ) -> Result<EntityTree> {
        let capabilities = decode_capabilities(&template, ctx);
        let document = Document::parse(payload)?;
        let root_element = document.root_element();

        let root = template.root();
        let expected = template.yang_name(root).to_string();
        let found = root_element.tag_name().name();
        if found != expected {
            let err = YangkitError::ProtocolMismatch {
                expected,
                found: found.to_string(),
            };
            error!("{}", err);
            return Err(err);
        }

        let decoder = XmlDecoder {
            capabilities: &*capabilities,
            root_schema: template.entity(root)?.schema().clone(),
        };
        decoder.apply_operation(&mut template, root, root_element)?;

        let wraps_input = decoder.root_schema.child(RPC_INPUT).is_some();
        for element in root_element.children().filter(Node::is_element) {
            let target = if wraps_input && element.tag_name().name() != RPC_INPUT {
                template.add_child(root, RPC_INPUT)?
            } else {
                root
            };
            decoder.decode_element(&mut template, target, element)?;
        }
        Ok(template)
    }
}

impl SubtreeCodec for XmlSubtreeCodec {
    fn encode(&self, entity: EntityRef<'_>) -> Result<String> {
        log_op_start!("xml_encode", yang_name = entity.yang_name());
        let start = Instant::now();

        let result = self.encode_impl(entity).map_err(|e| {
            log_op_error!("xml_encode", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!("xml_encode", duration_ms = elapsed_ms(start));
        Ok(result)
    }

    fn decode(
        &self,
        payload: &str,
        template: EntityTree,
        ctx: &CodecContext,
    ) -> Result<EntityTree> {
        let root = template.root();
        log_op_start!("xml_decode", yang_name = template.yang_name(root));
        let start = Instant::now();

        let result = self.decode_impl(payload, template, ctx).map_err(|e| {
            log_op_error!("xml_decode", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!("xml_decode", duration_ms = elapsed_ms(start));
        Ok(result)
    }
}

struct XmlEncoder<'t> {
    tree: &'t EntityTree,
    writer: Writer<Vec<u8>>,
}

impl XmlEncoder<'_> {
    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| YangkitError::Serialization {
                message: e.to_string(),
            })
    }

    fn encode_entity(&mut self, id: EntityId, declare_namespace: bool) -> Result<()> {
        let tree = self.tree;
        let entity = tree.entity(id)?;
        let name = entity.yang_name();

        let mut start = BytesStart::new(name);
        if declare_namespace && !entity.namespace().is_empty() {
            start.push_attribute(("xmlns", entity.namespace()));
        }
        if entity.yfilter().requires_attribute() {
            start.push_attribute((OPERATION_ATTRIBUTE, entity.yfilter().as_str()));
        }

        let path = tree.entity_path(id)?;
        let children: Vec<EntityId> = entity
            .children()
            .values()
            .copied()
            .filter(|c| is_emitted(tree, *c))
            .collect();
        debug!(
            "Encoding '{}': {} leaves, {} children",
            path.path,
            path.value_paths.len(),
            children.len()
        );

        if path.value_paths.is_empty() && children.is_empty() {
            return self.write(Event::Empty(start));
        }

        self.write(Event::Start(start))?;
        for (leaf_name, leaf) in &path.value_paths {
            self.encode_leaf(leaf_name, leaf)?;
        }
        for child in children {
            let child_entity = tree.entity(child)?;
            let crosses_namespace = !child_entity.namespace().is_empty()
                && child_entity.namespace() != entity.namespace();
            let declare_namespace = child_entity.is_top_level_class() || crosses_namespace;
            self.encode_entity(child, declare_namespace)?;
        }
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn encode_leaf(&mut self, name: &str, leaf: &LeafData) -> Result<()> {
        let mut start = BytesStart::new(name);
        if leaf.yfilter.requires_attribute() {
            start.push_attribute((OPERATION_ATTRIBUTE, leaf.yfilter.as_str()));
        }
        if leaf.has_prefixed_namespace() {
            let attribute = format!("xmlns:{}", leaf.namespace_prefix);
            start.push_attribute((attribute.as_str(), leaf.namespace.as_str()));
        }

        if leaf.is_set && !leaf.value.is_empty() {
            self.write(Event::Start(start))?;
            self.write(Event::Text(BytesText::new(&leaf.value)))?;
            self.write(Event::End(BytesEnd::new(name)))
        } else {
            self.write(Event::Empty(start))
        }
    }
}

struct XmlDecoder<'c> {
    capabilities: &'c CapabilityTable,
    root_schema: Arc<EntitySchema>,
}

impl XmlDecoder<'_> {
    fn decode_element(
        &self,
        tree: &mut EntityTree,
        id: EntityId,
        element: Node<'_, '_>,
    ) -> Result<()> {
        let local = element.tag_name().name();
        let name = self.qualified_name(element);

        if let Some(child) = tree.child_by_name(id, &name)? {
            debug!(
                "Creating child entity '{}' in '{}'",
                name,
                tree.yang_name(id)
            );
            self.apply_operation(tree, child, element)?;
            for nested in element.children().filter(Node::is_element) {
                self.decode_element(tree, child, nested)?;
            }
            if tree.entity(child)?.is_list_member() {
                tree.review(child)?;
            }
            return Ok(());
        }

        if tree.entity(id)?.schema().declares_leaf(local) {
            return self.decode_leaf(tree, id, local, element);
        }

        let err = YangkitError::UnexpectedElement {
            element: name,
            container: tree.yang_name(id).to_string(),
        };
        error!("{}", err);
        Err(err)
    }

    fn decode_leaf(
        &self,
        tree: &mut EntityTree,
        id: EntityId,
        leaf: &str,
        element: Node<'_, '_>,
    ) -> Result<()> {
        let operation = operation_attribute(element)?;
        if element.first_child().is_none() {
            debug!("Creating leaf '{}' with no value", leaf);
            return tree.set_filter(id, leaf, operation.unwrap_or(YFilter::Read));
        }

        if let Some(text) = element.text().filter(|t| !t.trim().is_empty()) {
            let (value, namespace, prefix) = self.resolve_leaf_value(element, text);
            debug!("Creating leaf '{}' with value '{}'", leaf, value);
            tree.set_value_with_namespace(id, leaf, value, &namespace, &prefix)?;
        }
        if let Some(operation) = operation {
            tree.set_filter(id, leaf, operation)?;
        }
        Ok(())
    }

    /// `module:local` when the element's namespace differs from its parent's
    fn qualified_name(&self, element: Node<'_, '_>) -> String {
        let local = element.tag_name().name();
        let namespace = element.tag_name().namespace().unwrap_or_default();
        let parent_namespace = element
            .parent_element()
            .and_then(|p| p.tag_name().namespace())
            .unwrap_or_default();

        if !namespace.is_empty() && !parent_namespace.is_empty() && namespace != parent_namespace {
            let module = self.capabilities.module_for_namespace(namespace);
            format!("{}:{}", module, local)
        } else {
            local.to_string()
        }
    }

    /// Value, namespace and prefix to store on a leaf
    ///
    /// The governing namespace is the nearest declaration in scope. When it
    /// is prefixed, a value carrying that prefix is stripped to its bare name
    /// and then re-qualified with the owning module if the root's identity
    /// table knows it.
    fn resolve_leaf_value(&self, element: Node<'_, '_>, text: &str) -> (String, String, String) {
        let Some((namespace, prefix)) = nearest_namespace_declaration(element) else {
            return (text.to_string(), String::new(), String::new());
        };
        if namespace.is_empty() || prefix.is_empty() {
            return (text.to_string(), namespace, prefix);
        }

        let bare = text
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(text);
        let value = match self.root_schema.identity_module(bare, &namespace) {
            Some(module) => format!("{}:{}", module, bare),
            None => bare.to_string(),
        };
        (value, namespace, prefix)
    }

    fn apply_operation(
        &self,
        tree: &mut EntityTree,
        id: EntityId,
        element: Node<'_, '_>,
    ) -> Result<()> {
        if let Some(operation) = operation_attribute(element)? {
            tree.set_entity_filter(id, operation)?;
        }
        Ok(())
    }
}

fn operation_attribute(element: Node<'_, '_>) -> Result<Option<YFilter>> {
    element
        .attributes()
        .find(|a| a.name() == OPERATION_ATTRIBUTE)
        .map(|a| a.value().parse::<YFilter>())
        .transpose()
}

/// `(uri, prefix)` of the first namespace declared on `element` or, failing
/// that, on its nearest declaring ancestor
fn nearest_namespace_declaration(element: Node<'_, '_>) -> Option<(String, String)> {
    element.ancestors().filter(Node::is_element).find_map(|node| {
        let parent = node.parent_element();
        node.namespaces()
            .filter(|ns| ns.name() != Some(XML_PREFIX))
            .find(|ns| {
                parent.map_or(true, |p| {
                    !p.namespaces().any(|inherited| {
                        inherited.name() == ns.name() && inherited.uri() == ns.uri()
                    })
                })
            })
            .map(|ns| {
                let prefix = ns.name().unwrap_or_default();
                (ns.uri().to_string(), prefix.to_string())
            })
    })
}
