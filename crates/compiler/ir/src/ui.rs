//! # UI Spec
//!
//! Components with their bindings and inputs, and pages with their render trees.
//! Custom component code is carried through verbatim.

use index_vec::IndexVec;
use serde::Serialize;
use weft_compiler_semantic::{ComponentId, FieldRef, PageId, Permission, QueryId};
use weft_compiler_syntax::{BindingSlot, CodeBlock, ComponentVariant, Import, InputKind, Literal};

use crate::data_model::field_handle;
use crate::{indent_str, serialize_arena, PrettyPrint};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiSpec {
    pub title: String,
    pub dependencies: Vec<DependencySpec>,
    #[serde(serialize_with = "serialize_arena")]
    pub components: IndexVec<ComponentId, ComponentSpec>,
    #[serde(serialize_with = "serialize_arena")]
    pub pages: IndexVec<PageId, PageSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencySpec {
    pub package: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSpec {
    pub name: String,
    pub variant: ComponentVariant,
    /// Permissions of the bound query, for the client to display or redirect on.
    pub permissions: Vec<Permission>,
    pub body: ComponentBodySpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ComponentBodySpec {
    Bound {
        slot: BindingSlot,
        query: QueryId,
        inputs: Vec<InputSpec>,
    },
    Custom {
        imports: Vec<Import>,
        dependencies: Vec<DependencySpec>,
        code: Vec<CodeBlock>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSpec {
    pub field: FieldRef,
    pub kind: InputKind,
    pub default: Option<DefaultSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DefaultSpec {
    Literal { value: Literal },
    #[serde(rename_all = "camelCase")]
    LoggedInUser { connect: FieldRef, user_field: FieldRef },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    pub name: String,
    pub route: String,
    /// Tags declared on the page itself.
    pub permissions: Vec<Permission>,
    /// Own tags plus those surfaced by referenced components.
    pub effective_permissions: Vec<Permission>,
    pub render: Vec<NodeSpec>,
    /// Referenced components in order of first appearance.
    pub components: Vec<ComponentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeSpec {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<NodeSpec>,
    },
    Text { text: String },
    Component {
        component: ComponentId,
        props: Vec<(String, String)>,
    },
    ForEach {
        item: String,
        source: String,
        body: Vec<NodeSpec>,
    },
    If {
        condition: String,
        then_branch: Vec<NodeSpec>,
        else_branch: Vec<NodeSpec>,
    },
}

impl NodeSpec {
    /// Component handles referenced anywhere below this node, depth first.
    pub fn component_refs(&self, out: &mut Vec<ComponentId>) {
        match self {
            Self::Element { children, .. } | Self::ForEach { body: children, .. } => {
                children.iter().for_each(|child| child.component_refs(out));
            }
            Self::Text { .. } => {}
            Self::Component { component, .. } => out.push(*component),
            Self::If {
                then_branch,
                else_branch,
                ..
            } => {
                then_branch
                    .iter()
                    .chain(else_branch)
                    .for_each(|child| child.component_refs(out));
            }
        }
    }
}

impl UiSpec {
    pub fn component_named(&self, name: &str) -> Option<ComponentId> {
        self.components
            .iter_enumerated()
            .find_map(|(id, component)| (component.name == name).then_some(id))
    }

    pub fn page_named(&self, name: &str) -> Option<&PageSpec> {
        self.pages.iter().find(|page| page.name == name)
    }
}

fn tag_list(permissions: &[Permission]) -> String {
    if permissions.is_empty() {
        return String::new();
    }
    let tags: Vec<_> = permissions.iter().map(|tag| format!("{tag:?}")).collect();
    format!(" [{}]", tags.join(", "))
}

impl PrettyPrint for UiSpec {
    fn pretty_print(&self, indent: usize) -> String {
        let mut result = String::new();
        let base_indent = indent_str(indent);

        result.push_str(&format!("{base_indent}ui {:?} {{\n", self.title));
        for dependency in &self.dependencies {
            result.push_str(&format!(
                "{base_indent}  dependency {}@{}\n",
                dependency.package, dependency.version
            ));
        }
        for (component_id, component) in self.components.iter_enumerated() {
            result.push_str(&format!(
                "{base_indent}  c{} {} {}{}",
                component_id.index(),
                component.variant,
                component.name,
                tag_list(&component.permissions)
            ));
            result.push_str(&component.body.pretty_print(indent + 2));
        }
        for (page_id, page) in self.pages.iter_enumerated() {
            result.push_str(&format!(
                "{base_indent}  p{} page {} {}{}\n",
                page_id.index(),
                page.name,
                page.route,
                tag_list(&page.effective_permissions)
            ));
            for node in &page.render {
                result.push_str(&node.pretty_print(indent + 2));
            }
        }
        result.push_str(&format!("{base_indent}}}\n"));
        result
    }
}

impl PrettyPrint for ComponentBodySpec {
    fn pretty_print(&self, indent: usize) -> String {
        let detail_indent = indent_str(indent);
        match self {
            Self::Bound {
                slot,
                query,
                inputs,
            } => {
                let mut result = format!(" {slot} q{}\n", query.index());
                for input in inputs {
                    result.push_str(&format!(
                        "{detail_indent}input {} {}",
                        field_handle(input.field),
                        input.kind
                    ));
                    match &input.default {
                        Some(DefaultSpec::Literal { value }) => {
                            result.push_str(&format!(" = {value}"));
                        }
                        Some(DefaultSpec::LoggedInUser {
                            connect,
                            user_field,
                        }) => {
                            result.push_str(&format!(
                                " = connect {} with user {}",
                                field_handle(*connect),
                                field_handle(*user_field)
                            ));
                        }
                        None => {}
                    }
                    result.push('\n');
                }
                result
            }
            Self::Custom {
                imports,
                dependencies,
                code,
            } => {
                let mut result = " custom\n".to_string();
                for import in imports {
                    result.push_str(&format!(
                        "{detail_indent}import {} from {:?}\n",
                        import.what, import.from
                    ));
                }
                for dependency in dependencies {
                    result.push_str(&format!(
                        "{detail_indent}dependency {}@{}\n",
                        dependency.package, dependency.version
                    ));
                }
                for block in code {
                    result.push_str(&format!(
                        "{detail_indent}code {} ({} bytes)\n",
                        block.language,
                        block.source.len()
                    ));
                }
                result
            }
        }
    }
}

impl PrettyPrint for NodeSpec {
    fn pretty_print(&self, indent: usize) -> String {
        let base_indent = indent_str(indent);
        let children = |nodes: &[NodeSpec]| -> String {
            nodes
                .iter()
                .map(|node| node.pretty_print(indent + 1))
                .collect()
        };
        match self {
            Self::Element { tag, children: nodes, .. } => {
                format!("{base_indent}<{tag}>\n{}", children(nodes))
            }
            Self::Text { text } => format!("{base_indent}{text:?}\n"),
            Self::Component { component, .. } => format!("{base_indent}use c{}\n", component.index()),
            Self::ForEach { item, source, body } => {
                format!("{base_indent}for {item} in {source}\n{}", children(body))
            }
            Self::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut result = format!("{base_indent}if {condition}\n{}", children(then_branch));
                if !else_branch.is_empty() {
                    result.push_str(&format!("{base_indent}else\n{}", children(else_branch)));
                }
                result
            }
        }
    }
}
