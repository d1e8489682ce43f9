//! # Page Resolver
//!
//! Pages are resolved one by one (render tree, route shape, permission tags); route
//! uniqueness needs every page and runs as a separate pass in declaration order.

use rustc_hash::FxHashMap;
use weft_compiler_diagnostics::Diagnostic;
use weft_compiler_syntax::{PageDecl, RenderNode, Span, Spanned};

use super::shared::{check_permission_tags, surfaced_permissions};
use super::ResolveContext;
use crate::ids::ComponentId;
use crate::registry::DeclarationRegistry;
use crate::resolved::{ResolvedNode, ResolvedPage};

pub fn resolve_page(
    ctx: ResolveContext<'_, '_>,
    decl: &Spanned<PageDecl>,
) -> (Option<ResolvedPage>, Vec<Diagnostic>) {
    let page = decl.value();
    let name = page.name.value();
    let referrer = format!("page '{name}'");
    let _span = tracing::trace_span!("resolve_page", page = %name).entered();
    let mut diagnostics = Vec::new();

    let route = page.route.value();
    if !route.starts_with('/') {
        diagnostics.push(Diagnostic::shape(
            format!("{referrer} has route '{route}', which does not start with '/'"),
            page.route.span(),
        ));
    }

    let permissions =
        check_permission_tags(&page.permissions, &referrer, ctx.auth, false, &mut diagnostics);

    let mut walker = RenderWalker {
        registry: ctx.registry,
        referrer: &referrer,
        components: Vec::new(),
        diagnostics: &mut diagnostics,
    };
    let render = walker.resolve_nodes(&page.render);
    let components = walker.components;

    if diagnostics.iter().any(Diagnostic::is_error) {
        return (None, diagnostics);
    }

    let effective_permissions = components
        .iter()
        .fold(permissions, |set, &component| {
            set | surfaced_permissions(ctx.registry, component)
        });
    let resolved = ResolvedPage {
        name: name.clone(),
        route: route.clone(),
        permissions,
        effective_permissions,
        render,
        components,
        span: page.name.span(),
    };
    (Some(resolved), diagnostics)
}

struct RenderWalker<'c, 'a, 'ast> {
    registry: &'a DeclarationRegistry<'ast>,
    referrer: &'c str,
    /// Referenced components in order of first appearance.
    components: Vec<ComponentId>,
    diagnostics: &'c mut Vec<Diagnostic>,
}

impl RenderWalker<'_, '_, '_> {
    fn resolve_nodes(&mut self, nodes: &[Spanned<RenderNode>]) -> Vec<ResolvedNode> {
        nodes
            .iter()
            .filter_map(|node| self.resolve_node(node))
            .collect()
    }

    fn resolve_node(&mut self, node: &Spanned<RenderNode>) -> Option<ResolvedNode> {
        let resolved = match node.value() {
            RenderNode::Element {
                tag,
                attributes,
                children,
            } => ResolvedNode::Element {
                tag: tag.clone(),
                attributes: attributes.clone(),
                children: self.resolve_nodes(children),
            },
            RenderNode::Text(text) => ResolvedNode::Text(text.clone()),
            RenderNode::Component { name, props } => {
                let Some(component) = self.registry.component_id(name.value()) else {
                    self.diagnostics.push(Diagnostic::unresolved(
                        "component",
                        name.value(),
                        self.referrer,
                        name.span(),
                    ));
                    return None;
                };
                if !self.components.contains(&component) {
                    self.components.push(component);
                }
                ResolvedNode::Component {
                    component,
                    props: props.clone(),
                }
            }
            RenderNode::ForEach { item, source, body } => ResolvedNode::ForEach {
                item: item.clone(),
                source: source.clone(),
                body: self.resolve_nodes(body),
            },
            RenderNode::If {
                condition,
                then_branch,
                else_branch,
            } => ResolvedNode::If {
                condition: condition.clone(),
                then_branch: self.resolve_nodes(then_branch),
                else_branch: self.resolve_nodes(else_branch),
            },
        };
        Some(resolved)
    }
}

/// Route uniqueness across pages. Every later page reusing a route is reported,
/// pointing at the first page that declared it.
pub fn check_routes(registry: &DeclarationRegistry<'_>) -> Vec<Diagnostic> {
    let mut first_use: FxHashMap<&str, (&str, Span)> = FxHashMap::default();
    let mut diagnostics = Vec::new();
    for (_, page) in registry.pages() {
        let page = page.value();
        let route = page.route.value().as_str();
        match first_use.get(route) {
            Some(&(first_page, first_span)) => diagnostics.push(
                Diagnostic::shape(
                    format!(
                        "route '{route}' of page '{}' is already used by page '{first_page}'",
                        page.name.value()
                    ),
                    page.route.span(),
                )
                .with_related_span(first_span, format!("route '{route}' is first declared here")),
            ),
            None => {
                first_use.insert(route, (page.name.value().as_str(), page.route.span()));
            }
        }
    }
    diagnostics
}
