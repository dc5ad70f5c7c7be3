//! Router tree: an arena of nodes keyed by router name.
//!
//! Parents are stored as names, children as typed name lists, so removal
//! walks the subtree by key without any shared ownership.

mod cache;
mod node;

pub use cache::{Cache, CacheValue};
pub use node::{RouterConfig, RouterDeclaration, RouterNode};

use std::collections::{HashMap, HashSet};

use crate::error::{Result, RouterError};
use crate::templates::{TemplateKind, TemplateRegistry};
use node::{derive_path_ownership, SiblingHint};

/// Root type when the root declaration leaves `type` unset.
pub const DEFAULT_ROOT_TYPE: &str = "scene";

#[derive(Debug, Clone, Default)]
pub struct RouterTree {
    nodes: HashMap<String, RouterNode>,
    root: Option<String>,
}

impl RouterTree {
    /// Builds a tree from the root declaration.
    pub fn from_declaration(
        declaration: &RouterDeclaration,
        templates: &TemplateRegistry,
    ) -> Result<Self> {
        let mut tree = Self::default();
        tree.add_root(declaration, templates)?;
        Ok(tree)
    }

    /// Adds the root router and its declared descendants.
    pub fn add_root(
        &mut self,
        declaration: &RouterDeclaration,
        templates: &TemplateRegistry,
    ) -> Result<()> {
        if let Some(existing) = &self.root {
            return Err(RouterError::DuplicateRoot {
                existing: existing.clone(),
                name: declaration.name.clone(),
            });
        }
        let kind = declaration
            .kind
            .clone()
            .unwrap_or_else(|| DEFAULT_ROOT_TYPE.to_string());

        let mut staged = self.clone();
        staged.insert(None, &kind, declaration, &[], templates)?;
        *self = staged;
        Ok(())
    }

    /// Adds a declared subtree under `parent`. Nothing is inserted on error.
    pub fn add_child(
        &mut self,
        parent: &str,
        kind: &str,
        declaration: &RouterDeclaration,
        templates: &TemplateRegistry,
    ) -> Result<()> {
        let parent_node = self.nodes.get(parent).ok_or_else(|| RouterError::ParentNotFound {
            parent: parent.to_string(),
            name: declaration.name.clone(),
        })?;
        let siblings: Vec<SiblingHint> = parent_node
            .children()
            .filter_map(|name| self.nodes.get(name))
            .map(|node| SiblingHint {
                kind: node.kind().clone(),
                forced_path: node.config().is_path_router == Some(true),
            })
            .collect();

        let mut staged = self.clone();
        staged.insert(Some(parent), kind, declaration, &siblings, templates)?;
        *self = staged;
        Ok(())
    }

    fn insert(
        &mut self,
        parent: Option<&str>,
        kind: &str,
        declaration: &RouterDeclaration,
        siblings: &[SiblingHint],
        templates: &TemplateRegistry,
    ) -> Result<()> {
        let name = declaration.name.as_str();
        if name.is_empty() {
            return Err(RouterError::MissingField { field: "name" });
        }
        if kind.is_empty() {
            return Err(RouterError::MissingField { field: "type" });
        }
        let kind = TemplateKind::from_name(kind);
        if !templates.contains(&kind) {
            return Err(RouterError::UnknownTemplate {
                kind: kind.to_string(),
            });
        }
        if self.nodes.contains_key(name) {
            return Err(RouterError::DuplicateName {
                name: name.to_string(),
            });
        }
        let route_key = declaration
            .route_key
            .clone()
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| name.to_string());
        if self.nodes.values().any(|node| node.route_key() == route_key) {
            return Err(RouterError::DuplicateRouteKey {
                route_key,
                name: name.to_string(),
            });
        }

        let parent_info = match parent {
            Some(parent_name) => {
                let parent_node =
                    self.nodes.get(parent_name).ok_or_else(|| RouterError::ParentNotFound {
                        parent: parent_name.to_string(),
                        name: name.to_string(),
                    })?;
                Some((parent_name, parent_node.is_path_router(), parent_node.path_location()))
            }
            None => None,
        };

        let is_path_router = derive_path_ownership(
            name,
            &kind,
            &declaration.config,
            parent_info.map(|(parent_name, is_path, _)| (parent_name, is_path)),
            siblings,
        )?;
        let path_location = match parent_info {
            None => -1,
            Some((_, _, parent_location)) if is_path_router => parent_location + 1,
            Some((_, _, parent_location)) => parent_location,
        };

        tracing::debug!(
            router = %name,
            kind = %kind,
            route_key = %route_key,
            is_path_router,
            path_location,
            "Router added"
        );

        let node = RouterNode::new(
            name.to_string(),
            kind.clone(),
            route_key,
            declaration.config.clone(),
            parent.map(str::to_string),
            is_path_router,
            path_location,
        );
        self.nodes.insert(name.to_string(), node);
        match parent {
            Some(parent_name) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_name) {
                    parent_node.push_child(kind, name.to_string());
                }
            }
            None => self.root = Some(name.to_string()),
        }

        let declared: Vec<(&String, &RouterDeclaration)> = declaration
            .routers
            .iter()
            .flat_map(|(child_kind, children)| children.iter().map(move |c| (child_kind, c)))
            .collect();
        for (index, (child_kind, child)) in declared.iter().enumerate() {
            let child_siblings: Vec<SiblingHint> = declared
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .map(|(_, (other_kind, other))| SiblingHint {
                    kind: TemplateKind::from_name(other_kind),
                    forced_path: other.config.is_path_router == Some(true),
                })
                .collect();
            self.insert(Some(name), child_kind, child, &child_siblings, templates)?;
        }
        Ok(())
    }

    /// Removes `name` and all its descendants. Returns the removed names.
    pub fn remove(&mut self, name: &str) -> Result<Vec<String>> {
        let node = self.node(name)?;
        let Some(parent) = node.parent().map(str::to_string) else {
            return Err(RouterError::RootRemoval {
                name: name.to_string(),
            });
        };

        let removed = self.subtree(name);
        for removed_name in &removed {
            self.nodes.remove(removed_name);
        }
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.detach_child(name);
        }
        tracing::debug!(router = %name, removed = removed.len(), "Router subtree removed");
        Ok(removed)
    }

    pub fn get(&self, name: &str) -> Option<&RouterNode> {
        self.nodes.get(name)
    }

    pub fn node(&self, name: &str) -> Result<&RouterNode> {
        self.nodes.get(name).ok_or_else(|| RouterError::UnknownRouter {
            name: name.to_string(),
        })
    }

    pub(crate) fn node_mut(&mut self, name: &str) -> Result<&mut RouterNode> {
        self.nodes.get_mut(name).ok_or_else(|| RouterError::UnknownRouter {
            name: name.to_string(),
        })
    }

    pub fn root(&self) -> Option<&RouterNode> {
        self.root.as_deref().and_then(|name| self.nodes.get(name))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every router name, parents before children.
    pub fn names(&self) -> Vec<String> {
        self.root
            .as_deref()
            .map(|root| self.subtree(root))
            .unwrap_or_default()
    }

    /// `name` followed by all of its descendants, parents first.
    pub fn subtree(&self, name: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut pending = vec![name.to_string()];
        let mut seen = HashSet::new();
        while let Some(current) = pending.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&current) {
                let children: Vec<String> = node.children().map(str::to_string).collect();
                pending.extend(children.into_iter().rev());
                out.push(current);
            }
        }
        out
    }

    /// Direct children of `name` in type order, then declaration order.
    pub fn children(&self, name: &str) -> Vec<String> {
        self.nodes
            .get(name)
            .map(|node| node.children().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn parent_of(&self, name: &str) -> Option<&RouterNode> {
        self.nodes
            .get(name)
            .and_then(RouterNode::parent)
            .and_then(|parent| self.nodes.get(parent))
    }

    /// Other routers of the same type under the same parent.
    pub fn siblings(&self, name: &str) -> Vec<String> {
        let Some(node) = self.nodes.get(name) else {
            return Vec::new();
        };
        self.neighbors_by_type(name, node.kind())
            .into_iter()
            .filter(|sibling| sibling != name)
            .collect()
    }

    /// Routers of type `kind` under the same parent as `name`.
    pub fn neighbors_by_type(&self, name: &str, kind: &TemplateKind) -> Vec<String> {
        self.parent_of(name)
            .map(|parent| parent.children_of_type(kind).to_vec())
            .unwrap_or_default()
    }

    /// Resets the payload every data router last wrote or accepted.
    pub(crate) fn clear_known_data(&mut self) {
        for node in self.nodes.values_mut() {
            node.known_data = None;
        }
    }
}
