use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouterError};
use crate::templates::TemplateKind;
use crate::tree::cache::Cache;

/// Per-router configuration flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Force the router onto (or off) the pathname. Unset means derived.
    pub is_path_router: Option<bool>,
    /// Skip cache capture on hide; inherited by descendants that leave it unset.
    pub disable_caching: Option<bool>,
    /// Show automatically when the parent becomes visible.
    pub default_show: bool,
}

/// Declarative description of a router and its children.
///
/// ```toml
/// name = "app"
///
/// [[routers.scene]]
/// name = "home"
/// config = { default_show = true }
///
/// [[routers.stack]]
/// name = "modal"
/// route_key = "m"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterDeclaration {
    #[serde(default)]
    pub name: String,
    /// Only read for the root; children take their type from the `routers` key.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_key: Option<String>,
    #[serde(default)]
    pub config: RouterConfig,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub routers: BTreeMap<String, Vec<RouterDeclaration>>,
}

impl RouterDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn route_key(mut self, route_key: impl Into<String>) -> Self {
        self.route_key = Some(route_key.into());
        self
    }

    pub fn default_show(mut self) -> Self {
        self.config.default_show = true;
        self
    }

    pub fn path_router(mut self, is_path_router: bool) -> Self {
        self.config.is_path_router = Some(is_path_router);
        self
    }

    pub fn disable_caching(mut self, disable: bool) -> Self {
        self.config.disable_caching = Some(disable);
        self
    }

    /// Appends a child under `kind`.
    pub fn child(mut self, kind: impl Into<String>, child: RouterDeclaration) -> Self {
        self.routers.entry(kind.into()).or_default().push(child);
        self
    }
}

/// What the path-ownership rule needs to know about a sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SiblingHint {
    pub kind: TemplateKind,
    pub forced_path: bool,
}

/// Decides once, at construction, whether a router owns a pathname segment.
///
/// At most one sibling family claims the segment at a given depth: an
/// explicitly forced data router beats scenes, otherwise scenes beat data.
pub(crate) fn derive_path_ownership(
    name: &str,
    kind: &TemplateKind,
    config: &RouterConfig,
    parent: Option<(&str, bool)>,
    siblings: &[SiblingHint],
) -> Result<bool> {
    let Some((parent_name, parent_is_path)) = parent else {
        return Ok(true);
    };

    let forced_data_sibling = siblings
        .iter()
        .any(|s| s.kind == TemplateKind::Data && s.forced_path);

    match config.is_path_router {
        Some(true) if parent_is_path => Ok(true),
        Some(true) => Err(RouterError::PathRouterUnderQueryParent {
            name: name.to_string(),
            parent: parent_name.to_string(),
        }),
        Some(false) => Ok(false),
        None if !parent_is_path => Ok(false),
        None => Ok(match kind {
            TemplateKind::Scene => !forced_data_sibling,
            TemplateKind::Data => {
                let scene_sibling = siblings.iter().any(|s| s.kind == TemplateKind::Scene);
                !scene_sibling && !forced_data_sibling
            }
            _ => false,
        }),
    }
}

/// A router in the arena. The parent is referenced by name.
#[derive(Debug, Clone)]
pub struct RouterNode {
    name: String,
    kind: TemplateKind,
    route_key: String,
    config: RouterConfig,
    parent: Option<String>,
    children: BTreeMap<TemplateKind, Vec<String>>,
    is_path_router: bool,
    path_location: i32,
    pub(crate) cache: Cache,
    /// Last payload this data router wrote or accepted from the pathname.
    pub(crate) known_data: Option<String>,
}

impl RouterNode {
    pub(crate) fn new(
        name: String,
        kind: TemplateKind,
        route_key: String,
        config: RouterConfig,
        parent: Option<String>,
        is_path_router: bool,
        path_location: i32,
    ) -> Self {
        Self {
            name,
            kind,
            route_key,
            config,
            parent,
            children: BTreeMap::new(),
            is_path_router,
            path_location,
            cache: Cache::default(),
            known_data: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TemplateKind {
        &self.kind
    }

    pub fn route_key(&self) -> &str {
        &self.route_key
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_path_router(&self) -> bool {
        self.is_path_router
    }

    /// Depth in the path-router chain; the root is -1.
    pub fn path_location(&self) -> i32 {
        self.path_location
    }

    /// Pathname index this router reads and writes, if it owns one.
    pub fn path_index(&self) -> Option<usize> {
        if !self.is_path_router {
            return None;
        }
        usize::try_from(self.path_location).ok()
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn known_data(&self) -> Option<&str> {
        self.known_data.as_deref()
    }

    /// Child names grouped by type.
    pub fn children_by_type(&self) -> &BTreeMap<TemplateKind, Vec<String>> {
        &self.children
    }

    /// All child names, grouped by type then in declaration order.
    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.children.values().flatten().map(String::as_str)
    }

    pub fn children_of_type(&self, kind: &TemplateKind) -> &[String] {
        self.children.get(kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn push_child(&mut self, kind: TemplateKind, name: String) {
        self.children.entry(kind).or_default().push(name);
    }

    pub(crate) fn detach_child(&mut self, name: &str) {
        for names in self.children.values_mut() {
            names.retain(|n| n != name);
        }
        self.children.retain(|_, names| !names.is_empty());
    }
}
