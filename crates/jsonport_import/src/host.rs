// SPDX-License-Identifier: MIT OR Apache-2.0
//! The host engine seen by importers.
//!
//! Importers never construct engine state directly. They go through
//! [`HostEngine`], which provides the class registry, persisted assets and
//! the editor selection. [`InMemoryHost`] implements it over the built-in
//! class library.

use crate::library::create_host_registry;
use crate::settings::{EngineVersion, ImportSettings};
use indexmap::IndexMap;
use jsonport_graph::{ClassDescriptor, ClassRegistry, Object, ObjectRef};

/// Structural features that depend on the host engine version.
///
/// Resolved once per session, so importers branch on capabilities instead of
/// on version numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Expression nodes can live inside a sub-graph node
    pub subgraphs: bool,
    /// Renamed classes are found through the class redirect table
    pub class_redirects: bool,
}

impl HostCapabilities {
    /// Capabilities of a given engine version
    pub fn from_engine(version: EngineVersion) -> Self {
        let modern = version.major >= 5;
        Self {
            subgraphs: modern,
            class_redirects: modern,
        }
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::from_engine(EngineVersion::default())
    }
}

/// Content path an asset of this name is persisted under
pub fn asset_path(name: &str) -> String {
    format!("/Game/{name}.{name}")
}

/// Engine-side collaborator of an import
pub trait HostEngine {
    /// Class registry of the running engine
    fn classes(&self) -> &ClassRegistry;

    /// Version dependent capabilities
    fn capabilities(&self) -> HostCapabilities;

    /// Find a class by name
    fn find_class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes().find(name)
    }

    /// Load an already persisted asset by path
    fn load_asset(&self, path: &str) -> Option<ObjectRef>;

    /// The asset currently selected in the editor, if it is of `class`
    fn selected_asset(&self, class: &str) -> Option<(&str, &Object)>;

    /// Persist an asset under a path, replacing any asset already there
    fn register_asset(&mut self, path: &str, asset: Object) -> ObjectRef;
}

/// Host backed by the built-in class library and an in-memory asset store
#[derive(Debug, Clone)]
pub struct InMemoryHost {
    classes: ClassRegistry,
    capabilities: HostCapabilities,
    assets: IndexMap<String, Object>,
    selection: Option<String>,
}

impl InMemoryHost {
    /// Create a host for the given settings, with the full class library
    /// plus the configured class redirects
    pub fn new(settings: &ImportSettings) -> Self {
        let mut classes = create_host_registry();
        for (from, to) in &settings.class_redirects {
            classes.add_redirect(from.clone(), to.clone());
        }
        Self::with_classes(classes, settings.capabilities())
    }

    /// Create a host over an explicit class registry
    pub fn with_classes(classes: ClassRegistry, capabilities: HostCapabilities) -> Self {
        Self {
            classes,
            capabilities,
            assets: IndexMap::new(),
            selection: None,
        }
    }

    /// Default content path for an asset name
    pub fn asset_path(name: &str) -> String {
        asset_path(name)
    }

    /// Add a persisted asset under its default path
    pub fn add_asset(&mut self, asset: Object) -> String {
        let path = Self::asset_path(&asset.name);
        self.assets.insert(path.clone(), asset);
        path
    }

    /// Select a persisted asset. Returns false when nothing is stored there.
    pub fn select(&mut self, path: &str) -> bool {
        if self.assets.contains_key(path) {
            self.selection = Some(path.to_string());
            true
        } else {
            false
        }
    }

    /// Create an empty asset of `class` at `path` and select it
    pub fn select_new(&mut self, class: &str, path: &str) -> bool {
        let name = path.rsplit(['/', '.']).next().unwrap_or(path);
        let Some(asset) = self.classes.create_object(class, name) else {
            tracing::warn!("Cannot select {}: unknown class {}", path, class);
            return false;
        };
        self.assets.insert(path.to_string(), asset);
        self.select(path)
    }

    /// Get a persisted asset by path
    pub fn asset(&self, path: &str) -> Option<&Object> {
        self.assets.get(path)
    }

    /// All persisted assets
    pub fn assets(&self) -> impl Iterator<Item = (&str, &Object)> {
        self.assets.iter().map(|(path, asset)| (path.as_str(), asset))
    }

    /// Number of persisted assets
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }
}

impl HostEngine for InMemoryHost {
    fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    fn load_asset(&self, path: &str) -> Option<ObjectRef> {
        if self.assets.contains_key(path) {
            return Some(ObjectRef::Asset(path.to_string()));
        }

        // Bare object names match any stored asset of that name
        if path.contains('/') {
            return None;
        }
        self.assets
            .iter()
            .find(|(_, asset)| asset.name == path)
            .map(|(stored, _)| ObjectRef::Asset(stored.clone()))
    }

    fn selected_asset(&self, class: &str) -> Option<(&str, &Object)> {
        let path = self.selection.as_deref()?;
        let asset = self.assets.get(path)?;
        self.classes
            .is_child_of(&asset.class, class)
            .then_some((path, asset))
    }

    fn register_asset(&mut self, path: &str, asset: Object) -> ObjectRef {
        self.assets.insert(path.to_string(), asset);
        ObjectRef::Asset(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_follow_engine_version() {
        assert!(HostCapabilities::from_engine(EngineVersion::new(5, 0)).subgraphs);
        assert!(!HostCapabilities::from_engine(EngineVersion::new(4, 27)).subgraphs);
        assert!(!HostCapabilities::from_engine(EngineVersion::new(4, 27)).class_redirects);
    }

    #[test]
    fn test_load_asset_by_path_and_name() {
        let mut host = InMemoryHost::new(&ImportSettings::default());
        let path = host.add_asset(Object::new("Texture2D", "T_Rock"));
        assert_eq!(path, "/Game/T_Rock.T_Rock");

        assert_eq!(host.load_asset(&path), Some(ObjectRef::Asset(path.clone())));
        assert_eq!(host.load_asset("T_Rock"), Some(ObjectRef::Asset(path.clone())));
        assert_eq!(host.load_asset("/Game/T_Rock.T_Rock"), Some(ObjectRef::Asset(path)));
        assert_eq!(host.load_asset("/Game/Other/T_Rock.T_Rock"), None);
        assert_eq!(host.load_asset("T_Missing"), None);
    }

    #[test]
    fn test_selection_is_class_checked() {
        let mut host = InMemoryHost::new(&ImportSettings::default());
        assert!(host.select_new("Skeleton", "/Game/Characters/SK_Hero_Skeleton"));

        let (path, skeleton) = host.selected_asset("Skeleton").unwrap();
        assert_eq!(path, "/Game/Characters/SK_Hero_Skeleton");
        assert_eq!(skeleton.name, "SK_Hero_Skeleton");
        assert!(host.selected_asset("AnimBlueprint").is_none());

        assert!(!host.select_new("NoSuchClass", "/Game/X"));
        assert!(!host.select("/Game/Nothing"));
    }

    #[test]
    fn test_settings_redirects_are_registered() {
        let mut settings = ImportSettings::default();
        settings
            .class_redirects
            .insert("OldCurve".to_string(), "CurveFloat".to_string());
        let host = InMemoryHost::new(&settings);
        assert_eq!(host.classes().redirect("OldCurve"), Some("CurveFloat"));
    }
}
