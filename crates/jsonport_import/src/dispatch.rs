// SPDX-License-Identifier: MIT OR Apache-2.0
//! Importer dispatch and batch import.
//!
//! Every top-level export of a batch is routed to one strategy: a
//! registered importer for its exact type, the data asset importer for
//! data asset subclasses, or the templated importer for everything else.
//! A failed export never stops the batch.

use crate::deserialize::PropertyDeserializer;
use crate::diagnostics::{Diagnostic, MissingTypeRegistry};
use crate::error::{ImportError, ImportResult};
use crate::export::{ExportRecord, ExportTable};
use crate::host::{self, HostEngine};
use crate::importers::{
    AnimBlueprintImporter, DataAssetImporter, MaterialImporter, PhysicsAssetImporter,
    SkeletonImporter, StringTableImporter, TemplatedImporter, UserStructImporter,
};
use crate::library::DATA_ASSET;
use crate::reference::ReferenceResolver;
use crate::settings::ImportSettings;
use indexmap::IndexMap;
use jsonport_graph::{ClassRegistry, ExpressionGraph, Object};
use serde::Serialize;
use std::path::Path;

/// Asset types importable without a dedicated importer
pub const ACCEPTED_TYPES: &[&str] = &[
    // Animation
    "AnimSequence",
    "AnimMontage",
    "BlendSpace",
    "BlendSpace1D",
    "AimOffsetBlendSpace",
    "AimOffsetBlendSpace1D",
    // Curves
    "CurveFloat",
    "CurveVector",
    "CurveLinearColor",
    "CurveLinearColorAtlas",
    // Data
    "DataAsset",
    "SlateBrushAsset",
    "SlateWidgetStyleAsset",
    "AnimBoneCompressionSettings",
    "AnimCurveCompressionSettings",
    // Landscape
    "LandscapeGrassType",
    "FoliageType_InstancedStaticMesh",
    "FoliageType_Actor",
    // Tables
    "CurveTable",
    "DataTable",
    "StringTable",
    // Materials
    "Material",
    "MaterialFunction",
    "MaterialInstanceConstant",
    "MaterialParameterCollection",
    "SubsurfaceProfile",
    "NiagaraParameterCollection",
    // Skeletal
    "SkeletalMeshLODSettings",
    "Skeleton",
    // Physics
    "PhysicsAsset",
    "PhysicalMaterial",
    // Sound
    "SoundCue",
    "ReverbEffect",
    "SoundAttenuation",
    "SoundConcurrency",
    "SoundClass",
    "SoundMix",
    "SoundModulationPatch",
    "SubmixEffectDynamicsProcessorPreset",
    // Textures
    "TextureRenderTarget2D",
    // User defined
    "UserDefinedEnum",
];

/// Asset types that are imported but never saved
const UNSAVED_TYPES: [&str; 2] = ["AnimSequence", "AnimMontage"];

/// Everything a strategy may touch while importing one export
pub struct ImportContext<'a> {
    /// The export being imported
    pub record: &'a ExportRecord,
    /// The whole batch
    pub table: &'a ExportTable,
    /// Engine collaborator
    pub host: &'a dyn HostEngine,
    /// Session settings
    pub settings: &'a ImportSettings,
    /// Missing node types seen in this batch
    pub missing: &'a mut MissingTypeRegistry,
    /// Findings for the batch report
    pub diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> ImportContext<'a> {
    /// Host class registry
    pub fn classes(&self) -> &'a ClassRegistry {
        let host: &'a dyn HostEngine = self.host;
        host.classes()
    }

    /// Reference resolver over the batch table
    pub fn resolver(&self) -> ReferenceResolver<'a> {
        let record: &'a ExportRecord = self.record;
        let settings: &'a ImportSettings = self.settings;
        ReferenceResolver::new(self.table)
            .with_game_name(&settings.game_name)
            .with_package(&record.name)
    }

    /// Property deserializer honouring the configured blacklist
    pub fn deserializer(&self) -> PropertyDeserializer<'a> {
        let settings: &'a ImportSettings = self.settings;
        PropertyDeserializer::new(self.host, self.resolver())
            .with_blacklist(&settings.property_blacklist)
    }

    /// Create an empty asset of the export's class
    pub fn create_asset(&self) -> ImportResult<Object> {
        self.classes()
            .create_object(&self.record.ty, &self.record.name)
            .ok_or_else(|| ImportError::UnknownClass(self.record.ty.clone()))
    }

    /// Content path of the asset being imported
    pub fn asset_path(&self) -> String {
        host::asset_path(&self.record.name)
    }

    /// Add a finding to the batch report
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// A successfully imported asset
#[derive(Debug, Clone)]
pub struct ImportedAsset {
    /// Content path the asset is registered under
    pub path: String,
    /// The asset itself
    pub object: Object,
    /// Main node graph, for graph-shaped assets
    pub graph: Option<ExpressionGraph>,
    /// Nested graphs (state machine states)
    pub subgraphs: Vec<ExpressionGraph>,
    /// Sub-objects owned by the asset
    pub subobjects: Vec<Object>,
}

impl ImportedAsset {
    /// Create an imported asset without graphs or sub-objects
    pub fn new(path: impl Into<String>, object: Object) -> Self {
        Self {
            path: path.into(),
            object,
            graph: None,
            subgraphs: Vec::new(),
            subobjects: Vec::new(),
        }
    }

    /// Set the main graph
    pub fn with_graph(mut self, graph: ExpressionGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Set the sub-objects
    pub fn with_subobjects(mut self, subobjects: Vec<Object>) -> Self {
        self.subobjects = subobjects;
        self
    }
}

/// Imports one kind of asset
pub trait Importer {
    /// Export types this importer handles. Empty for fallback strategies.
    fn types(&self) -> &[&'static str];

    /// Import `ctx.record`
    fn import(&self, ctx: &mut ImportContext<'_>) -> ImportResult<ImportedAsset>;
}

/// How an export type is imported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// A registered importer, by registration index
    Registered(usize),
    /// Generic data asset import
    DataAsset,
    /// Top-level property assignment only
    Templated,
}

/// Type name to importer table
pub struct ImporterRegistry {
    importers: Vec<Box<dyn Importer>>,
    by_type: IndexMap<&'static str, usize>,
    data_asset: DataAssetImporter,
    templated: TemplatedImporter,
}

impl ImporterRegistry {
    /// Create a registry with only the fallback strategies
    pub fn new() -> Self {
        Self {
            importers: Vec::new(),
            by_type: IndexMap::new(),
            data_asset: DataAssetImporter,
            templated: TemplatedImporter,
        }
    }

    /// Create a registry with every built-in importer
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MaterialImporter));
        registry.register(Box::new(StringTableImporter));
        registry.register(Box::new(PhysicsAssetImporter));
        registry.register(Box::new(SkeletonImporter));
        registry.register(Box::new(UserStructImporter));
        registry.register(Box::new(AnimBlueprintImporter));
        registry
    }

    /// Register an importer for its types; later registrations win
    pub fn register(&mut self, importer: Box<dyn Importer>) {
        let index = self.importers.len();
        for ty in importer.types() {
            self.by_type.insert(ty, index);
        }
        self.importers.push(importer);
    }

    /// Pick the strategy for a type
    pub fn dispatch(&self, type_name: &str, classes: &ClassRegistry) -> Strategy {
        if let Some(index) = self.by_type.get(type_name) {
            Strategy::Registered(*index)
        } else if classes.is_child_of(type_name, DATA_ASSET) {
            Strategy::DataAsset
        } else {
            Strategy::Templated
        }
    }

    /// The importer behind a strategy
    pub fn importer(&self, strategy: Strategy) -> &dyn Importer {
        match strategy {
            Strategy::Registered(index) => match self.importers.get(index) {
                Some(importer) => importer.as_ref(),
                None => &self.templated,
            },
            Strategy::DataAsset => &self.data_asset,
            Strategy::Templated => &self.templated,
        }
    }

    /// Whether exports of this type are imported at all
    pub fn can_import(&self, type_name: &str, classes: &ClassRegistry) -> bool {
        ACCEPTED_TYPES.contains(&type_name)
            || self.by_type.contains_key(type_name)
            || (type_name.starts_with("Sound")
                && type_name != "SoundWave"
                && !type_name.starts_with("SoundNode"))
            || type_name.starts_with("SubmixEffect")
            || type_name.starts_with("FoliageType")
            || classes.is_child_of(type_name, DATA_ASSET)
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Result of one top-level export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ImportStatus {
    /// The asset was imported
    Imported,
    /// The importer failed, with the reason
    Failed(String),
}

/// Outcome of one top-level export
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    /// Export name
    pub name: String,
    /// Export type
    pub type_name: String,
    /// Success or failure
    pub status: ImportStatus,
    /// Whether the package would be saved
    pub saved: bool,
}

/// Result of importing one export table
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Per-export outcomes, in table order
    pub outcomes: Vec<ExportOutcome>,
    /// Imported assets
    pub assets: Vec<ImportedAsset>,
    /// Exports of unknown or non-importable types
    pub skipped: usize,
    /// Distinct missing node types, in first-seen order
    pub missing_types: Vec<String>,
    /// Findings
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    /// Number of imported exports
    pub fn success_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == ImportStatus::Imported)
            .count()
    }

    /// Number of failed exports
    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    /// Imported asset by name
    pub fn asset(&self, name: &str) -> Option<&ImportedAsset> {
        self.assets.iter().find(|a| a.object.name == name)
    }
}

/// Imports export batches into a host
pub struct ImportSession<'h> {
    host: &'h mut dyn HostEngine,
    settings: &'h ImportSettings,
    registry: ImporterRegistry,
}

impl<'h> ImportSession<'h> {
    /// Create a session with the built-in importers
    pub fn new(host: &'h mut dyn HostEngine, settings: &'h ImportSettings) -> Self {
        Self::with_registry(host, settings, ImporterRegistry::with_defaults())
    }

    /// Create a session with a custom importer table
    pub fn with_registry(
        host: &'h mut dyn HostEngine,
        settings: &'h ImportSettings,
        registry: ImporterRegistry,
    ) -> Self {
        Self {
            host,
            settings,
            registry,
        }
    }

    /// Import every top-level export of a table
    pub fn import_batch(&mut self, table: &ExportTable) -> BatchReport {
        let mut report = BatchReport::default();
        let mut missing = MissingTypeRegistry::new();

        for (index, reason) in table.malformed() {
            report.diagnostics.push(Diagnostic::MalformedExport {
                index: *index,
                reason: reason.clone(),
            });
        }

        for record in table.iter() {
            let classes = self.host.classes();
            if classes.find(&record.ty).is_none() || !self.registry.can_import(&record.ty, classes) {
                tracing::debug!("Skipping {} ({})", record.name, record.ty);
                report.skipped += 1;
                continue;
            }

            let strategy = self.registry.dispatch(&record.ty, classes);
            let mut diagnostics = Vec::new();
            let result = {
                let mut ctx = ImportContext {
                    record,
                    table,
                    host: &*self.host,
                    settings: self.settings,
                    missing: &mut missing,
                    diagnostics: &mut diagnostics,
                };
                self.registry.importer(strategy).import(&mut ctx)
            };
            report.diagnostics.append(&mut diagnostics);

            match result {
                Ok(asset) => {
                    let saved = self.settings.save_packages_on_import
                        && !UNSAVED_TYPES.contains(&record.ty.as_str());
                    tracing::info!("Imported \"{}\" as \"{}\"", record.name, record.ty);

                    self.host.register_asset(&asset.path, asset.object.clone());
                    report.outcomes.push(ExportOutcome {
                        name: record.name.clone(),
                        type_name: record.ty.clone(),
                        status: ImportStatus::Imported,
                        saved,
                    });
                    report.assets.push(asset);
                }
                Err(err) => {
                    if let ImportError::MaterialDataMissing(asset) = &err {
                        report.diagnostics.push(Diagnostic::MaterialDataMissing {
                            asset: asset.clone(),
                        });
                    }
                    tracing::warn!("Failed to import \"{}\" ({}): {}", record.name, record.ty, err);
                    report.outcomes.push(ExportOutcome {
                        name: record.name.clone(),
                        type_name: record.ty.clone(),
                        status: ImportStatus::Failed(err.to_string()),
                        saved: false,
                    });
                }
            }

            // Quiet imports stop after the first importable export
            if self.settings.hide_notifications {
                break;
            }
        }

        report.missing_types = missing.type_names().map(str::to_string).collect();
        tracing::info!(
            "Import finished: {} imported, {} failed, {} skipped, {} missing node type(s)",
            report.success_count(),
            report.failure_count(),
            report.skipped,
            report.missing_types.len()
        );
        report
    }

    /// Parse and import a JSON document
    pub fn import_str(&mut self, source: &str) -> ImportResult<BatchReport> {
        let table = ExportTable::from_json_str(source)?;
        Ok(self.import_batch(&table))
    }

    /// Read, parse and import a JSON file
    pub fn import_file(&mut self, path: &Path) -> ImportResult<BatchReport> {
        tracing::info!("Importing {}", path.display());
        let source = std::fs::read_to_string(path)?;
        self.import_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InMemoryHost;
    use jsonport_graph::{Reflect, Value};
    use serde_json::json;

    fn material_batch() -> ExportTable {
        ExportTable::from_values(&[
            json!({"Type": "Material", "Name": "M_Test"}),
            json!({"Type": "Add", "Name": "A", "Outer": "M_Test", "Properties": {
                "A": {"Expression": {"ObjectName": "X'M_Test:B'"}}
            }}),
            json!({"Type": "Constant", "Name": "B", "Outer": "M_Test"}),
            json!({"Type": "UnknownFutureNodeType42", "Name": "C", "Outer": "M_Test"}),
            json!({"Type": "UnknownFutureNodeType42", "Name": "C2", "Outer": "M_Test"}),
        ])
    }

    #[test]
    fn test_dispatch_strategies() {
        let registry = ImporterRegistry::with_defaults();
        let classes = crate::library::create_host_registry();

        assert!(matches!(registry.dispatch("Material", &classes), Strategy::Registered(_)));
        assert!(matches!(registry.dispatch("MaterialFunction", &classes), Strategy::Registered(_)));
        assert_eq!(registry.dispatch("PrimaryDataAsset", &classes), Strategy::DataAsset);
        assert_eq!(registry.dispatch("CurveFloat", &classes), Strategy::Templated);
    }

    #[test]
    fn test_can_import_prefix_rules() {
        let registry = ImporterRegistry::with_defaults();
        let classes = crate::library::create_host_registry();

        assert!(registry.can_import("SoundClass", &classes));
        assert!(registry.can_import("SoundSubmix", &classes));
        assert!(!registry.can_import("SoundWave", &classes));
        assert!(!registry.can_import("SoundNodeRandom", &classes));
        assert!(registry.can_import("SubmixEffectReverbPreset", &classes));
        assert!(registry.can_import("FoliageType_Actor", &classes));
        assert!(registry.can_import("PrimaryDataAsset", &classes));
        assert!(!registry.can_import("StaticMesh", &classes));
    }

    #[test]
    fn test_batch_imports_material_with_missing_type() {
        let settings = ImportSettings::default();
        let mut host = InMemoryHost::new(&settings);
        let report = ImportSession::new(&mut host, &settings).import_batch(&material_batch());

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 0);
        assert_eq!(report.missing_types, vec!["UnknownFutureNodeType42".to_string()]);
        let missing_diagnostics = report
            .diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::MissingNodeClass { .. }))
            .count();
        assert_eq!(missing_diagnostics, 1);

        let graph = report.asset("M_Test").and_then(|a| a.graph.as_ref()).unwrap();
        assert_eq!(graph.connection_count(), 1);
        assert!(host.asset("/Game/M_Test.M_Test").is_some());
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let settings = ImportSettings::default();
        let mut host = InMemoryHost::new(&settings);
        let table = ExportTable::from_values(&[
            json!({"Type": "Skeleton", "Name": "SK_Hero"}),
            json!({"Type": "StringTable", "Name": "ST_Broken"}),
            json!({"Type": "CurveFloat", "Name": "C_Fade", "Properties": {
                "FloatCurve": {"Keys": [{"Time": 0.0, "Value": 1.0}, {"Time": 1.0, "Value": 0.0}]}
            }}),
            json!({"Type": "Package", "Name": "Ignored"}),
        ]);
        let report = ImportSession::new(&mut host, &settings).import_batch(&table);

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 2);
        assert_eq!(report.skipped, 1);
        assert!(matches!(&report.outcomes[0].status, ImportStatus::Failed(reason) if reason.contains("Skeleton")));

        let curve = host.asset("/Game/C_Fade.C_Fade").unwrap();
        let keys = curve
            .value("FloatCurve")
            .and_then(Value::as_struct)
            .and_then(|c| c.get("Keys"))
            .and_then(Value::as_array)
            .unwrap();
        assert_eq!(keys.len(), 2);
        assert!(host.asset("/Game/SK_Hero.SK_Hero").is_none());
    }

    #[test]
    fn test_hide_notifications_stops_after_first_import() {
        let settings = ImportSettings {
            hide_notifications: true,
            ..ImportSettings::default()
        };
        let mut host = InMemoryHost::new(&settings);
        let table = ExportTable::from_values(&[
            json!({"Type": "Package", "Name": "Ignored"}),
            json!({"Type": "PhysicalMaterial", "Name": "PM_A"}),
            json!({"Type": "PhysicalMaterial", "Name": "PM_B"}),
        ]);
        let report = ImportSession::new(&mut host, &settings).import_batch(&table);

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].name, "PM_A");
    }

    #[test]
    fn test_animation_sequences_are_not_saved() {
        let settings = ImportSettings {
            save_packages_on_import: true,
            ..ImportSettings::default()
        };
        let mut host = InMemoryHost::new(&settings);
        let table = ExportTable::from_values(&[
            json!({"Type": "AnimSequence", "Name": "A_Run"}),
            json!({"Type": "PhysicalMaterial", "Name": "PM_A"}),
        ]);
        let report = ImportSession::new(&mut host, &settings).import_batch(&table);

        assert!(!report.outcomes[0].saved);
        assert!(report.outcomes[1].saved);
    }

    #[test]
    fn test_import_str_reports_malformed_records() {
        let settings = ImportSettings::default();
        let mut host = InMemoryHost::new(&settings);
        let report = ImportSession::new(&mut host, &settings)
            .import_str(r#"[{"Name": "NoType"}, {"Type": "PhysicalMaterial", "Name": "PM"}]"#)
            .unwrap();

        assert_eq!(report.success_count(), 1);
        assert!(matches!(report.diagnostics[0], Diagnostic::MalformedExport { index: 0, .. }));
    }
}
