// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in import strategies.

mod anim_blueprint;
mod data_asset;
mod material;
mod physics_asset;
mod skeleton;
mod string_table;
mod templated;
mod user_struct;

pub use anim_blueprint::{AnimBlueprintImporter, ANIM_GRAPH};
pub use data_asset::DataAssetImporter;
pub use material::MaterialImporter;
pub use physics_asset::PhysicsAssetImporter;
pub use skeleton::SkeletonImporter;
pub use string_table::StringTableImporter;
pub use templated::TemplatedImporter;
pub use user_struct::UserStructImporter;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::diagnostics::{Diagnostic, MissingTypeRegistry};
    use crate::dispatch::{ImportContext, ImportedAsset, Importer};
    use crate::error::ImportResult;
    use crate::export::ExportTable;
    use crate::host::HostEngine;
    use crate::settings::ImportSettings;

    /// Run one importer over the named export of `table`
    pub fn run(
        importer: &dyn Importer,
        host: &dyn HostEngine,
        table: &ExportTable,
        name: &str,
    ) -> (ImportResult<ImportedAsset>, Vec<Diagnostic>) {
        let settings = ImportSettings::default();
        let mut missing = MissingTypeRegistry::new();
        let mut diagnostics = Vec::new();
        let record = table.get(name).expect("export present");
        let mut ctx = ImportContext {
            record,
            table,
            host,
            settings: &settings,
            missing: &mut missing,
            diagnostics: &mut diagnostics,
        };
        let result = importer.import(&mut ctx);
        (result, diagnostics)
    }
}
