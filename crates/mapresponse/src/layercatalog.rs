use std::{collections::BTreeMap, path::Path, sync::Arc};

use crate::{CoverageSource, Error, GeoTiffFileSource, Result};

/// The layers that can be requested, maps a layer name to its source
#[derive(Clone, Default)]
pub struct LayerCatalog {
    layers: BTreeMap<String, Arc<dyn CoverageSource>>,
}

impl LayerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, name: impl Into<String>, source: Arc<dyn CoverageSource>) {
        let name = name.into();
        if self.layers.insert(name.clone(), source).is_some() {
            log::warn!("Layer '{name}' was registered twice, the last source is used");
        }
    }

    pub fn with_layer(mut self, name: impl Into<String>, source: impl CoverageSource + 'static) -> Self {
        self.add_layer(name, Arc::new(source));
        self
    }

    /// Registers every GeoTIFF file in the directory (non recursive), the file stem is used as layer name
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let mut catalog = LayerCatalog::new();
        let entries = std::fs::read_dir(dir).map_err(|err| Error::SourceUnavailable(format!("{}: {err}", dir.display())))?;

        for entry in entries.flatten() {
            let path = entry.path();
            let is_tiff = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"));
            if !path.is_file() || !is_tiff {
                continue;
            }

            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            match GeoTiffFileSource::open(&path) {
                Ok(source) => {
                    log::info!("Serving {} as layer '{name}'", path.display());
                    catalog.add_layer(name, Arc::new(source));
                }
                Err(e) => log::warn!("Error serving {}: {e}", path.display()),
            }
        }

        Ok(catalog)
    }

    pub fn layer(&self, name: &str) -> Result<Arc<dyn CoverageSource>> {
        self.layers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Request(format!("Unknown layer: {name}")))
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl std::fmt::Debug for LayerCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerCatalog").field("layers", &self.layers.keys()).finish()
    }
}
