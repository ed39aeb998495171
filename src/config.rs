//! Pipeline configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::synth::{CenterRegion, DEFAULT_SIMILARITY_THRESHOLD};
use crate::{Error, Result};

/// Where the dataset lives and how the offline pass behaves.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory with `image_data.json`, `synsets.json`, `scene_graphs.json`, ...
    pub data_dir: PathBuf,
    /// Directory of per-image scene graph files.
    pub by_id_dir: PathBuf,
    pub similarity_cache_path: PathBuf,
    pub similarity_threshold: f64,
    pub center_region: CenterRegion,
    pub min_relationships: usize,
    pub max_relationships: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            by_id_dir: PathBuf::from("data/by-id"),
            similarity_cache_path: PathBuf::from(".cache/similarity_cache.json"),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            center_region: CenterRegion::default(),
            min_relationships: 0,
            max_relationships: 100,
        }
    }
}

impl PipelineConfig {
    /// Rooted at `data_dir`, with the per-image files in `data_dir/by-id`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            by_id_dir: data_dir.join("by-id"),
            data_dir,
            ..Self::default()
        }
    }

    /// Load a JSON config file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::Config(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.min_relationships > self.max_relationships {
            return Err(Error::Config(format!(
                "min_relationships ({}) exceeds max_relationships ({})",
                self.min_relationships, self.max_relationships
            )));
        }
        Ok(())
    }

    pub fn image_data_path(&self) -> PathBuf {
        self.data_dir.join("image_data.json")
    }

    pub fn synsets_path(&self) -> PathBuf {
        self.data_dir.join("synsets.json")
    }

    pub fn scene_graphs_path(&self) -> PathBuf {
        self.data_dir.join("scene_graphs.json")
    }

    pub fn attributes_path(&self) -> PathBuf {
        self.data_dir.join("attributes.json")
    }

    pub fn region_descriptions_path(&self) -> PathBuf {
        self.data_dir.join("region_descriptions.json")
    }

    pub fn question_answers_path(&self) -> PathBuf {
        self.data_dir.join("question_answers.json")
    }

    pub fn category_table_path(&self) -> PathBuf {
        self.data_dir.join("visa.jsonl")
    }

    pub fn auxiliary_mapping_path(&self) -> PathBuf {
        self.data_dir.join("gw_vg_mapping.json")
    }

    pub fn scene_graph_path(&self, image_id: u64) -> PathBuf {
        self.by_id_dir.join(format!("{image_id}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"data_dir": "/srv/vg", "center_region": "legacy"}"#).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/vg"));
        assert_eq!(config.center_region, CenterRegion::Legacy);
        assert_eq!(config.similarity_threshold, 0.75);
        assert_eq!(config.max_relationships, 100);
    }

    #[test]
    fn test_default_region_is_not_the_released_one() {
        let config = PipelineConfig::default();
        assert_eq!(config.center_region, CenterRegion::Proportional);
        let wide = crate::model::Image::new(1, "", 800, 600);
        assert_ne!(config.center_region.bbox(&wide), CenterRegion::Legacy.bbox(&wide));
    }

    #[test]
    fn test_validate() {
        assert!(PipelineConfig::default().validate().is_ok());

        let config = PipelineConfig { similarity_threshold: 1.5, ..PipelineConfig::default() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = PipelineConfig { min_relationships: 5, max_relationships: 1, ..PipelineConfig::default() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_paths() {
        let config = PipelineConfig::with_data_dir("/srv/vg");
        assert_eq!(config.scene_graph_path(42), PathBuf::from("/srv/vg/by-id/42.json"));
        assert_eq!(config.category_table_path(), PathBuf::from("/srv/vg/visa.jsonl"));
        assert_eq!(config.region_descriptions_path(), PathBuf::from("/srv/vg/region_descriptions.json"));
        assert_eq!(config.question_answers_path(), PathBuf::from("/srv/vg/question_answers.json"));
    }
}
