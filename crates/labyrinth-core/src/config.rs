//! Engine configuration.
//!
//! `MazeConfig` is process-wide (dimensions, templates, decoration catalog,
//! navigation settings) and is usually loaded from JSON. `RoundConfig` is
//! the per-round input supplied by whoever triggers regeneration.

use std::path::Path;

use labyrinth_logic::spatial::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::MazeError;

/// A prefab reference. Structural pieces are sized from `MazeDimensions`;
/// `size` only matters for decorations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    #[serde(default = "default_template_size")]
    pub size: Vec3,
}

fn default_template_size() -> Vec3 {
    Vec3::splat(1.0)
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: default_template_size(),
        }
    }

    pub fn with_size(mut self, x: f32, y: f32, z: f32) -> Self {
        self.size = Vec3::new(x, y, z);
        self
    }
}

/// World-space sizes of the structural pieces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeDimensions {
    pub cell_width: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,
    pub pillar_size: f32,
    pub floor_thickness: f32,
    pub ceiling_thickness: f32,
}

impl Default for MazeDimensions {
    fn default() -> Self {
        Self {
            cell_width: 4.0,
            wall_height: 3.0,
            wall_thickness: 0.2,
            pillar_size: 0.3,
            floor_thickness: 0.1,
            ceiling_thickness: 0.1,
        }
    }
}

/// Prefabs for floors, walls, pillars and ceilings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralTemplates {
    pub floor: Option<Template>,
    pub wall: Option<Template>,
    /// Optional: without it pillars are skipped with a warning.
    pub pillar: Option<Template>,
    pub ceiling: Option<Template>,
    /// Lit variants mixed into the ceiling cadence.
    pub lit_ceilings: Vec<Template>,
    /// Every `ceiling_cadence`-th ceiling is a lit variant (0 disables).
    pub ceiling_cadence: u32,
}

impl Default for StructuralTemplates {
    fn default() -> Self {
        Self {
            floor: Some(Template::new("floor")),
            wall: Some(Template::new("wall")),
            pillar: Some(Template::new("pillar")),
            ceiling: Some(Template::new("ceiling")),
            lit_ceilings: vec![
                Template::new("ceiling_lamp"),
                Template::new("ceiling_grate_light"),
            ],
            ceiling_cadence: 3,
        }
    }
}

/// Validated view of the structural templates.
#[derive(Debug, Clone, Copy)]
pub struct StructuralSet<'a> {
    pub floor: &'a Template,
    pub wall: &'a Template,
    pub pillar: Option<&'a Template>,
    pub ceiling: &'a Template,
    pub lit_ceilings: &'a [Template],
}

/// One decoration catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecorationEntry {
    pub template: Option<Template>,
    /// Chance in `0.0..=1.0` that the entry is attempted in a cell.
    pub probability: f32,
    /// Minimum grid distance between two placements of this entry.
    #[serde(default)]
    pub min_spacing: f32,
}

impl DecorationEntry {
    pub fn new(template: Template, probability: f32, min_spacing: f32) -> Self {
        Self {
            template: Some(template),
            probability,
            min_spacing,
        }
    }
}

/// A catalog entry that survived template resolution.
#[derive(Debug, Clone)]
pub struct ResolvedDecoration {
    /// Index in the configured catalog; also the pool kind id.
    pub index: usize,
    pub template: Template,
    pub probability: f32,
    pub min_spacing: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationSettings {
    /// Maximum decorations per cell, shared by all entries.
    pub per_cell_cap: usize,
    /// Non-filler entries compare against one roll drawn per cell.
    pub shared_roll: bool,
    /// Minimum distance kept from the cell edge (and so from walls).
    pub wall_clearance: f32,
    /// Added to every half-extent in collision queries.
    pub safety_margin: f32,
    /// Distance of the fixed fallback offsets from the cell center.
    pub nudge: f32,
    pub catalog: Vec<DecorationEntry>,
}

impl Default for DecorationSettings {
    fn default() -> Self {
        Self {
            per_cell_cap: 2,
            shared_roll: true,
            wall_clearance: 0.5,
            safety_margin: 0.05,
            nudge: 0.5,
            catalog: vec![
                DecorationEntry::new(Template::new("rubble").with_size(0.6, 0.2, 0.6), 0.35, 0.0),
                DecorationEntry::new(Template::new("crate").with_size(0.8, 0.8, 0.8), 0.2, 2.0),
                DecorationEntry::new(Template::new("barrel").with_size(0.6, 1.0, 0.6), 0.15, 3.0),
                DecorationEntry::new(Template::new("bones").with_size(0.9, 0.2, 0.5), 0.05, 4.0),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    pub agent_radius: f32,
    pub agent_height: f32,
    pub step_height: f32,
    /// Increasing radii tried by nearest-valid-position queries.
    pub search_radii: Vec<f32>,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            agent_radius: 0.4,
            agent_height: 2.0,
            step_height: 0.3,
            search_radii: vec![0.5, 1.0, 2.0, 4.0],
        }
    }
}

/// Process-wide maze configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Fixed seed for reproducible rounds; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub dimensions: MazeDimensions,
    pub templates: StructuralTemplates,
    pub decorations: DecorationSettings,
    pub navigation: NavigationSettings,
}

impl MazeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, MazeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MazeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, MazeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fail fast when floor, wall or ceiling templates are missing.
    pub fn structural(&self) -> Result<StructuralSet<'_>, MazeError> {
        let t = &self.templates;
        Ok(StructuralSet {
            floor: t.floor.as_ref().ok_or(MazeError::MissingTemplate("floor"))?,
            wall: t.wall.as_ref().ok_or(MazeError::MissingTemplate("wall"))?,
            pillar: t.pillar.as_ref(),
            ceiling: t.ceiling.as_ref().ok_or(MazeError::MissingTemplate("ceiling"))?,
            lit_ceilings: &t.lit_ceilings,
        })
    }

    /// Catalog entries that have a template. Entries without one are
    /// dropped silently.
    pub fn resolve_catalog(&self) -> Vec<ResolvedDecoration> {
        self.decorations
            .catalog
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match &entry.template {
                Some(template) => Some(ResolvedDecoration {
                    index,
                    template: template.clone(),
                    probability: entry.probability.clamp(0.0, 1.0),
                    min_spacing: entry.min_spacing.max(0.0),
                }),
                None => {
                    log::debug!("Decoration #{} has no template, skipping", index);
                    None
                }
            })
            .collect()
    }
}

/// Per-round generation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub rows: usize,
    pub cols: usize,
    /// Percentage in `0..=100`.
    pub wall_probability: u8,
}

impl RoundConfig {
    pub fn new(rows: usize, cols: usize, wall_probability: u8) -> Self {
        Self {
            rows,
            cols,
            wall_probability,
        }
    }

    pub fn validate(&self) -> Result<(), MazeError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(MazeError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.wall_probability > 100 {
            return Err(MazeError::InvalidWallProbability(self.wall_probability));
        }
        Ok(())
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self::new(10, 10, 50)
    }
}
