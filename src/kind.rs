// Chart kinds and their field contracts

use crate::descriptor::ChartDescriptor;
use serde::Serialize;
use std::fmt;

/// The eight supported chart kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChartKind {
    Bar,
    HorizontalBar,
    Line,
    Pie,
    Donut,
    AreaBarCombo,
    Treemap,
    Radar,
}

/// Required role a descriptor must fill for a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldRole {
    CategoryColumn,
    ValueColumn,
    GroupColumn,
    SingleValueColumn,
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldRole::CategoryColumn => "categoryColumn",
            FieldRole::ValueColumn => "valueColumns[0]",
            FieldRole::GroupColumn => "groupColumn",
            FieldRole::SingleValueColumn => "singleValueColumn",
        };
        write!(f, "{}", name)
    }
}

/// Column keys a rendering strategy draws from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    /// Category / name key
    pub category: String,
    /// Primary numeric key
    pub value: String,
    /// Optional second series (area+bar combo, radar)
    pub secondary: Option<String>,
}

/// Kind-specific layout parameters handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Layout {
    Cartesian {
        horizontal: bool,
        /// Tick labels are rotated once the category count exceeds this
        rotate_labels_above: Option<usize>,
        /// Reserved width of the category axis, in pixels
        label_area: u32,
    },
    Circular {
        inner_radius: f64,
        outer_radius: f64,
    },
    Polar {
        /// Outer radius as a fraction of the half panel size
        outer_radius_ratio: f64,
    },
    Tiled {
        aspect_ratio: f64,
    },
}

impl ChartKind {
    pub const ALL: [ChartKind; 8] = [
        ChartKind::Bar,
        ChartKind::HorizontalBar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Donut,
        ChartKind::AreaBarCombo,
        ChartKind::Treemap,
        ChartKind::Radar,
    ];

    /// Resolve a descriptor tag. Case-insensitive, surrounding whitespace ignored.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag.trim().to_ascii_uppercase().as_str() {
            "BAR" => ChartKind::Bar,
            "HORIZONTAL_BAR" => ChartKind::HorizontalBar,
            "LINE" => ChartKind::Line,
            "PIE" => ChartKind::Pie,
            "DONUT" => ChartKind::Donut,
            "AREA_BAR_COMBO" => ChartKind::AreaBarCombo,
            "TREEMAP" => ChartKind::Treemap,
            "RADAR" => ChartKind::Radar,
            _ => return None,
        };
        Some(kind)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ChartKind::Bar => "BAR",
            ChartKind::HorizontalBar => "HORIZONTAL_BAR",
            ChartKind::Line => "LINE",
            ChartKind::Pie => "PIE",
            ChartKind::Donut => "DONUT",
            ChartKind::AreaBarCombo => "AREA_BAR_COMBO",
            ChartKind::Treemap => "TREEMAP",
            ChartKind::Radar => "RADAR",
        }
    }

    /// Maximum number of categories shown before top-N reduction.
    /// `None` for kinds that are never truncated (series and hierarchies).
    pub fn display_limit(&self) -> Option<usize> {
        match self {
            ChartKind::Bar | ChartKind::HorizontalBar => Some(10),
            ChartKind::Pie | ChartKind::Donut | ChartKind::Radar => Some(5),
            ChartKind::Line | ChartKind::AreaBarCombo | ChartKind::Treemap => None,
        }
    }

    /// Kinds keyed by a group column with a single value column
    fn is_grouped(&self) -> bool {
        matches!(self, ChartKind::Donut | ChartKind::Treemap)
    }

    /// Resolve the columns this kind draws from, or the first required role left unfilled
    pub fn resolve_fields(&self, descriptor: &ChartDescriptor) -> Result<FieldMapping, FieldRole> {
        if self.is_grouped() {
            let category = descriptor.group_column.clone().ok_or(FieldRole::GroupColumn)?;
            let value = descriptor
                .single_value_column
                .clone()
                .ok_or(FieldRole::SingleValueColumn)?;
            return Ok(FieldMapping {
                category,
                value,
                secondary: None,
            });
        }

        let category = descriptor
            .category_column
            .clone()
            .ok_or(FieldRole::CategoryColumn)?;

        let value = match self {
            ChartKind::Pie => descriptor
                .primary_value()
                .map(str::to_string)
                .or_else(|| descriptor.single_value_column.clone()),
            _ => descriptor.primary_value().map(str::to_string),
        }
        .ok_or(FieldRole::ValueColumn)?;

        let secondary = match self {
            ChartKind::AreaBarCombo | ChartKind::Radar => descriptor.value_columns.get(1).cloned(),
            _ => None,
        };

        Ok(FieldMapping {
            category,
            value,
            secondary,
        })
    }

    pub fn layout(&self) -> Layout {
        match self {
            ChartKind::Bar => Layout::Cartesian {
                horizontal: false,
                rotate_labels_above: Some(3),
                label_area: 40,
            },
            ChartKind::HorizontalBar => Layout::Cartesian {
                horizontal: true,
                rotate_labels_above: None,
                label_area: 80,
            },
            ChartKind::Line | ChartKind::AreaBarCombo => Layout::Cartesian {
                horizontal: false,
                rotate_labels_above: None,
                label_area: 40,
            },
            ChartKind::Pie => Layout::Circular {
                inner_radius: 0.0,
                outer_radius: 80.0,
            },
            ChartKind::Donut => Layout::Circular {
                inner_radius: 60.0,
                outer_radius: 100.0,
            },
            ChartKind::Treemap => Layout::Tiled {
                aspect_ratio: 4.0 / 3.0,
            },
            ChartKind::Radar => Layout::Polar {
                outer_radius_ratio: 0.8,
            },
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
