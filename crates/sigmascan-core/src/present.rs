//! Presentation-boundary views.
//!
//! The pipeline carries undefined numbers as `None` end to end; this module
//! is the single place where they become displayable zeros. Chart widgets
//! consume these views verbatim, so nothing downstream has to reason about
//! NaN or null again.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analytics::{CorrelationMatrix, RiskScore};
use crate::{QuantityKind, Sensitivity, Symbol, ValidationError};

/// Which two quantity kinds the correlation heatmap cross-references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeatmapPane {
    VolumeVolume,
    AdjcloseAdjclose,
    AdjcloseVolume,
}

impl HeatmapPane {
    pub const ALL: [Self; 3] = [
        Self::VolumeVolume,
        Self::AdjcloseAdjclose,
        Self::AdjcloseVolume,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VolumeVolume => "volume-volume",
            Self::AdjcloseAdjclose => "adjclose-adjclose",
            Self::AdjcloseVolume => "adjclose-volume",
        }
    }

    pub const fn row_kind(self) -> QuantityKind {
        match self {
            Self::VolumeVolume => QuantityKind::Volume,
            Self::AdjcloseAdjclose | Self::AdjcloseVolume => QuantityKind::AdjClose,
        }
    }

    pub const fn column_kind(self) -> QuantityKind {
        match self {
            Self::VolumeVolume => QuantityKind::Volume,
            Self::AdjcloseAdjclose => QuantityKind::AdjClose,
            Self::AdjcloseVolume => QuantityKind::Volume,
        }
    }
}

impl Display for HeatmapPane {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeatmapPane {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "volume-volume" => Ok(Self::VolumeVolume),
            "adjclose-adjclose" => Ok(Self::AdjcloseAdjclose),
            "adjclose-volume" => Ok(Self::AdjcloseVolume),
            other => Err(ValidationError::InvalidHeatmapPane {
                value: other.to_owned(),
            }),
        }
    }
}

/// One heatmap pane: a rectangular slice of the correlation matrix with
/// undefined cells filled to 0.0 and the kind prefix stripped from tick
/// labels (the pane itself names the kinds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapView {
    pub pane: HeatmapPane,
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub cells: Vec<Vec<f64>>,
}

impl HeatmapView {
    pub fn from_matrix(matrix: &CorrelationMatrix, pane: HeatmapPane) -> Self {
        let row_indices = matrix.indices_of_kind(pane.row_kind());
        let column_indices = matrix.indices_of_kind(pane.column_kind());

        let symbol_label =
            |index: &usize| matrix.keys()[*index].symbol.as_str().to_owned();
        let row_labels = row_indices.iter().map(symbol_label).collect();
        let column_labels = column_indices.iter().map(symbol_label).collect();

        let cells = row_indices
            .iter()
            .map(|&row| {
                column_indices
                    .iter()
                    .map(|&column| matrix.cell(row, column).unwrap_or(0.0))
                    .collect()
            })
            .collect();

        Self {
            pane,
            row_labels,
            column_labels,
            cells,
        }
    }
}

/// Pie-style rows: each ticker's share label and its filled rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSlice {
    pub symbol: Symbol,
    pub rating: f64,
}

pub fn rating_chart(risk: &[RiskScore]) -> Vec<RatingSlice> {
    risk.iter()
        .map(|score| RatingSlice {
            symbol: score.symbol.clone(),
            rating: score.rating.unwrap_or(0.0),
        })
        .collect()
}

/// Bar-style rows with the sensitivity threshold as the reference line.
///
/// The bar value is the per-kind average (total over two kinds, halved) so
/// it shares a scale with the sensitivity line: a bar above the line means
/// the ticker's flagged days averaged beyond the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBar {
    pub symbol: Symbol,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBarView {
    pub bars: Vec<RiskBar>,
    pub threshold: f64,
}

pub fn risk_chart(risk: &[RiskScore], sensitivity: Sensitivity) -> RiskBarView {
    let bars = risk
        .iter()
        .map(|score| RiskBar {
            symbol: score.symbol.clone(),
            value: score.total_risk.map(|total| total / 2.0).unwrap_or(0.0),
        })
        .collect();
    RiskBarView {
        bars,
        threshold: sensitivity.value(),
    }
}
