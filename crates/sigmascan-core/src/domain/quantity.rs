use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// The two measured quantities the pipeline tracks per ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    AdjClose,
    Volume,
}

impl QuantityKind {
    pub const ALL: [Self; 2] = [Self::AdjClose, Self::Volume];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AdjClose => "adj_close",
            Self::Volume => "volume",
        }
    }

    /// Axis label prefix used for correlation row/column keys,
    /// e.g. `"Volume Anomaly NVDA"`.
    pub const fn axis_label(self) -> &'static str {
        match self {
            Self::AdjClose => "Adj Close Anomaly",
            Self::Volume => "Volume Anomaly",
        }
    }
}

impl Display for QuantityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuantityKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "adj_close" | "adjclose" => Ok(Self::AdjClose),
            "volume" => Ok(Self::Volume),
            other => Err(ValidationError::InvalidQuantityKind {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quantity_kind() {
        let kind = QuantityKind::from_str("adj_close").expect("must parse");
        assert_eq!(kind, QuantityKind::AdjClose);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = QuantityKind::from_str("open").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidQuantityKind { .. }));
    }

    #[test]
    fn axis_labels_match_presentation_contract() {
        assert_eq!(QuantityKind::AdjClose.axis_label(), "Adj Close Anomaly");
        assert_eq!(QuantityKind::Volume.axis_label(), "Volume Anomaly");
    }
}
