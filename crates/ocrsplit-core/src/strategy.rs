//! Partition strategies

use serde::{Deserialize, Serialize};

use crate::normalize::{NEWSPAPER_COLUMN, SPATIAL_COLUMN};

/// How records are split into output files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    PerRow,
    PerMonth,
    PerYear,
    PerNewspaper,
    PerSpatial,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::PerRow,
        Strategy::PerMonth,
        Strategy::PerYear,
        Strategy::PerNewspaper,
        Strategy::PerSpatial,
    ];

    /// Human readable name, e.g. `Per Month`
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::PerRow => "Per Row",
            Strategy::PerMonth => "Per Month",
            Strategy::PerYear => "Per Year",
            Strategy::PerNewspaper => "Per Newspaper",
            Strategy::PerSpatial => "Per Spatial",
        }
    }

    /// Label lowercased with spaces replaced by underscores, e.g. `per_month`
    pub fn slug(&self) -> &'static str {
        match self {
            Strategy::PerRow => "per_row",
            Strategy::PerMonth => "per_month",
            Strategy::PerYear => "per_year",
            Strategy::PerNewspaper => "per_newspaper",
            Strategy::PerSpatial => "per_spatial",
        }
    }

    /// Conventional archive filename for this strategy
    pub fn archive_name(&self) -> String {
        format!("ocr_split_{}.zip", self.slug())
    }

    /// Optional column this strategy groups by, if any
    pub fn required_column(&self) -> Option<&'static str> {
        match self {
            Strategy::PerNewspaper => Some(NEWSPAPER_COLUMN),
            Strategy::PerSpatial => Some(SPATIAL_COLUMN),
            _ => None,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        let short = normalized.strip_prefix("per_").unwrap_or(&normalized);
        match short {
            "row" => Ok(Strategy::PerRow),
            "month" => Ok(Strategy::PerMonth),
            "year" => Ok(Strategy::PerYear),
            "newspaper" => Ok(Strategy::PerNewspaper),
            "spatial" => Ok(Strategy::PerSpatial),
            _ => Err(format!(
                "Unsupported strategy: {}. Supported: per_row, per_month, per_year, per_newspaper, per_spatial",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("per_row".parse::<Strategy>().unwrap(), Strategy::PerRow);
        assert_eq!("Per Month".parse::<Strategy>().unwrap(), Strategy::PerMonth);
        assert_eq!("year".parse::<Strategy>().unwrap(), Strategy::PerYear);
        assert_eq!(
            "PER-NEWSPAPER".parse::<Strategy>().unwrap(),
            Strategy::PerNewspaper
        );
        assert_eq!("spatial".parse::<Strategy>().unwrap(), Strategy::PerSpatial);
        assert!("per_week".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_slug_matches_label() {
        for strategy in Strategy::ALL {
            assert_eq!(
                strategy.slug(),
                strategy.label().to_lowercase().replace(' ', "_")
            );
            assert_eq!(strategy.slug().parse::<Strategy>().unwrap(), strategy);
            assert_eq!(strategy.label().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_archive_name() {
        assert_eq!(Strategy::PerRow.archive_name(), "ocr_split_per_row.zip");
        assert_eq!(
            Strategy::PerSpatial.archive_name(),
            "ocr_split_per_spatial.zip"
        );
    }

    #[test]
    fn test_required_columns() {
        assert_eq!(Strategy::PerNewspaper.required_column(), Some("newspaper"));
        assert_eq!(Strategy::PerSpatial.required_column(), Some("spatial"));
        assert_eq!(Strategy::PerMonth.required_column(), None);
    }
}
