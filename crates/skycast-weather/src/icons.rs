use serde::{Deserialize, Serialize};

/// Display asset for the main weather icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconAsset {
    Sunny,
    Cloud,
    Rain,
    Storm,
    Snowflake,
}

impl IconAsset {
    /// Asset identifier the view loads
    pub fn asset_id(&self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloud => "cloud",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Snowflake => "snowflake",
        }
    }
}

/// Provider icon codes with a dedicated asset. Night variants mostly fall
/// back to the cloud.
const ICON_TABLE: &[(&str, IconAsset)] = &[
    ("01d", IconAsset::Sunny),
    ("02d", IconAsset::Cloud),
    ("03d", IconAsset::Cloud),
    ("04d", IconAsset::Cloud),
    ("04n", IconAsset::Cloud),
    ("10d", IconAsset::Rain),
    ("11d", IconAsset::Storm),
    ("13d", IconAsset::Snowflake),
    ("01n", IconAsset::Cloud),
    ("02n", IconAsset::Cloud),
    ("03n", IconAsset::Cloud),
    ("10n", IconAsset::Cloud),
    ("11n", IconAsset::Rain),
    ("13n", IconAsset::Snowflake),
];

/// Look up the asset for a provider icon code.
pub fn icon_for(code: &str) -> Option<IconAsset> {
    ICON_TABLE
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, asset)| *asset)
}

/// Icon to display after receiving `code`; unknown codes keep `current`.
pub fn next_icon(current: Option<IconAsset>, code: &str) -> Option<IconAsset> {
    icon_for(code).or(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_known_codes() {
        let expected = [
            ("01d", "sunny"),
            ("02d", "cloud"),
            ("03d", "cloud"),
            ("04d", "cloud"),
            ("04n", "cloud"),
            ("10d", "rain"),
            ("11d", "storm"),
            ("13d", "snowflake"),
            ("01n", "cloud"),
            ("02n", "cloud"),
            ("03n", "cloud"),
            ("10n", "cloud"),
            ("11n", "rain"),
            ("13n", "snowflake"),
        ];

        assert_eq!(ICON_TABLE.len(), expected.len());
        for (code, asset) in expected {
            assert_eq!(icon_for(code).map(|a| a.asset_id()), Some(asset), "code {code}");
        }
    }

    #[test]
    fn test_unknown_code_has_no_asset() {
        assert_eq!(icon_for("50d"), None);
        assert_eq!(icon_for("09n"), None);
        assert_eq!(icon_for(""), None);
    }

    #[test]
    fn test_unknown_code_keeps_current_icon() {
        assert_eq!(next_icon(Some(IconAsset::Storm), "50d"), Some(IconAsset::Storm));
        assert_eq!(next_icon(None, "50d"), None);
    }

    #[test]
    fn test_known_code_replaces_current_icon() {
        assert_eq!(next_icon(Some(IconAsset::Storm), "01d"), Some(IconAsset::Sunny));
    }
}
