//! Layout engine configuration
//!
//! Settings are plain serde structs so hosts can ship them as JSON next to
//! their other preferences.

use crate::{LayoutError, Result};
use serde::{Deserialize, Serialize};
use widget_tree::{Insets, Spacing};

/// Configuration for the layout engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Padding given to newly created containers
    pub default_padding: Insets,
    /// Spacing given to newly created containers
    pub default_spacing: Spacing,
    /// Whether new containers use bottom-up vertical coordinates
    pub flipped_by_default: bool,
    /// Extra passes allowed for requests raised during an arrangement pass
    pub max_followup_passes: usize,
    /// Reuse natural sizes measured for the same available size
    pub measure_cache_enabled: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_padding: Insets::ZERO,
            default_spacing: Spacing::ZERO,
            flipped_by_default: false,
            max_followup_passes: 1,
            measure_cache_enabled: true,
        }
    }
}

impl LayoutConfig {
    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.default_padding = padding;
        self
    }

    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.default_spacing = spacing;
        self
    }

    pub fn flipped(mut self) -> Self {
        self.flipped_by_default = true;
        self
    }

    pub fn with_max_followup_passes(mut self, passes: usize) -> Self {
        self.max_followup_passes = passes;
        self
    }

    pub fn without_measure_cache(mut self) -> Self {
        self.measure_cache_enabled = false;
        self
    }

    /// Reject negative or non-finite insets and gaps
    pub fn validate(&self) -> Result<()> {
        let padding = self.default_padding;
        if !padding.is_non_negative()
            || !(padding.horizontal() + padding.vertical()).is_finite()
        {
            return Err(LayoutError::InvalidConfig(format!(
                "padding must be finite and non-negative, got {:?}",
                padding
            )));
        }

        let spacing = self.default_spacing;
        if !(spacing.horizontal >= 0.0 && spacing.vertical >= 0.0)
            || !(spacing.horizontal + spacing.vertical).is_finite()
        {
            return Err(LayoutError::InvalidConfig(format!(
                "spacing must be finite and non-negative, got {:?}",
                spacing
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
