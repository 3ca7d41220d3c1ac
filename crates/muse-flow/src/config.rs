use std::path::PathBuf;

use muse_core::errors::{ErrorInfo, MuseError};
use serde::{Deserialize, Serialize};

use crate::assign::AssignmentPolicy;

/// Scheme controlling how round responses are stored in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum KeyScheme {
    /// The raw response text is stored as-is.
    #[default]
    Plain,
    /// The response is prefixed with the content's display name, e.g.
    /// `"Science & Technology — Fast Charge Wins"`.
    ContentPrefixed,
}

/// Survey-level configuration. `Default` reproduces the canonical study
/// design: fixed-order counterbalancing for the text block, one uniform
/// random condition for the image block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(default = "SurveyConfig::default_text_policy")]
    pub text_policy: AssignmentPolicy,
    #[serde(default = "SurveyConfig::default_image_policy")]
    pub image_policy: AssignmentPolicy,
    #[serde(default = "SurveyConfig::default_rounds")]
    pub rounds_per_block: usize,
    #[serde(default = "SurveyConfig::default_images_per_round")]
    pub images_per_round: usize,
    #[serde(default)]
    pub key_scheme: KeyScheme,
    /// Prompt the "would you revise" follow-up after the Human-first reveal.
    #[serde(default = "SurveyConfig::default_true")]
    pub revise_after_human_first: bool,
    /// Unresolved in the study design whether revision should also apply
    /// to AI-first rounds; kept behind a flag rather than an assumption.
    #[serde(default)]
    pub revise_after_ai_first: bool,
    /// Fixed master seed. `None` draws from OS entropy, so assignments are
    /// not reproducible run to run.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Directory image assets are resolved against; missing assets degrade
    /// to a warning, never block the flow.
    #[serde(default)]
    pub assets_root: Option<PathBuf>,
}

impl SurveyConfig {
    fn default_text_policy() -> AssignmentPolicy {
        AssignmentPolicy::FixedOrder
    }

    fn default_image_policy() -> AssignmentPolicy {
        AssignmentPolicy::UniformSingle
    }

    const fn default_rounds() -> usize {
        muse_core::ROUNDS_PER_BLOCK
    }

    const fn default_images_per_round() -> usize {
        2
    }

    const fn default_true() -> bool {
        true
    }

    /// Parses a configuration from YAML bytes.
    pub fn from_yaml_slice(bytes: &[u8]) -> Result<Self, MuseError> {
        serde_yaml::from_slice(bytes).map_err(|err| {
            MuseError::Config(
                ErrorInfo::new("config-parse", "failed to parse survey configuration")
                    .with_hint(err.to_string()),
            )
        })
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            text_policy: Self::default_text_policy(),
            image_policy: Self::default_image_policy(),
            rounds_per_block: Self::default_rounds(),
            images_per_round: Self::default_images_per_round(),
            key_scheme: KeyScheme::default(),
            revise_after_human_first: Self::default_true(),
            revise_after_ai_first: false,
            seed: None,
            assets_root: None,
        }
    }
}
