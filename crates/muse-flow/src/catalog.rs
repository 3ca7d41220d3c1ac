//! Static content catalog for the survey's task blocks.

use std::path::Path;

use muse_core::ContentId;
use serde::{Deserialize, Serialize};

/// One text-headline task unit: a topic, a news brief and the AI example
/// headlines shown under the AI-exposed conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBrief {
    pub id: ContentId,
    /// Display category, e.g. "Science & Technology".
    pub category: String,
    pub brief: String,
    pub ai_examples: Vec<String>,
}

/// One image-caption task unit: an asset reference, a short title and the
/// AI example captions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePrompt {
    pub id: ContentId,
    /// Asset filename resolved against the configured assets root.
    pub asset: String,
    pub title: String,
    pub ai_examples: Vec<String>,
}

/// Warning emitted when a referenced image asset cannot be found. The flow
/// continues unblocked; the renderer surfaces the warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetWarning {
    pub asset: String,
}

/// Immutable catalog the assignment engine samples from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    text: Vec<TextBrief>,
    images: Vec<ImagePrompt>,
}

impl Catalog {
    /// Builds a catalog from explicit item lists.
    pub fn new(text: Vec<TextBrief>, images: Vec<ImagePrompt>) -> Self {
        Self { text, images }
    }

    /// All text briefs in catalog order.
    pub fn text_briefs(&self) -> &[TextBrief] {
        &self.text
    }

    /// All image prompts in catalog order.
    pub fn image_prompts(&self) -> &[ImagePrompt] {
        &self.images
    }

    /// Looks up a text brief by identifier.
    pub fn text_brief(&self, id: &ContentId) -> Option<&TextBrief> {
        self.text.iter().find(|item| &item.id == id)
    }

    /// Looks up an image prompt by identifier.
    pub fn image_prompt(&self, id: &ContentId) -> Option<&ImagePrompt> {
        self.images.iter().find(|item| &item.id == id)
    }

    /// Checks referenced assets under `root` and reports the missing ones.
    pub fn missing_assets(&self, root: &Path) -> Vec<AssetWarning> {
        self.images
            .iter()
            .filter(|item| !root.join(&item.asset).exists())
            .map(|item| AssetWarning {
                asset: item.asset.clone(),
            })
            .collect()
    }

    /// The canonical study content: three news briefs and eight image
    /// prompts.
    pub fn study_default() -> Self {
        let text = vec![
            TextBrief {
                id: ContentId::from_raw("science_technology"),
                category: "Science & Technology".to_string(),
                brief: "Researchers developed a new EV battery that charges in under five \
                        minutes, promising to revolutionize electric mobility."
                    .to_string(),
                ai_examples: vec![
                    "Breakthrough Battery Promises Ultra-Fast EV Charging".to_string(),
                    "Rapid-Charge EV Battery Could Transform Electric Mobility".to_string(),
                    "University Team Unveils Lightning-Fast EV Battery Tech".to_string(),
                ],
            },
            TextBrief {
                id: ContentId::from_raw("culture_sports"),
                category: "Culture & Sports".to_string(),
                brief: "A small rural town is hosting an international chess festival with \
                        players from 40 countries, bringing new life and pride to the community."
                    .to_string(),
                ai_examples: vec![
                    "Global Chess Festival Brings New Life to Rural Town".to_string(),
                    "Quiet Town Turns Global Hub for Chess Enthusiasts".to_string(),
                    "From Silence to Strategy: Chess Festival Transforms Local Community"
                        .to_string(),
                ],
            },
            TextBrief {
                id: ContentId::from_raw("health_wellness"),
                category: "Health & Wellness".to_string(),
                brief: "A new app claims it can detect stress by analyzing your voice. \
                        Developers say it can help track mental health in real time."
                    .to_string(),
                ai_examples: vec![
                    "AI Listens for Stress: App Tracks Mental Health Through Speech".to_string(),
                    "Can Your Voice Reveal Stress? New AI App Says Yes".to_string(),
                    "Smartphone App Uses AI to Measure Stress in Real Time".to_string(),
                ],
            },
        ];
        let images = vec![
            image(
                "image1",
                "image1.jpg",
                "Cooking caption ideas",
                &[
                    "Taste-testing: the most important step in every masterpiece.",
                    "Cooking is an art — tasting is quality control.",
                    "When in doubt, taste it out.",
                ],
            ),
            image(
                "image2",
                "image2.jpg",
                "1920s party scene captions",
                &[
                    "When the champagne hits before the Roaring Twenties end.",
                    "Pour decisions make the best memories.",
                ],
            ),
            image(
                "image3",
                "image3.jpg",
                "Photographers with cameras captions",
                &[
                    "Smile! You're making tomorrow's headlines.",
                    "Before smartphones, there were these warriors of the lens.",
                ],
            ),
            image(
                "image4",
                "image4.jpg",
                "3D movie reaction captions",
                &[
                    "When 3D movies were too real.",
                    "Immersive cinema before VR was even a dream.",
                ],
            ),
            image(
                "image5",
                "image5.jpg",
                "Bubble party captions",
                &[
                    "When the bubble gun steals the show.",
                    "POV: The party just hit its peak.",
                ],
            ),
            image(
                "image6",
                "image6.jpg",
                "Mountain hiking captions",
                &[
                    "Every trail leads to a story worth telling.",
                    "Adventure begins at the edge of your comfort zone.",
                ],
            ),
            image(
                "image7",
                "image7.jpg",
                "Brainstorming teamwork captions",
                &[
                    "Collaboration in action: where ideas come alive in color.",
                    "Teamwork is the art of turning many thoughts into one vision.",
                ],
            ),
            image(
                "image8",
                "image8.jpg",
                "Funny science classroom captions",
                &[
                    "When your financial plan is pure wizardry.",
                    "Inflation, but make it magical.",
                ],
            ),
        ];
        Self { text, images }
    }
}

fn image(id: &str, asset: &str, title: &str, examples: &[&str]) -> ImagePrompt {
    ImagePrompt {
        id: ContentId::from_raw(id),
        asset: asset.to_string(),
        title: title.to_string(),
        ai_examples: examples.iter().map(|s| s.to_string()).collect(),
    }
}
