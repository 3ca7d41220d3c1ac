//! Typed phase views consumed by the external form renderer.
//!
//! The renderer presents the ordered fields, displays the static content and
//! commits values back as [`Event::FieldChanged`](crate::session::Event)
//! events followed by an advance request. Nothing here mutates the session.

use std::path::Path;

use muse_core::{Condition, ContentId, ResponseValue};
use serde::{Deserialize, Serialize};

use crate::assign::RoundContent;
use crate::catalog::Catalog;
use crate::ledger::{caption_key, response_key, revision_key, slider_key, would_revise_key};
use crate::session::{BlockKind, Phase, Session};

/// Input field kinds the renderer knows how to present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    TextLine,
    TextArea,
    SingleChoice { options: Vec<String> },
    /// Bounded integer scale, fixed 1-5, default midpoint 3.
    Scale,
    Binary,
}

/// One typed input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
        }
    }
}

/// One text round as presented to the participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRoundView {
    pub round: usize,
    pub condition: Condition,
    pub category: String,
    pub brief: String,
    /// AI example headlines, present only when the condition exposes them
    /// (always for AI-first, after the one-way reveal for Human-first).
    pub ai_examples: Option<Vec<String>>,
    pub fields: Vec<FieldSpec>,
}

/// One image card within an image round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCard {
    pub asset: String,
    pub title: String,
    /// Set when the referenced asset is missing under the configured root;
    /// the renderer surfaces a warning and the flow continues.
    pub asset_missing: bool,
    pub ai_examples: Option<Vec<String>>,
    pub fields: Vec<FieldSpec>,
}

/// One image round: a pair of cards under a single condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRoundView {
    pub round: usize,
    pub condition: Condition,
    pub images: Vec<ImageCard>,
}

/// What the renderer shows for the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PhaseView {
    Intro,
    Demographics { fields: Vec<FieldSpec> },
    AiFamiliarity { fields: Vec<FieldSpec> },
    TextRound(TextRoundView),
    ImageRound(ImageRoundView),
    PostReflection { fields: Vec<FieldSpec> },
    Done,
}

/// Demographics page fields.
pub fn demographics_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new(
            "participant_id",
            "Participant ID (create any short code)",
            FieldKind::TextLine,
        ),
        FieldSpec::new("age", "Age", FieldKind::TextLine),
        FieldSpec::new(
            "gender",
            "Gender",
            FieldKind::SingleChoice {
                options: vec![
                    "Prefer not to say".to_string(),
                    "Female".to_string(),
                    "Male".to_string(),
                    "Other".to_string(),
                ],
            },
        ),
        FieldSpec::new("major", "Major or academic background", FieldKind::TextLine),
        FieldSpec::new("language", "Native language (optional)", FieldKind::TextLine),
        FieldSpec::new(
            "creative_exp",
            "Describe any prior creative work (writing, design, etc.)",
            FieldKind::TextArea,
        ),
    ]
}

/// AI familiarity Likert items (1-5 scale).
pub fn familiarity_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new(
            "ai_fam_regular_use",
            "I regularly use AI tools (ChatGPT, Grammarly, etc.) for creative or academic work.",
            FieldKind::Scale,
        ),
        FieldSpec::new(
            "ai_fam_confidence",
            "I feel confident evaluating AI-generated outputs.",
            FieldKind::Scale,
        ),
        FieldSpec::new(
            "ai_fam_helpfulness",
            "I find AI tools helpful for improving my writing or design ideas.",
            FieldKind::Scale,
        ),
        FieldSpec::new(
            "ai_fam_reliance",
            "I rely on AI suggestions more than my own ideas.",
            FieldKind::Scale,
        ),
        FieldSpec::new(
            "ai_fam_trust",
            "I trust AI systems to provide unbiased suggestions.",
            FieldKind::Scale,
        ),
    ]
}

/// Post-survey reflection items (1-5 scale).
pub fn reflection_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new(
            "overall_trust",
            "Overall, I trusted the AI suggestions.",
            FieldKind::Scale,
        ),
        FieldSpec::new(
            "overall_original",
            "Overall, my ideas felt original.",
            FieldKind::Scale,
        ),
        FieldSpec::new(
            "overall_fixation",
            "It was hard to think beyond the AI's ideas.",
            FieldKind::Scale,
        ),
    ]
}

/// Builds the view for the session's current phase.
pub fn phase_view(session: &Session) -> PhaseView {
    match session.phase() {
        Phase::Intro => PhaseView::Intro,
        Phase::Demographics => PhaseView::Demographics {
            fields: demographics_fields(),
        },
        Phase::AiFamiliarity => PhaseView::AiFamiliarity {
            fields: familiarity_fields(),
        },
        Phase::TextTasks => text_round_view(session),
        Phase::ImageTasks => image_round_view(session),
        Phase::PostReflection => PhaseView::PostReflection {
            fields: reflection_fields(),
        },
        Phase::Done => PhaseView::Done,
    }
}

fn examples_visible(condition: Condition, revealed: bool) -> bool {
    match condition {
        Condition::NoAi => false,
        Condition::AiFirst => true,
        Condition::HumanFirst => revealed,
    }
}

/// Appends the revision follow-up fields once the round's examples are
/// visible and the revision sub-flow applies to its condition.
fn push_revision_fields(
    session: &Session,
    base: &str,
    condition: Condition,
    visible: bool,
    fields: &mut Vec<FieldSpec>,
) {
    let active = match condition {
        Condition::HumanFirst => session.config().revise_after_human_first,
        Condition::AiFirst => session.config().revise_after_ai_first,
        Condition::NoAi => false,
    };
    if !active || !visible {
        return;
    }
    fields.push(FieldSpec::new(
        would_revise_key(base),
        "Would you like to revise your response after seeing the AI examples?",
        FieldKind::Binary,
    ));
    let wants_revision = matches!(
        session.ledger().get(&would_revise_key(base)),
        Some(ResponseValue::YesNo(true))
    );
    if wants_revision {
        fields.push(FieldSpec::new(
            revision_key(base),
            "Write your revised response:",
            FieldKind::TextArea,
        ));
    }
}

fn text_round_view(session: &Session) -> PhaseView {
    let Some(assignment) = session.current_assignment() else {
        return PhaseView::Done;
    };
    let RoundContent::Single(id) = &assignment.content else {
        return PhaseView::Done;
    };
    let Some(brief) = session.catalog().text_brief(id) else {
        return PhaseView::Done;
    };
    let revealed = session.is_revealed(BlockKind::Text, session.text_round());
    let visible = examples_visible(assignment.condition, revealed);
    let base = response_key(id.as_raw());
    let mut fields = vec![FieldSpec::new(
        base.clone(),
        "Write 3-5 headlines:",
        FieldKind::TextArea,
    )];
    push_revision_fields(session, &base, assignment.condition, visible, &mut fields);
    PhaseView::TextRound(TextRoundView {
        round: session.text_round(),
        condition: assignment.condition,
        category: brief.category.clone(),
        brief: brief.brief.clone(),
        ai_examples: visible.then(|| brief.ai_examples.clone()),
        fields,
    })
}

fn image_card(
    session: &Session,
    catalog: &Catalog,
    id: &ContentId,
    condition: Condition,
    visible: bool,
) -> Option<ImageCard> {
    let prompt = catalog.image_prompt(id)?;
    let asset_missing = match &session.config().assets_root {
        Some(root) => !Path::new(root).join(&prompt.asset).exists(),
        None => false,
    };
    let base = caption_key(&prompt.asset);
    let mut fields = vec![FieldSpec::new(
        base.clone(),
        "Write your own caption(s):",
        FieldKind::TextArea,
    )];
    push_revision_fields(session, &base, condition, visible, &mut fields);
    for (dimension, label) in [
        ("trust", "I trusted the AI suggestions."),
        ("original", "My ideas felt original."),
        ("fixation", "It was hard to think beyond the AI's ideas."),
    ] {
        fields.push(FieldSpec::new(
            slider_key(&prompt.asset, dimension),
            label,
            FieldKind::Scale,
        ));
    }
    Some(ImageCard {
        asset: prompt.asset.clone(),
        title: prompt.title.clone(),
        asset_missing,
        ai_examples: visible.then(|| prompt.ai_examples.clone()),
        fields,
    })
}

fn image_round_view(session: &Session) -> PhaseView {
    let Some(assignment) = session.current_assignment() else {
        return PhaseView::Done;
    };
    let revealed = session.is_revealed(BlockKind::Images, session.image_round());
    let visible = examples_visible(assignment.condition, revealed);
    let images = assignment
        .content
        .ids()
        .into_iter()
        .filter_map(|id| image_card(session, session.catalog(), id, assignment.condition, visible))
        .collect();
    PhaseView::ImageRound(ImageRoundView {
        round: session.image_round(),
        condition: assignment.condition,
        images,
    })
}
