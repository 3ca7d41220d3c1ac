//! Session state machine.
//!
//! One [`Session`] per participant run. The machine progresses strictly
//! forward through the survey phases; `TextTasks` and `ImageTasks` are
//! composite states whose internal round counter must reach the configured
//! bound before the outer transition fires. All mutation goes through
//! [`Session::apply`], an explicit `(Session, Event) -> outcome` reducer, so
//! there are no ambient globals and the transition function is directly
//! testable.

use std::collections::BTreeSet;

use muse_core::errors::{ErrorInfo, MuseError};
use muse_core::{derive_substream_seed, Condition, ResponseValue, RngHandle};
use muse_core::{SUBSTREAM_IMAGES, SUBSTREAM_TEXT};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::assign::{assign_image_block, assign_text_block, RoundAssignment, Schedule};
use crate::catalog::Catalog;
use crate::config::{KeyScheme, SurveyConfig};
use crate::ledger::{caption_key, response_key, revision_key, would_revise_key, Ledger};
use crate::view;

/// Survey phases in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Intro,
    Demographics,
    AiFamiliarity,
    TextTasks,
    ImageTasks,
    PostReflection,
    Done,
}

/// The two composite task blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    Images,
}

/// Input events accepted by the reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// The renderer committed a field value.
    FieldChanged { key: String, value: ResponseValue },
    /// The participant pressed the advance control.
    AdvanceRequested,
}

/// Participant-visible notices emitted by a step. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    /// A required free-text field is empty; the transition was refused.
    ValidationRequired { field: String },
    /// The survey reached its terminal state.
    Completed,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StepOutcome {
    /// Whether the phase or round counter moved forward.
    pub advanced: bool,
    pub notices: Vec<Notice>,
}

impl StepOutcome {
    fn advanced() -> Self {
        Self {
            advanced: true,
            notices: Vec::new(),
        }
    }

    fn refused(notice: Notice) -> Self {
        Self {
            advanced: false,
            notices: vec![notice],
        }
    }
}

/// One participant's survey run.
#[derive(Debug, Clone)]
pub struct Session {
    config: SurveyConfig,
    catalog: Catalog,
    rng: RngHandle,
    phase: Phase,
    text_round: usize,
    image_round: usize,
    text_schedule: Option<Schedule>,
    image_schedule: Option<Schedule>,
    revealed: BTreeSet<(BlockKind, usize)>,
    ledger: Ledger,
}

impl Session {
    /// Creates a fresh session. Catalog capacity is validated here, before
    /// any participant is admitted: a catalog smaller than the configured
    /// sample sizes is a fatal configuration error.
    pub fn new(config: SurveyConfig, catalog: Catalog) -> Result<Self, MuseError> {
        let rounds = config.rounds_per_block;
        if rounds == 0 {
            return Err(MuseError::Config(
                ErrorInfo::new("rounds-per-block", "rounds per block must be at least 1")
                    .with_context("requested", rounds.to_string()),
            ));
        }
        if config.images_per_round == 0 || config.images_per_round > 2 {
            return Err(MuseError::Config(
                ErrorInfo::new("images-per-round", "images per round must be 1 or 2")
                    .with_context("requested", config.images_per_round.to_string()),
            ));
        }
        if catalog.text_briefs().len() < rounds {
            return Err(MuseError::Config(
                ErrorInfo::new("catalog-short", "not enough text briefs for the block")
                    .with_context("available", catalog.text_briefs().len().to_string())
                    .with_context("requested", rounds.to_string()),
            ));
        }
        let image_draw = rounds * config.images_per_round;
        if catalog.image_prompts().len() < image_draw {
            return Err(MuseError::Config(
                ErrorInfo::new("catalog-short", "not enough image prompts for the block")
                    .with_context("available", catalog.image_prompts().len().to_string())
                    .with_context("requested", image_draw.to_string()),
            ));
        }
        let rng = match config.seed {
            Some(seed) => RngHandle::from_seed(seed),
            None => RngHandle::from_entropy(),
        };
        Ok(Self {
            config,
            catalog,
            rng,
            phase: Phase::Intro,
            text_round: 0,
            image_round: 0,
            text_schedule: None,
            image_schedule: None,
            revealed: BTreeSet::new(),
            ledger: Ledger::new(),
        })
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Round counter within the text block.
    pub fn text_round(&self) -> usize {
        self.text_round
    }

    /// Round counter within the image block.
    pub fn image_round(&self) -> usize {
        self.image_round
    }

    /// The memoized text-block schedule, present once the block is entered.
    pub fn text_schedule(&self) -> Option<&Schedule> {
        self.text_schedule.as_ref()
    }

    /// The memoized image-block schedule, present once the block is entered.
    pub fn image_schedule(&self) -> Option<&Schedule> {
        self.image_schedule.as_ref()
    }

    /// Read access to the accumulated ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The survey configuration the session runs under.
    pub fn config(&self) -> &SurveyConfig {
        &self.config
    }

    /// The content catalog the session samples from.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Whether the AI examples have been revealed for the given block round.
    /// The reveal is one-way within a round.
    pub fn is_revealed(&self, block: BlockKind, round: usize) -> bool {
        self.revealed.contains(&(block, round))
    }

    /// The assignment governing the current round, if a block is active.
    pub fn current_assignment(&self) -> Option<&RoundAssignment> {
        match self.phase {
            Phase::TextTasks => self.text_schedule.as_ref()?.round(self.text_round),
            Phase::ImageTasks => self.image_schedule.as_ref()?.round(self.image_round),
            _ => None,
        }
    }

    /// The typed view the external form renderer presents for the current
    /// phase.
    pub fn view(&self) -> view::PhaseView {
        view::phase_view(self)
    }

    /// Applies one event to the session. The only entry point for mutation;
    /// a `Done` session ignores events entirely.
    pub fn apply(&mut self, event: Event) -> Result<StepOutcome, MuseError> {
        if self.phase == Phase::Done {
            return Ok(StepOutcome::default());
        }
        match event {
            Event::FieldChanged { key, value } => self.field_changed(key, value),
            Event::AdvanceRequested => self.advance(),
        }
    }

    fn field_changed(&mut self, key: String, value: ResponseValue) -> Result<StepOutcome, MuseError> {
        let stored = self.apply_key_scheme(&key, value);
        let non_blank = !stored.is_blank_text();
        self.ledger.write(key.clone(), stored)?;
        if non_blank {
            self.maybe_reveal(&key);
        }
        Ok(StepOutcome::default())
    }

    /// Under the content-prefixed scheme the primary response fields store
    /// the content's display name ahead of the participant text.
    fn apply_key_scheme(&self, key: &str, value: ResponseValue) -> ResponseValue {
        if self.config.key_scheme != KeyScheme::ContentPrefixed {
            return value;
        }
        let text = match &value {
            ResponseValue::Text(text) if !text.trim().is_empty() => text,
            _ => return value,
        };
        match self.current_display_name_for(key) {
            Some(name) => ResponseValue::Text(format!("{name} — {text}")),
            None => value,
        }
    }

    fn current_display_name_for(&self, key: &str) -> Option<String> {
        let assignment = self.current_assignment()?;
        for id in assignment.content.ids() {
            if let Some(brief) = self.catalog.text_brief(id) {
                if response_key(id.as_raw()) == key {
                    return Some(brief.category.clone());
                }
            }
            if let Some(prompt) = self.catalog.image_prompt(id) {
                if caption_key(&prompt.asset) == key {
                    return Some(prompt.title.clone());
                }
            }
        }
        None
    }

    /// Marks the Human-first reveal for the current round once its primary
    /// response turns non-blank. One-way: never cleared within the round.
    fn maybe_reveal(&mut self, key: &str) {
        let (block, round) = match self.phase {
            Phase::TextTasks => (BlockKind::Text, self.text_round),
            Phase::ImageTasks => (BlockKind::Images, self.image_round),
            _ => return,
        };
        let Some(assignment) = self.current_assignment() else {
            return;
        };
        if assignment.condition != Condition::HumanFirst {
            return;
        }
        if self.required_keys(assignment).iter().any(|k| k == key) {
            self.revealed.insert((block, round));
        }
    }

    /// Primary free-text keys the round's guard checks.
    fn required_keys(&self, assignment: &RoundAssignment) -> Vec<String> {
        assignment
            .content
            .ids()
            .into_iter()
            .map(|id| {
                if let Some(prompt) = self.catalog.image_prompt(id) {
                    caption_key(&prompt.asset)
                } else {
                    response_key(id.as_raw())
                }
            })
            .collect()
    }

    /// Whether the round's revision sub-flow is active for its condition.
    fn revision_active(&self, condition: Condition) -> bool {
        match condition {
            Condition::HumanFirst => self.config.revise_after_human_first,
            Condition::AiFirst => self.config.revise_after_ai_first,
            Condition::NoAi => false,
        }
    }

    /// Validates the current round. Returns the refusing notice, if any.
    fn round_guard(&self) -> Option<Notice> {
        let assignment = self.current_assignment()?;
        for key in self.required_keys(assignment) {
            if self.ledger.is_blank(&key) {
                return Some(Notice::ValidationRequired { field: key });
            }
        }
        if self.revision_active(assignment.condition) {
            for base in self.required_keys(assignment) {
                let wants_revision =
                    matches!(self.ledger.get(&would_revise_key(&base)), Some(ResponseValue::YesNo(true)));
                if wants_revision && self.ledger.is_blank(&revision_key(&base)) {
                    return Some(Notice::ValidationRequired {
                        field: revision_key(&base),
                    });
                }
            }
        }
        None
    }

    fn advance(&mut self) -> Result<StepOutcome, MuseError> {
        match self.phase {
            Phase::Intro => {
                self.phase = Phase::Demographics;
                Ok(StepOutcome::advanced())
            }
            Phase::Demographics => {
                self.ledger.stamp_start();
                self.phase = Phase::AiFamiliarity;
                Ok(StepOutcome::advanced())
            }
            Phase::AiFamiliarity => {
                self.fill_scale_defaults(&view::familiarity_fields())?;
                self.enter_text_block()?;
                Ok(StepOutcome::advanced())
            }
            Phase::TextTasks => {
                if let Some(notice) = self.round_guard() {
                    return Ok(StepOutcome::refused(notice));
                }
                self.text_round += 1;
                if self.text_round >= self.config.rounds_per_block {
                    self.enter_image_block()?;
                }
                Ok(StepOutcome::advanced())
            }
            Phase::ImageTasks => {
                if let Some(notice) = self.round_guard() {
                    return Ok(StepOutcome::refused(notice));
                }
                self.fill_image_slider_defaults()?;
                self.image_round += 1;
                if self.image_round >= self.config.rounds_per_block {
                    self.phase = Phase::PostReflection;
                }
                Ok(StepOutcome::advanced())
            }
            Phase::PostReflection => {
                self.fill_scale_defaults(&view::reflection_fields())?;
                self.ledger.stamp_end();
                self.phase = Phase::Done;
                Ok(StepOutcome {
                    advanced: true,
                    notices: vec![Notice::Completed],
                })
            }
            Phase::Done => Ok(StepOutcome::default()),
        }
    }

    /// Entering a block resets its round counter and clears any previously
    /// memoized schedule, guaranteeing a fresh counterbalancing draw per
    /// session traversal.
    fn enter_text_block(&mut self) -> Result<(), MuseError> {
        self.text_round = 0;
        self.text_schedule = None;
        let mut rng = self.block_rng(SUBSTREAM_TEXT);
        self.text_schedule = Some(assign_text_block(
            &self.catalog,
            self.config.text_policy,
            self.config.rounds_per_block,
            &mut rng,
        )?);
        self.phase = Phase::TextTasks;
        Ok(())
    }

    fn enter_image_block(&mut self) -> Result<(), MuseError> {
        self.image_round = 0;
        self.image_schedule = None;
        let mut rng = self.block_rng(SUBSTREAM_IMAGES);
        self.image_schedule = Some(assign_image_block(
            &self.catalog,
            self.config.image_policy,
            self.config.rounds_per_block,
            self.config.images_per_round,
            &mut rng,
        )?);
        self.phase = Phase::ImageTasks;
        Ok(())
    }

    /// Seeded sessions derive one substream per block so the two draws are
    /// independent; entropy sessions split off the session stream.
    fn block_rng(&mut self, substream: u64) -> RngHandle {
        match self.config.seed {
            Some(seed) => RngHandle::from_seed(derive_substream_seed(seed, substream)),
            None => RngHandle::from_seed(self.rng.next_u64()),
        }
    }

    /// Scale fields commit their midpoint default when left untouched,
    /// matching what the form renderer displays.
    fn fill_scale_defaults(&mut self, fields: &[view::FieldSpec]) -> Result<(), MuseError> {
        for field in fields {
            if matches!(field.kind, view::FieldKind::Scale) && self.ledger.get(&field.key).is_none()
            {
                self.ledger.write(
                    field.key.clone(),
                    ResponseValue::Scale(ResponseValue::SCALE_DEFAULT),
                )?;
            }
        }
        Ok(())
    }

    fn fill_image_slider_defaults(&mut self) -> Result<(), MuseError> {
        let Some(assignment) = self.current_assignment() else {
            return Ok(());
        };
        let mut keys = Vec::new();
        for id in assignment.content.ids() {
            if let Some(prompt) = self.catalog.image_prompt(id) {
                for dimension in ["trust", "original", "fixation"] {
                    keys.push(crate::ledger::slider_key(&prompt.asset, dimension));
                }
            }
        }
        for key in keys {
            if self.ledger.get(&key).is_none() {
                self.ledger
                    .write(key, ResponseValue::Scale(ResponseValue::SCALE_DEFAULT))?;
            }
        }
        Ok(())
    }
}
