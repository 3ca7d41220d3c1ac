//! Session flow, condition assignment and response ledger for the MUSE
//! survey engine.

mod assign;
mod catalog;
mod config;
mod ledger;
mod session;
mod view;

pub use assign::{
    assign_image_block, assign_text_block, AssignmentPolicy, RoundAssignment, RoundContent,
    Schedule,
};
pub use catalog::{AssetWarning, Catalog, ImagePrompt, TextBrief};
pub use config::{KeyScheme, SurveyConfig};
pub use ledger::{
    caption_key, response_key, revision_key, slider_key, would_revise_key, Ledger, ResponseRecord,
    KEY_TIMESTAMP_END, KEY_TIMESTAMP_START,
};
pub use session::{BlockKind, Event, Notice, Phase, Session, StepOutcome};
pub use view::{
    demographics_fields, familiarity_fields, phase_view, reflection_fields, FieldKind, FieldSpec,
    ImageCard, ImageRoundView, PhaseView, TextRoundView,
};
