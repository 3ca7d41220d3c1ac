//! Condition assignment and counterbalancing.
//!
//! Produces, once per block per session, a schedule binding each round to a
//! condition and to the content it operates on. Content is sampled without
//! replacement; a catalog smaller than the requested sample size is a fatal
//! configuration error, never silent repetition.

use muse_core::errors::{ErrorInfo, MuseError};
use muse_core::{Condition, ContentId, RngHandle};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// Counterbalancing policy for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AssignmentPolicy {
    /// Condition order and content-to-round pairing are shuffled
    /// independently.
    FullyRandomized,
    /// Condition sequence pinned to `[No-AI, AI-first, Human-first]`; only
    /// the content-to-round pairing is randomized. Isolates order effects
    /// from content effects.
    FixedOrder,
    /// One random condition applied uniformly to every round of the block.
    UniformSingle,
}

/// Content bound to a single round: one item for the text block, a pair for
/// the image block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoundContent {
    Single(ContentId),
    Pair(ContentId, ContentId),
}

impl RoundContent {
    /// Identifiers bound to the round, in slot order.
    pub fn ids(&self) -> Vec<&ContentId> {
        match self {
            RoundContent::Single(id) => vec![id],
            RoundContent::Pair(first, second) => vec![first, second],
        }
    }
}

/// One round's condition/content pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundAssignment {
    pub condition: Condition,
    pub content: RoundContent,
}

/// The counterbalancing schedule for one block. Assigned once per block per
/// session and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    rounds: Vec<RoundAssignment>,
}

impl Schedule {
    /// Number of rounds in the schedule.
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Whether the schedule holds no rounds.
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// The assignment for the given round index.
    pub fn round(&self, idx: usize) -> Option<&RoundAssignment> {
        self.rounds.get(idx)
    }

    /// Iterates over the assignments in round order.
    pub fn iter(&self) -> impl Iterator<Item = &RoundAssignment> {
        self.rounds.iter()
    }
}

/// Builds the condition sequence for `rounds` rounds under the policy.
fn condition_sequence(
    policy: AssignmentPolicy,
    rounds: usize,
    rng: &mut RngHandle,
) -> Vec<Condition> {
    match policy {
        AssignmentPolicy::FullyRandomized => {
            let mut order: Vec<Condition> = Condition::FIXED_ORDER
                .iter()
                .copied()
                .cycle()
                .take(rounds)
                .collect();
            order.shuffle(rng.inner_mut());
            order
        }
        AssignmentPolicy::FixedOrder => Condition::FIXED_ORDER
            .iter()
            .copied()
            .cycle()
            .take(rounds)
            .collect(),
        AssignmentPolicy::UniformSingle => {
            let pick = Condition::FIXED_ORDER[rng.inner_mut().gen_range(0..3)];
            vec![pick; rounds]
        }
    }
}

/// Samples `k` distinct indices from `available` items: shuffle the full
/// index range, keep the first `k`. Matches drawing without replacement and
/// keeps the shuffled order, which the image pairing depends on.
fn sample_indices(
    available: usize,
    k: usize,
    block: &str,
    rng: &mut RngHandle,
) -> Result<Vec<usize>, MuseError> {
    if available < k {
        return Err(MuseError::Config(
            ErrorInfo::new("catalog-short", "catalog smaller than requested sample size")
                .with_context("block", block)
                .with_context("available", available.to_string())
                .with_context("requested", k.to_string())
                .with_hint("add catalog items or lower rounds_per_block"),
        ));
    }
    let mut indices: Vec<usize> = (0..available).collect();
    indices.shuffle(rng.inner_mut());
    indices.truncate(k);
    Ok(indices)
}

/// Assigns the text block: `rounds` distinct briefs, one per round, paired
/// with the policy's condition sequence.
pub fn assign_text_block(
    catalog: &Catalog,
    policy: AssignmentPolicy,
    rounds: usize,
    rng: &mut RngHandle,
) -> Result<Schedule, MuseError> {
    let picked = sample_indices(catalog.text_briefs().len(), rounds, "text", rng)?;
    let conditions = condition_sequence(policy, rounds, rng);
    let assignments = picked
        .into_iter()
        .zip(conditions)
        .map(|(idx, condition)| RoundAssignment {
            condition,
            content: RoundContent::Single(catalog.text_briefs()[idx].id.clone()),
        })
        .collect();
    Ok(Schedule {
        rounds: assignments,
    })
}

/// Assigns the image block: `rounds * per_round` distinct prompts drawn in
/// one shuffle, then sliced into contiguous pairs.
///
/// The pairing is intentionally coupled to the shuffle permutation (pairs
/// are contiguous slices of a single shuffled draw, not independently
/// re-paired). This mirrors the original study procedure and must not be
/// replaced with independent per-pair shuffles.
pub fn assign_image_block(
    catalog: &Catalog,
    policy: AssignmentPolicy,
    rounds: usize,
    per_round: usize,
    rng: &mut RngHandle,
) -> Result<Schedule, MuseError> {
    if per_round == 0 || per_round > 2 {
        return Err(MuseError::Config(
            ErrorInfo::new("images-per-round", "images per round must be 1 or 2")
                .with_context("requested", per_round.to_string()),
        ));
    }
    let picked = sample_indices(
        catalog.image_prompts().len(),
        rounds * per_round,
        "images",
        rng,
    )?;
    let conditions = condition_sequence(policy, rounds, rng);
    let assignments = picked
        .chunks(per_round)
        .zip(conditions)
        .map(|(chunk, condition)| {
            let ids: Vec<ContentId> = chunk
                .iter()
                .map(|&idx| catalog.image_prompts()[idx].id.clone())
                .collect();
            let content = match ids.as_slice() {
                [only] => RoundContent::Single(only.clone()),
                _ => RoundContent::Pair(ids[0].clone(), ids[1].clone()),
            };
            RoundAssignment { condition, content }
        })
        .collect();
    Ok(Schedule {
        rounds: assignments,
    })
}
