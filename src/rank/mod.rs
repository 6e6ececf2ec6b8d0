//! Cross-experiment ranking.
//!
//! Two passes over the data:
//!
//! 1. per experiment: flagged rows → [`anchors`] → [`distance`] samples;
//!    experiments share no state.
//! 2. per compound: [`collect`] the samples, [`outlier`] screening,
//!    [`consensus`]; each compound is handled on its own.
//!
//! [`ranker`] then orders the compounds and cuts the report at `top_k`.

pub mod anchors;
pub mod collect;
pub mod consensus;
pub mod distance;
pub mod outlier;
pub mod ranker;

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::RankConfig;
use crate::data::filter::{regulation_counts, select_flagged};
use crate::data::model::{ExperimentTable, MetadataIndex};
use crate::error::RankError;

use anchors::{Anchors, compute_anchors};
use collect::{CompoundSamples, ExperimentDistance, collect_by_compound};
use distance::{DistanceSample, compute_distances};
use ranker::{RankedCompound, rank_profiles};

// ---------------------------------------------------------------------------
// Pass 1: per experiment
// ---------------------------------------------------------------------------

/// What one experiment contributed to the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentSummary {
    pub experiment_id: String,
    pub rows: usize,
    pub flagged: usize,
    /// Flagged rows rejected for an invalid p-value or fold change.
    pub invalid: usize,
    pub up: usize,
    pub down: usize,
    pub anchors: Option<Anchors>,
    pub samples: usize,
}

/// Anchors and distance samples of a single experiment.
pub fn score_experiment(experiment: &ExperimentTable, config: &RankConfig) -> (ExperimentSummary, Vec<DistanceSample>) {
    let id = &experiment.experiment_id;
    let selection = select_flagged(experiment);
    for err in &selection.rejected {
        warn!("{id}: {err}");
    }

    let (up, down) = regulation_counts(
        &selection.points,
        config.fold_change_threshold,
        config.p_value_threshold,
    );
    let anchors = compute_anchors(&selection.points);
    let samples = match &anchors {
        Some(a) => compute_distances(id, &selection.points, a),
        None => {
            warn!("{id}: no valid flagged rows, experiment skipped");
            Vec::new()
        }
    };

    let summary = ExperimentSummary {
        experiment_id: id.clone(),
        rows: experiment.len(),
        flagged: selection.flagged,
        invalid: selection.rejected.len(),
        up,
        down,
        anchors,
        samples: samples.len(),
    };
    info!(
        "{id}: {} rows, {} flagged, {} invalid, {} up, {} down",
        summary.rows, summary.flagged, summary.invalid, summary.up, summary.down
    );
    if let Some(a) = &summary.anchors {
        debug!(
            "{id}: anchors left={:.4} right={:.4} top={:.4}",
            a.leftmost_x, a.rightmost_x, a.topmost_y
        );
    }
    (summary, samples)
}

// ---------------------------------------------------------------------------
// Pass 2: per compound
// ---------------------------------------------------------------------------

/// A compound's samples together with its screening and consensus result.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundProfile {
    pub compound_id: String,
    pub samples: Vec<ExperimentDistance>,
    /// Set only for two or more samples with a distinguishable outlier.
    pub outlier_experiment_id: Option<String>,
    pub consensus_distance: f64,
}

/// Screen one compound's samples and compute its consensus distance.
pub fn resolve_profile(group: CompoundSamples, remove_outlier: bool) -> Option<CompoundProfile> {
    let screened = outlier::screen(&group.samples, remove_outlier);
    let consensus_distance = consensus::consensus_distance(&screened.distances)?;
    if let Some(exp) = &screened.outlier_experiment_id {
        debug!(
            "{}: outlier in {exp}{}",
            group.compound_id,
            if remove_outlier { " (removed)" } else { "" }
        );
    }
    Some(CompoundProfile {
        compound_id: group.compound_id,
        samples: group.samples,
        outlier_experiment_id: screened.outlier_experiment_id,
        consensus_distance,
    })
}

/// Group samples by compound and resolve every group, in first-seen order.
pub fn build_profiles(samples: Vec<DistanceSample>, remove_outlier: bool) -> Vec<CompoundProfile> {
    collect_by_compound(samples)
        .into_iter()
        .filter_map(|group| resolve_profile(group, remove_outlier))
        .collect()
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

/// Outcome of a ranking run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedReport {
    pub entries: Vec<RankedCompound>,
    pub experiments: Vec<ExperimentSummary>,
    /// Number of compounds that received a consensus distance.
    pub compounds: usize,
}

/// Rank compounds across experiments.
///
/// Fails only on an invalid configuration or when nothing is left to rank.
pub fn rank_compounds(experiments: &[ExperimentTable], config: &RankConfig) -> Result<RankedReport, RankError> {
    config.validate()?;
    if experiments.is_empty() {
        return Err(RankError::NoData("no experiments were given".into()));
    }

    let mut summaries = Vec::with_capacity(experiments.len());
    let mut samples = Vec::new();
    for exp in experiments {
        let (summary, exp_samples) = score_experiment(exp, config);
        summaries.push(summary);
        samples.extend(exp_samples);
    }

    let profiles = build_profiles(samples, config.remove_outlier);
    if profiles.is_empty() {
        return Err(RankError::NoData(format!(
            "none of the {} experiment(s) has a valid flagged compound",
            experiments.len()
        )));
    }

    let metadata = MetadataIndex::from_experiments(experiments);
    let entries = rank_profiles(&profiles, &metadata, config.top_k);
    info!(
        "ranked {} compound(s), reporting top {}",
        profiles.len(),
        entries.len()
    );

    Ok(RankedReport {
        entries,
        experiments: summaries,
        compounds: profiles.len(),
    })
}
