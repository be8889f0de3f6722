//! Pipeline driver (SPEC_FULL.md §5): wires scanner -> content source ->
//! parser -> file analyzers -> graph -> smells/defect -> score composer.
//!
//! File analysis is data-parallel over a `rayon` pool; within one file,
//! analysis is single-threaded. History analyzers, when a repository is
//! present, run after the file-analysis phase over the shared commit
//! stream (SPEC_FULL.md §4.11).

use crate::analyzers::{cohesion, complexity, dead_code, duplicates, satd};
use crate::cancel::CancellationToken;
use crate::config::OmenConfig;
use crate::defect;
use crate::error::OmenError;
use crate::graph::{self, centrality, smells};
use crate::history;
use crate::model::debt::DebtMarker;
use crate::model::graph::DependencyGraph;
use crate::model::score::ScoreResult;
use crate::model::source::SourceFile;
use crate::model::Language;
use crate::progress::ProgressTracker;
use crate::scanner::{self, ScanConfig};
use crate::score::{self, ScoreInputs};
use crate::source::{ContentSource, FilesystemSource};
use crate::tdg;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct PerFileResult {
    pub path: PathBuf,
    pub language: Language,
    pub source: String,
    pub complexity: Option<complexity::FileComplexity>,
    pub debt: Vec<DebtMarker>,
    pub classes: Vec<cohesion::ClassMetrics>,
}

#[derive(Default)]
pub struct AnalysisReport {
    pub files: Vec<PerFileResult>,
    pub duplication: crate::model::clone::DuplicationSummary,
    pub clone_groups: Vec<crate::model::clone::CloneGroup>,
    pub dead_code: Vec<dead_code::DeadCodeCandidate>,
    pub smells: Vec<smells::Smell>,
    pub defect_ranking: Vec<defect::FileRisk>,
    pub churn: Vec<history::churn::FileChurn>,
    pub coupling: Vec<history::coupling::CoupledPair>,
    pub score: Option<ScoreResult>,
}

/// Read and parse every scanned file, running the per-file analyzers
/// (complexity, SATD, cohesion) in parallel across a worker pool sized to
/// the host's hardware concurrency (SPEC_FULL.md §5). Content errors drop
/// the file and continue (SPEC_FULL.md §7 class 2).
fn analyze_files(source: &dyn ContentSource, files: &[SourceFile], config: &OmenConfig, progress: &ProgressTracker) -> Vec<PerFileResult> {
    let custom_patterns = satd::compile_custom_patterns(&config.satd);

    let pool = rayon::ThreadPoolBuilder::new().num_threads(num_cpus::get()).build().ok();

    let analyze = || {
        files
            .par_iter()
            .filter_map(|file| analyze_one_file(source, file, config, &custom_patterns, progress))
            .collect()
    };

    match pool {
        Some(pool) => pool.install(analyze),
        None => analyze(),
    }
}

fn analyze_one_file(
    source: &dyn ContentSource,
    file: &SourceFile,
    config: &OmenConfig,
    custom_patterns: &[regex::Regex],
    progress: &ProgressTracker,
) -> Option<PerFileResult> {
    let bytes = source.read(&file.path).ok()?;
    let text = String::from_utf8_lossy(&bytes).to_string();

    let complexity_result = complexity::analyze_file(&file.path, file.language, &bytes).ok();
    let debt = satd::analyze_file(&file.path, &text, &config.satd, custom_patterns);
    let classes = if file.language.is_object_oriented_capable() {
        cohesion::analyze_file(&file.path, file.language, &bytes)
    } else {
        Vec::new()
    };

    progress.tick_file();
    Some(PerFileResult {
        path: file.path.clone(),
        language: file.language,
        source: text,
        complexity: complexity_result,
        debt,
        classes,
    })
}

/// Build a project-wide call graph from every file's functions, shared by
/// the dead-code analyzer and the §4.9/§4.10 graph/smell analyzers
/// (SPEC_FULL.md §4.7: "reusing `DependencyGraph`, the same flat node/edge
/// model the §4.9 graph analyzer uses").
fn build_call_graph(files: &[(PathBuf, Language, String)]) -> (DependencyGraph, BTreeMap<String, f64>) {
    dead_code::build_reference_graph(files)
}

fn domain_risk(path: &Path) -> f64 {
    tdg::domain_risk_for_path(path)
}

/// Run the full engine over a filesystem root. Returns content errors
/// absorbed (SPEC_FULL.md §7), and a best-effort history pass: when `root`
/// is not inside a git repository, churn/coupling/defect-from-ownership are
/// skipped rather than failing the run.
pub fn run(root: &Path, config: &OmenConfig, cancel: &CancellationToken, progress: &ProgressTracker) -> Result<AnalysisReport, OmenError> {
    config.validate()?;
    cancel.check()?;

    let scan_config = ScanConfig {
        exclude: config.exclude.clone(),
        max_file_size: if config.max_file_size == 0 { None } else { Some(config.max_file_size) },
        ..ScanConfig::default()
    };
    let scan_result = scanner::scan(root, &scan_config);
    info!(files = scan_result.files.len(), dropped_for_size = scan_result.dropped_for_size, "scan complete");
    let content_source = FilesystemSource::new(root);

    let files = analyze_files(&content_source, &scan_result.files, config, progress);
    info!(analyzed = files.len(), "per-file analysis complete");
    cancel.check()?;

    let tuples: Vec<(PathBuf, Language, String)> = files.iter().map(|f| (f.path.clone(), f.language, f.source.clone())).collect();

    let (clone_groups, duplication) = duplicates::detect(&tuples, &config.duplicate);
    info!(groups = clone_groups.len(), ratio = duplication.ratio(), "duplicate detection complete");

    let (call_graph, dead_code_confidence) = build_call_graph(&tuples);
    let dead_code_candidates = dead_code::find_dead_code(&call_graph, &dead_code_confidence, &tuples, &config.dead_code, config.dead_code_confidence);
    info!(nodes = call_graph.node_count(), dead = dead_code_candidates.len(), "reference graph and dead-code pass complete");

    let smell_thresholds = smells::SmellThresholds::default();
    let detected_smells = smells::detect(&call_graph, &smell_thresholds);

    let average_instability = if call_graph.node_count() == 0 {
        0.0
    } else {
        (0..call_graph.node_count())
            .map(|i| {
                let idx = crate::model::graph::NodeIndex(i as u32);
                let fan_in = call_graph.fan_in(idx) as f64;
                let fan_out = call_graph.fan_out(idx) as f64;
                if fan_in + fan_out == 0.0 { 0.0 } else { fan_out / (fan_in + fan_out) }
            })
            .sum::<f64>()
            / call_graph.node_count() as f64
    };
    let cycle_components = graph::strongly_connected_components(&call_graph).into_iter().filter(|scc| scc.len() > 1).count();
    let sdp_violations = detected_smells.iter().filter(|s| matches!(s, smells::Smell::UnstableDependency { .. })).count();
    let weighted_smells: f64 = detected_smells
        .iter()
        .map(|s| match s {
            smells::Smell::CyclicDependency { .. } | smells::Smell::GodComponent { .. } => 3.0,
            smells::Smell::HubLikeComponent { .. } => 2.0,
            smells::Smell::UnstableDependency { .. } => 1.0,
        })
        .sum();
    let _ = centrality::pagerank(&call_graph, 0.85, 1e-6, 100);

    // TDG: per-file gradient, averaged into one project-level scaled score.
    let mut tdg_components_by_file: BTreeMap<PathBuf, tdg::TdgComponents> = BTreeMap::new();
    for file in &files {
        let (violating, total) = file
            .complexity
            .as_ref()
            .map(|c| {
                let violating = c
                    .functions
                    .iter()
                    .filter(|f| f.metrics.cyclomatic > config.cyclomatic_complexity_threshold || f.metrics.cognitive > config.cognitive_complexity_threshold)
                    .count();
                (violating, c.functions.len())
            })
            .unwrap_or((0, 0));
        let complexity_gradient = if total == 0 { 0.0 } else { (violating as f64 / total as f64) * 5.0 };
        tdg_components_by_file.insert(
            file.path.clone(),
            tdg::TdgComponents {
                complexity: complexity_gradient,
                churn: 0.0,
                coupling: 0.0,
                domain_risk: domain_risk(&file.path),
                duplication: duplication.ratio() * 5.0,
            },
        );
    }

    let (churn, coupling, defect_ranking) = if let Ok(repo) = git2::Repository::discover(root) {
        let commits = history::collect_commits(&repo, config.churn_days).unwrap_or_default();
        let churn = history::churn::compute(&commits);
        let coupling = history::coupling::compute(&commits, 3);

        let max_churn = churn.iter().map(|c| c.churn_score).fold(0.0_f64, f64::max).max(f64::EPSILON);
        for entry in churn.iter() {
            if let Some(components) = tdg_components_by_file.get_mut(&entry.path) {
                components.churn = (entry.churn_score / max_churn) * 5.0;
            }
        }

        let signals: Vec<defect::FileSignals> = files
            .iter()
            .map(|f| {
                let churn_score = churn.iter().find(|c| c.path == f.path).map(|c| c.churn_score).unwrap_or(0.0);
                let avg_cognitive = f
                    .complexity
                    .as_ref()
                    .map(|c| if c.functions.is_empty() { 0.0 } else { c.total.cognitive as f64 / c.functions.len() as f64 })
                    .unwrap_or(0.0);
                let ownership_concentration = history::blame_file(&repo, &f.path)
                    .ok()
                    .and_then(|blame| history::ownership::compute(&blame, &history::ownership::OwnershipConfig::default()))
                    .map(|o| o.dominant_share)
                    .unwrap_or(0.0);
                defect::FileSignals {
                    path: f.path.clone(),
                    churn_score,
                    avg_cognitive,
                    ownership_concentration,
                }
            })
            .collect();
        let defect_ranking = defect::predict(&signals, &defect::DefectWeights::default());

        (churn, coupling, defect_ranking)
    } else {
        (Vec::new(), Vec::new(), Vec::new())
    };

    for i in 0..call_graph.node_count() {
        let idx = crate::model::graph::NodeIndex(i as u32);
        let node = call_graph.node(idx);
        let file_path = PathBuf::from(&node.file);
        if let Some(components) = tdg_components_by_file.get_mut(&file_path) {
            let fan_in = call_graph.fan_in(idx) as f64;
            let fan_out = call_graph.fan_out(idx) as f64;
            components.coupling = ((fan_in + fan_out) / 20.0).min(5.0);
        }
    }

    let tdg_scaled_values: Vec<i32> = tdg_components_by_file
        .values()
        .map(|c| tdg::compute(*c, &tdg::TdgWeights::default()).scaled)
        .collect();
    let avg_tdg_scaled = if tdg_scaled_values.is_empty() {
        100
    } else {
        (tdg_scaled_values.iter().sum::<i32>() as f64 / tdg_scaled_values.len() as f64).round() as i32
    };

    let total_functions: usize = files.iter().filter_map(|f| f.complexity.as_ref()).map(|c| c.functions.len()).sum();
    let violating_functions: usize = files
        .iter()
        .filter_map(|f| f.complexity.as_ref())
        .map(|c| {
            c.functions
                .iter()
                .filter(|fc| fc.metrics.cyclomatic > config.cyclomatic_complexity_threshold || fc.metrics.cognitive > config.cognitive_complexity_threshold)
                .count()
        })
        .sum();

    let total_debt_markers: Vec<&DebtMarker> = files.iter().flat_map(|f| f.debt.iter()).collect();
    let total_loc: usize = files.iter().map(|f| f.source.lines().count()).sum();
    let weighted_debt: f64 = total_debt_markers.iter().map(|m| m.severity.weight()).sum();
    let satd_per_kloc = if total_loc == 0 { 0.0 } else { weighted_debt / (total_loc as f64 / 1000.0) };

    let all_classes: Vec<&cohesion::ClassMetrics> = files.iter().flat_map(|f| f.classes.iter()).collect();
    let avg_lcom4 = if all_classes.is_empty() {
        1.0
    } else {
        all_classes.iter().map(|c| c.lcom4 as f64).sum::<f64>() / all_classes.len() as f64
    };

    let score_inputs = ScoreInputs {
        violating_functions,
        total_functions,
        duplication_ratio: duplication.ratio(),
        satd_weighted_per_kloc: satd_per_kloc,
        tdg_scaled: avg_tdg_scaled,
        average_instability,
        cycle_components,
        sdp_violations,
        total_components: call_graph.node_count(),
        weighted_smells,
        avg_lcom4,
    };
    let score = score::compose(&score_inputs, &config.score, None);
    info!(composite = score.composite, passed = score.passed(), "score composition complete");

    Ok(AnalysisReport {
        files,
        duplication,
        clone_groups,
        dead_code: dead_code_candidates,
        smells: detected_smells,
        defect_ranking,
        churn,
        coupling,
        score: Some(score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_project_yields_a_well_formed_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = OmenConfig::default();
        let cancel = CancellationToken::new();
        let progress = ProgressTracker::new(false);
        let report = run(dir.path(), &config, &cancel, &progress).unwrap();
        assert!(report.files.is_empty());
        assert_eq!(report.score.unwrap().composite, 100);
    }

    #[test]
    fn simple_project_produces_complexity_and_score() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() { if true { println!(\"hi\"); } }").unwrap();
        let config = OmenConfig::default();
        let cancel = CancellationToken::new();
        let progress = ProgressTracker::new(false);
        let report = run(dir.path(), &config, &cancel, &progress).unwrap();
        assert_eq!(report.files.len(), 1);
        assert!(report.score.is_some());
    }
}
