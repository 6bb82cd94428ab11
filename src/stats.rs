//! Aggregation of judgments into per-dimension statistics.
//!
//! [`summarize`] is a pure function of its input: ordered maps and in-order
//! summation make identical input produce bit-identical output.

use crate::judgment::{Dimension, HumanJudgment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Mean and sample standard deviation of one dimension within one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub mean: f64,
    /// `None` when the group has fewer than two records.
    pub stddev: Option<f64>,
    pub count: usize,
}

impl Stat {
    /// Compute from scores in the order given. Returns `None` for no scores.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }

        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;

        let stddev = if scores.len() < 2 {
            None
        } else {
            let sum_sq: f64 = scores.iter().map(|x| (x - mean).powi(2)).sum();
            Some((sum_sq / (n - 1.0)).sqrt())
        };

        Some(Self {
            mean,
            stddev,
            count: scores.len(),
        })
    }
}

/// Per-dimension statistics for one grouping.
pub type DimensionStats = BTreeMap<Dimension, Stat>;

/// Aggregate view of a judgment log.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Statistics across every judgment.
    pub overall: DimensionStats,
    /// Statistics per model name.
    pub by_model: BTreeMap<String, DimensionStats>,
    /// Number of judgments summarized.
    pub count: usize,
}

/// Reduce `judgments` to overall and per-model statistics.
///
/// Confidence is not a quality dimension and is left out.
pub fn summarize(judgments: &[HumanJudgment]) -> Summary {
    if judgments.is_empty() {
        return Summary::default();
    }

    let overall = dimension_stats(judgments.iter());

    let mut groups: BTreeMap<&str, Vec<&HumanJudgment>> = BTreeMap::new();
    for judgment in judgments {
        groups.entry(judgment.model_name.as_str()).or_default().push(judgment);
    }

    let by_model = groups
        .into_iter()
        .map(|(model, group)| (model.to_string(), dimension_stats(group.into_iter())))
        .collect();

    Summary {
        overall,
        by_model,
        count: judgments.len(),
    }
}

fn dimension_stats<'a>(
    judgments: impl Iterator<Item = &'a HumanJudgment> + Clone,
) -> DimensionStats {
    Dimension::ALL
        .iter()
        .filter_map(|dim| {
            let scores: Vec<f64> = judgments.clone().map(|j| dim.score(j) as f64).collect();
            Stat::from_scores(&scores).map(|stat| (*dim, stat))
        })
        .collect()
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Statistic for `dimension` of `model`, if that model has been judged.
    pub fn model_stat(&self, model: &str, dimension: Dimension) -> Option<&Stat> {
        self.by_model.get(model).and_then(|stats| stats.get(&dimension))
    }

    /// Human-readable report for terminals and logs.
    pub fn format_report(&self) -> String {
        if self.is_empty() {
            return "No judgments recorded yet.\n".to_string();
        }

        let mut out = String::new();
        let _ = writeln!(out, "========== Judgment Summary ==========");
        let _ = writeln!(out, "Total judgments: {}", self.count);
        let _ = writeln!(out, "--------------------------------------");
        let _ = writeln!(out, "Overall:");
        for (dim, stat) in &self.overall {
            let _ = writeln!(out, "  {:<16} {}", dim.as_str(), format_stat(stat));
        }
        let _ = writeln!(out, "--------------------------------------");
        let _ = writeln!(out, "By model:");
        for (model, stats) in &self.by_model {
            let n = stats.values().next().map(|s| s.count).unwrap_or(0);
            let _ = writeln!(out, "  {} (n={})", model, n);
            for (dim, stat) in stats {
                let _ = writeln!(out, "    {:<16} {}", dim.as_str(), format_stat(stat));
            }
        }
        let _ = writeln!(out, "======================================");
        out
    }
}

fn format_stat(stat: &Stat) -> String {
    match stat.stddev {
        Some(sd) => format!("{:.2} ± {:.2}", stat.mean, sd),
        None => format!("{:.2} ± n/a", stat.mean),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::JudgmentDraft;

    fn judgment(model: &str, overall: i32) -> HumanJudgment {
        JudgmentDraft::new("tc_001", model, "judge-1")
            .with_scores(overall, 5, 2, 4, overall)
            .with_confidence(1)
            .into_judgment("2026-10-17T10:00:00+08:00")
    }

    #[test]
    fn test_empty_input() {
        let summary = summarize(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.overall.is_empty());
        assert!(summary.by_model.is_empty());
        assert_eq!(summary.format_report(), "No judgments recorded yet.\n");
    }

    #[test]
    fn test_mean_and_sample_stddev() {
        let judgments = vec![
            judgment("model-a", 3),
            judgment("model-a", 4),
            judgment("model-a", 5),
        ];
        let summary = summarize(&judgments);

        let stat = summary
            .model_stat("model-a", Dimension::OverallQuality)
            .unwrap();
        assert_eq!(stat.mean, 4.0);
        assert!((stat.stddev.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(stat.count, 3);

        // Constant scores have zero spread, which is distinct from undefined.
        let empathy = summary.model_stat("model-a", Dimension::Empathy).unwrap();
        assert_eq!(empathy.stddev, Some(0.0));
    }

    #[test]
    fn test_single_record_stddev_absent() {
        let summary = summarize(&[judgment("model-a", 3), judgment("model-b", 5), judgment("model-b", 4)]);

        let single = summary.model_stat("model-a", Dimension::OverallQuality).unwrap();
        assert_eq!(single.mean, 3.0);
        assert_eq!(single.stddev, None);

        let pair = summary.model_stat("model-b", Dimension::OverallQuality).unwrap();
        assert_eq!(pair.mean, 4.5);
        assert!(pair.stddev.is_some());

        assert_eq!(summary.overall[&Dimension::OverallQuality].count, 3);
        assert_eq!(summary.overall[&Dimension::OverallQuality].mean, 4.0);
    }

    #[test]
    fn test_confidence_excluded() {
        let summary = summarize(&[judgment("model-a", 3)]);
        assert_eq!(summary.overall.len(), Dimension::ALL.len());
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("confidence"));
    }

    #[test]
    fn test_deterministic() {
        let judgments: Vec<_> = (0..50)
            .map(|i| judgment(if i % 3 == 0 { "model-b" } else { "model-a" }, 1 + (i * 7) % 5))
            .collect();

        let first = summarize(&judgments);
        let second = summarize(&judgments);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        let models: Vec<_> = first.by_model.keys().cloned().collect();
        assert_eq!(models, vec!["model-a", "model-b"]);
    }

    #[test]
    fn test_json_shape() {
        let summary = summarize(&[judgment("model-a", 4)]);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["by_model"]["model-a"]["overall_quality"]["mean"], 4.0);
        assert!(value["by_model"]["model-a"]["overall_quality"]["stddev"].is_null());
    }

    #[test]
    fn test_report_marks_undefined_stddev() {
        let report = summarize(&[judgment("model-a", 4)]).format_report();
        assert!(report.contains("Total judgments: 1"));
        assert!(report.contains("model-a (n=1)"));
        assert!(report.contains("4.00 ± n/a"));
    }
}
