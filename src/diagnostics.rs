//! Read-only diagnostics: cleaning impact and per-stage traces.
//!
//! Neither function changes pipeline behavior. [`debug_steps`] runs the same
//! stage functions as [`crate::clean`] and records the text after each one.

use crate::options::CleanOptions;
use crate::pipeline::run_stages;
use crate::stages::{CODE_BLOCK, EQUATION, MATH};
use crate::validate::{validate, ValidationResult};
use serde::{Deserialize, Serialize};

/// Size of a text in characters, lines and whitespace-separated words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextStats {
    pub length: usize,
    pub lines: usize,
    pub words: usize,
}

impl TextStats {
    /// Measures `text`. Empty text has zero lines.
    pub fn of(text: &str) -> Self {
        Self {
            length: text.chars().count(),
            lines: if text.is_empty() {
                0
            } else {
                text.split('\n').count()
            },
            words: text.split_whitespace().count(),
        }
    }
}

/// How much text cleaning removed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Removed {
    /// Characters removed; negative when cleaning made the text longer.
    pub length: i64,
    /// `length` as a percentage of the original, rounded to two decimals.
    pub percentage: f64,
}

/// Placeholder tokens present in the cleaned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaceholderCounts {
    pub equations: usize,
    pub math: usize,
    pub code: usize,
    pub links: usize,
}

impl PlaceholderCounts {
    /// Counts placeholders in `text`.
    pub fn of(text: &str) -> Self {
        Self {
            equations: text.matches(EQUATION).count(),
            math: text.matches(MATH).count(),
            code: text.matches(CODE_BLOCK).count() + text.matches("[code]").count(),
            links: text.matches("[link]").count() + text.matches("[email]").count(),
        }
    }

    /// Sum of all placeholder kinds.
    pub fn total(&self) -> usize {
        self.equations + self.math + self.code + self.links
    }
}

/// Before/after comparison of one cleaning call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    pub original: TextStats,
    pub cleaned: TextStats,
    pub removed: Removed,
    pub placeholders: PlaceholderCounts,
}

/// Compares an original text with its cleaned form.
pub fn analyze_impact(original: &str, cleaned: &str) -> ImpactReport {
    let original_stats = TextStats::of(original);
    let cleaned_stats = TextStats::of(cleaned);

    let removed = original_stats.length as i64 - cleaned_stats.length as i64;
    let percentage = if original_stats.length == 0 {
        0.0
    } else {
        let raw = removed as f64 / original_stats.length as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    };

    ImpactReport {
        original: original_stats,
        cleaned: cleaned_stats,
        removed: Removed {
            length: removed,
            percentage,
        },
        placeholders: PlaceholderCounts::of(cleaned),
    }
}

/// Text state after one step of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSnapshot {
    /// Stage name, or `"original"` for the input.
    pub stage: String,
    pub text: String,
}

/// Ordered record of every stage's output for one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugTrace {
    /// The original first, then one entry per stage that ran.
    pub steps: Vec<StageSnapshot>,
    /// Validation of the last stage's output.
    pub validation: ValidationResult,
    /// Set when a stage failed; the trace stops at that stage.
    pub error: Option<String>,
}

impl DebugTrace {
    /// Text recorded for `stage`, if that stage ran.
    pub fn get(&self, stage: &str) -> Option<&str> {
        self.steps
            .iter()
            .find(|step| step.stage == stage)
            .map(|step| step.text.as_str())
    }

    /// Text after the last recorded step.
    pub fn final_text(&self) -> &str {
        self.steps.last().map(|step| step.text.as_str()).unwrap_or("")
    }

    /// Stage names in recorded order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.stage.as_str()).collect()
    }
}

/// Traces every stage with default options.
pub fn debug_steps(text: &str) -> DebugTrace {
    debug_steps_with(text, &CleanOptions::default())
}

/// Traces every enabled stage with the given options.
pub fn debug_steps_with(text: &str, options: &CleanOptions) -> DebugTrace {
    let mut steps = vec![StageSnapshot {
        stage: "original".to_string(),
        text: text.to_string(),
    }];

    let outcome = run_stages(text, options, |stage, current| {
        steps.push(StageSnapshot {
            stage: stage.name().to_string(),
            text: current.to_string(),
        });
    });

    let error = outcome.err().map(|err| err.to_string());
    let validation = match steps.last() {
        Some(step) => validate(&step.text, options),
        None => validate("", options),
    };

    DebugTrace {
        steps,
        validation,
        error,
    }
}
