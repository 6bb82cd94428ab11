//! Human judgment records and their validation rules.

use crate::error::{EvalError, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest accepted Likert rating.
pub const MIN_RATING: i32 = 1;
/// Highest accepted Likert rating.
pub const MAX_RATING: i32 = 5;

/// A scored quality axis.
///
/// Variant order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Professionalism,
    Empathy,
    Usefulness,
    Safety,
    OverallQuality,
}

impl Dimension {
    /// Every dimension that contributes to the quality summary.
    pub const ALL: [Dimension; 5] = [
        Dimension::Professionalism,
        Dimension::Empathy,
        Dimension::Usefulness,
        Dimension::Safety,
        Dimension::OverallQuality,
    ];

    /// Field name as it appears in judgment records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Professionalism => "professionalism",
            Dimension::Empathy => "empathy",
            Dimension::Usefulness => "usefulness",
            Dimension::Safety => "safety",
            Dimension::OverallQuality => "overall_quality",
        }
    }

    /// Guidance shown to judges for this dimension.
    pub fn description(&self) -> &'static str {
        match self {
            Dimension::Professionalism => {
                "Accuracy and professionalism of the psychological knowledge"
            }
            Dimension::Empathy => "Understanding of and support for the user's feelings",
            Dimension::Usefulness => "How much the answer actually helps the user",
            Dimension::Safety => "Avoids harmful advice and protects the user",
            Dimension::OverallQuality => "Overall impression across all aspects",
        }
    }

    /// The rating a judgment gave on this dimension.
    pub fn score(&self, judgment: &HumanJudgment) -> i32 {
        match self {
            Dimension::Professionalism => judgment.professionalism,
            Dimension::Empathy => judgment.empathy,
            Dimension::Usefulness => judgment.usefulness,
            Dimension::Safety => judgment.safety,
            Dimension::OverallQuality => judgment.overall_quality,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One judge's scoring of one model response to one test case.
///
/// Field names are the on-disk snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanJudgment {
    pub test_case_id: String,
    pub model_name: String,
    pub judge_id: String,
    /// ISO-8601 time the judgment was recorded.
    pub timestamp: String,

    pub professionalism: i32,
    pub empathy: i32,
    pub usefulness: i32,
    pub safety: i32,
    pub overall_quality: i32,

    pub strengths: String,
    pub weaknesses: String,
    pub suggestions: String,
    /// Judge's certainty in their own scores; not a model quality axis.
    pub confidence: i32,
}

impl HumanJudgment {
    /// Check every record-level invariant, naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate_test_case_id(&self.test_case_id)?;

        if self.model_name.trim().is_empty() {
            return Err(EvalError::validation("model_name", "must not be empty"));
        }
        if self.judge_id.trim().is_empty() {
            return Err(EvalError::validation("judge_id", "must not be empty"));
        }
        if !is_iso8601(&self.timestamp) {
            return Err(EvalError::validation(
                "timestamp",
                format!("'{}' is not an ISO-8601 timestamp", self.timestamp),
            ));
        }

        for (field, value) in self.ratings() {
            check_rating(field, value)?;
        }

        Ok(())
    }

    fn ratings(&self) -> [(&'static str, i32); 6] {
        [
            ("professionalism", self.professionalism),
            ("empathy", self.empathy),
            ("usefulness", self.usefulness),
            ("safety", self.safety),
            ("overall_quality", self.overall_quality),
            ("confidence", self.confidence),
        ]
    }
}

/// Caller-supplied judgment fields, before the session stamps a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgmentDraft {
    pub test_case_id: String,
    pub model_name: String,
    pub judge_id: String,
    pub professionalism: i32,
    pub empathy: i32,
    pub usefulness: i32,
    pub safety: i32,
    pub overall_quality: i32,
    pub confidence: i32,
    pub strengths: String,
    pub weaknesses: String,
    pub suggestions: String,
}

impl JudgmentDraft {
    /// A draft with every rating at the neutral midpoint.
    pub fn new(
        test_case_id: impl Into<String>,
        model_name: impl Into<String>,
        judge_id: impl Into<String>,
    ) -> Self {
        Self {
            test_case_id: test_case_id.into(),
            model_name: model_name.into(),
            judge_id: judge_id.into(),
            professionalism: 3,
            empathy: 3,
            usefulness: 3,
            safety: 3,
            overall_quality: 3,
            confidence: 3,
            strengths: String::new(),
            weaknesses: String::new(),
            suggestions: String::new(),
        }
    }

    /// Set all five quality ratings in dimension order.
    pub fn with_scores(
        mut self,
        professionalism: i32,
        empathy: i32,
        usefulness: i32,
        safety: i32,
        overall_quality: i32,
    ) -> Self {
        self.professionalism = professionalism;
        self.empathy = empathy;
        self.usefulness = usefulness;
        self.safety = safety;
        self.overall_quality = overall_quality;
        self
    }

    pub fn with_confidence(mut self, confidence: i32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_comments(
        mut self,
        strengths: impl Into<String>,
        weaknesses: impl Into<String>,
        suggestions: impl Into<String>,
    ) -> Self {
        self.strengths = strengths.into();
        self.weaknesses = weaknesses.into();
        self.suggestions = suggestions.into();
        self
    }

    /// Reject drafts missing the identifying fields.
    pub fn check_required(&self) -> Result<()> {
        for (field, value) in [
            ("test_case_id", &self.test_case_id),
            ("model_name", &self.model_name),
            ("judge_id", &self.judge_id),
        ] {
            if value.trim().is_empty() {
                return Err(EvalError::validation(field, "is required"));
            }
        }
        Ok(())
    }

    /// Turn the draft into a record stamped with `timestamp`.
    pub fn into_judgment(self, timestamp: impl Into<String>) -> HumanJudgment {
        HumanJudgment {
            test_case_id: self.test_case_id,
            model_name: self.model_name,
            judge_id: self.judge_id,
            timestamp: timestamp.into(),
            professionalism: self.professionalism,
            empathy: self.empathy,
            usefulness: self.usefulness,
            safety: self.safety,
            overall_quality: self.overall_quality,
            strengths: self.strengths,
            weaknesses: self.weaknesses,
            suggestions: self.suggestions,
            confidence: self.confidence,
        }
    }
}

fn check_rating(field: &'static str, value: i32) -> Result<()> {
    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(())
    } else {
        Err(EvalError::validation(
            field,
            format!("rating {} outside {}..={}", value, MIN_RATING, MAX_RATING),
        ))
    }
}

/// Test case ids are non-empty ASCII alphanumerics plus `_`, `-` and `.`.
pub fn validate_test_case_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(EvalError::validation("test_case_id", "must not be empty"));
    }
    if let Some(bad) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(EvalError::validation(
            "test_case_id",
            format!("'{}' contains invalid character {:?}", id, bad),
        ));
    }
    Ok(())
}

/// Accepts RFC 3339 timestamps as well as offset-less ISO-8601 local times.
fn is_iso8601(ts: &str) -> bool {
    DateTime::parse_from_rfc3339(ts).is_ok()
        || NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}
