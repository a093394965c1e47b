// crates/sensor-schemas-core/src/core/topic.rs
// ============================================================================
// Module: Topic Model
// Description: Declared input topics and their expansion into derived topics.
// Purpose: Compute output topics, intervals and state stores deterministically.
// Dependencies: crate::core::naming, serde
// ============================================================================

//! ## Overview
//! A [`TopicModel`] describes one input topic, its key and value types, and an
//! optional aggregator. Expansion is pure:
//! - without an aggregator only the input topic exists;
//! - a timed aggregator yields one [`TopicMetadata`] per window of
//!   [`TimeWindow::ALL`];
//! - any other aggregator yields one unwindowed output (`<base>_output`).
//!
//! Each derived output also has a state store named
//! `From-<input>-To-<output>`, which is persisted as a changelog topic and is
//! therefore part of the topic-name set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::naming::expand_class;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Aggregators that produce one output per time window.
pub const TIMED_AGGREGATORS: [&str; 2] = [
    "org.radarcns.kafka.aggregator.AggregatorDouble",
    "org.radarcns.kafka.aggregator.AggregatorDoubleArray",
];

/// Output suffix of unwindowed aggregations.
pub const OUTPUT_SUFFIX: &str = "_output";

/// Interval value of unwindowed outputs.
pub const NOT_APPLICABLE_INTERVAL: i64 = -1;

// ============================================================================
// SECTION: Time Windows
// ============================================================================

/// Aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    /// Ten seconds.
    TenSecond,
    /// Thirty seconds.
    ThirtySecond,
    /// One minute.
    OneMinute,
    /// Ten minutes.
    TenMinute,
    /// One hour.
    OneHour,
    /// One day.
    OneDay,
    /// One week.
    OneWeek,
    /// No window.
    NotApplicable,
}

impl TimeWindow {
    /// Windows used for timed aggregation, in output order.
    pub const ALL: [Self; 7] = [
        Self::TenSecond,
        Self::ThirtySecond,
        Self::OneMinute,
        Self::TenMinute,
        Self::OneHour,
        Self::OneDay,
        Self::OneWeek,
    ];

    /// Window length in milliseconds; `-1` when not applicable.
    #[must_use]
    pub const fn interval_ms(self) -> i64 {
        match self {
            Self::TenSecond => 10_000,
            Self::ThirtySecond => 30_000,
            Self::OneMinute => 60_000,
            Self::TenMinute => 600_000,
            Self::OneHour => 3_600_000,
            Self::OneDay => 86_400_000,
            Self::OneWeek => 604_800_000,
            Self::NotApplicable => NOT_APPLICABLE_INTERVAL,
        }
    }

    /// Topic suffix appended to the base output name.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::TenSecond => "_10sec",
            Self::ThirtySecond => "_30sec",
            Self::OneMinute => "_1min",
            Self::TenMinute => "_10min",
            Self::OneHour => "_1hour",
            Self::OneDay => "_1day",
            Self::OneWeek => "_1week",
            Self::NotApplicable => "",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TenSecond => "10sec",
            Self::ThirtySecond => "30sec",
            Self::OneMinute => "1min",
            Self::TenMinute => "10min",
            Self::OneHour => "1hour",
            Self::OneDay => "1day",
            Self::OneWeek => "1week",
            Self::NotApplicable => "not_applicable",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Topic Metadata
// ============================================================================

/// Derived output topic of an aggregated input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicMetadata {
    /// Window of the output; `None` for unwindowed aggregation.
    pub window: Option<TimeWindow>,
    /// Window length in milliseconds, `-1` for unwindowed aggregation.
    pub interval_ms: i64,
    /// Input topic name.
    pub input_topic: String,
    /// Output topic name.
    pub output_topic: String,
    /// State store name.
    pub state_store: String,
}

impl TopicMetadata {
    /// Builds metadata for `input` written to `output`.
    fn new(window: Option<TimeWindow>, input: &str, output: String) -> Self {
        Self {
            window,
            interval_ms: window.map_or(NOT_APPLICABLE_INTERVAL, TimeWindow::interval_ms),
            input_topic: input.to_string(),
            state_store: format!("From-{input}-To-{output}"),
            output_topic: output,
        }
    }
}

// ============================================================================
// SECTION: Topic Model
// ============================================================================

/// Declared input topic with optional aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicModel {
    /// Input topic name.
    pub input_topic: String,
    /// Full name of the key type.
    pub key_type: String,
    /// Full name of the value type.
    pub value_type: String,
    /// Full name of the aggregator, if the topic is aggregated.
    pub aggregator: Option<String>,
    /// Base output topic name; defaults to the input topic.
    pub base_output: Option<String>,
    /// Explicit output of an unwindowed stream.
    #[serde(default)]
    pub output_topic: Option<String>,
}

impl TopicModel {
    /// Creates a topic model, expanding abbreviated class names.
    #[must_use]
    pub fn new(
        input_topic: impl Into<String>,
        key_type: &str,
        value_type: &str,
        aggregator: Option<&str>,
        base_output: Option<String>,
    ) -> Self {
        Self {
            input_topic: input_topic.into(),
            key_type: expand_class(key_type),
            value_type: expand_class(value_type),
            aggregator: aggregator.map(expand_class),
            base_output,
            output_topic: None,
        }
    }

    /// Sets the output topic of an unwindowed stream.
    ///
    /// A model with an output topic and no aggregator expands to that single
    /// unwindowed output.
    #[must_use]
    pub fn with_output_topic(mut self, output_topic: impl Into<String>) -> Self {
        self.output_topic = Some(output_topic.into());
        self
    }

    /// Returns the base output name, defaulting to the input topic.
    #[must_use]
    pub fn base_output(&self) -> &str {
        self.base_output.as_deref().unwrap_or(&self.input_topic)
    }

    /// Returns true when the aggregator produces one output per window.
    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.aggregator
            .as_deref()
            .is_some_and(|aggregator| TIMED_AGGREGATORS.contains(&aggregator))
    }

    /// Expands the model into derived topic metadata.
    #[must_use]
    pub fn expand(&self) -> Vec<TopicMetadata> {
        if self.aggregator.is_none() && self.output_topic.is_none() {
            return Vec::new();
        }
        let base = self.base_output();
        if self.is_timed() {
            TimeWindow::ALL
                .iter()
                .map(|window| {
                    let output = format!("{base}{}", window.suffix());
                    TopicMetadata::new(Some(*window), &self.input_topic, output)
                })
                .collect()
        } else {
            let output =
                self.output_topic.clone().unwrap_or_else(|| format!("{base}{OUTPUT_SUFFIX}"));
            vec![TopicMetadata::new(None, &self.input_topic, output)]
        }
    }

    /// Returns the sorted set of input, output and state store names.
    #[must_use]
    pub fn topic_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        names.insert(self.input_topic.clone());
        for metadata in self.expand() {
            names.insert(metadata.output_topic);
            names.insert(metadata.state_store);
        }
        names
    }
}
