use crate::core::validation::ValidationError;
use crate::models::StatsCard;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_STAT_NAMES: [&str; 2] = ["hashes", "matches"];

const METRICS_DISABLED: &str = "Detailed metrics need to be enabled during deployment.";

/// Reporting window for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TimeSpan {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "7d")]
    Week,
}

impl TimeSpan {
    pub const ALL: [TimeSpan; 3] = [TimeSpan::Day, TimeSpan::Hour, TimeSpan::Week];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSpan::Day => "24h",
            TimeSpan::Hour => "1h",
            TimeSpan::Week => "7d",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeSpan::Day => "24 hours",
            TimeSpan::Hour => "1 hour",
            TimeSpan::Week => "7 days",
        }
    }

    /// Parse an optional query value, defaulting to the last 24 hours
    pub fn parse_or_default(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(TimeSpan::default()),
            Some(value) => value.parse(),
        }
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeSpan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeSpan::ALL
            .into_iter()
            .find(|span| span.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownTimeSpan(s.to_string()))
    }
}

pub fn stat_title(stat_name: &str) -> &'static str {
    match stat_name {
        "hashes" => "Photos Processed",
        "matches" => "Photos Matched",
        "actions" => "Actions Taken",
        _ => "Unknown Statistic",
    }
}

/// Compact count: `999`, `1.5K`, `1M+`
pub fn shorten_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{}M+", n / 1_000_000)
    } else if n >= 1_000 {
        let tenths = n / 100;
        if tenths % 10 == 0 {
            format!("{}K", tenths / 10)
        } else {
            format!("{}.{}K", tenths / 10, tenths % 10)
        }
    } else {
        n.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSeries {
    pub timestamps: Vec<i64>,
    pub values: Vec<f64>,
}

/// Split graph points into parallel series, zeroing the two partial end buckets
pub fn graph_series(points: &[(i64, f64)]) -> GraphSeries {
    let timestamps = points.iter().map(|(ts, _)| *ts).collect();
    let mut values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    if let Some(first) = values.first_mut() {
        *first = 0.0;
    }
    if let Some(last) = values.last_mut() {
        *last = 0.0;
    }
    GraphSeries { timestamps, values }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyCard {
    pub title: &'static str,
    pub count: u64,
    pub count_text: String,
    pub span_label: String,
    pub graph: GraphSeries,
}

/// One dashboard card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StatCardView {
    Loading,
    Ready(ReadyCard),
    Unavailable { message: String },
}

impl StatCardView {
    /// Card for a served statistic; the label follows the span the upstream reports
    pub fn ready(stat_name: &str, card: &StatsCard) -> Self {
        let span_label = card
            .time_span
            .parse::<TimeSpan>()
            .map(|span| span.label())
            .unwrap_or("unknown period");
        StatCardView::Ready(ReadyCard {
            title: stat_title(stat_name),
            count: card.time_span_count,
            count_text: shorten_number(card.time_span_count),
            span_label: format!("in the last {span_label}"),
            graph: graph_series(&card.graph_data),
        })
    }

    pub fn unavailable(metrics_url: Option<&str>) -> Self {
        let message = match metrics_url.filter(|url| !url.is_empty()) {
            Some(url) => format!(
                "Additional metrics for the system's underlying implementation can be found at {url}"
            ),
            None => METRICS_DISABLED.to_string(),
        };
        StatCardView::Unavailable { message }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedCard {
    pub stat_name: String,
    #[serde(flatten)]
    pub view: StatCardView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub time_span: TimeSpan,
    pub cards: Vec<NamedCard>,
}

impl DashboardView {
    /// Every card starts out loading
    pub fn loading(time_span: TimeSpan, stat_names: &[String]) -> Self {
        Self {
            time_span,
            cards: stat_names
                .iter()
                .map(|name| NamedCard {
                    stat_name: name.clone(),
                    view: StatCardView::Loading,
                })
                .collect(),
        }
    }

    /// Settle one card; later results for the same stat replace earlier ones
    pub fn resolve(&mut self, stat_name: &str, view: StatCardView) {
        if let Some(card) = self.cards.iter_mut().find(|c| c.stat_name == stat_name) {
            card.view = view;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.cards
            .iter()
            .all(|card| card.view != StatCardView::Loading)
    }
}
