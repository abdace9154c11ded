//! Rule-based recommendation generation.
//!
//! Recommendations are produced by an ordered list of [`RecommendationRule`]s.
//! Each rule sees the full context (predictions, anomalies, trends) and
//! appends zero or more records. The combined list is then stably sorted by
//! priority, then confidence, so records that tie keep rule order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use ma_common::{
    AnomalyAlert, Impact, PredictionTrend, PredictiveMetric, Priority, RecommendationKind,
    Severity, SmartRecommendation, TrendAnalysis, TrendCategory,
};
use ma_config::RecommendationConfig;

/// Inputs visible to every rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub predictions: &'a BTreeMap<String, PredictiveMetric>,
    pub anomalies: &'a [AnomalyAlert],
    pub trends: &'a [TrendAnalysis],
    pub config: &'a RecommendationConfig,
}

/// One rule family.
pub trait RecommendationRule: Send + Sync {
    /// Stable rule name, used in logs.
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<SmartRecommendation>;
}

fn actions(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Growth and decline calls on per-metric predictions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionRule;

impl RecommendationRule for PredictionRule {
    fn name(&self) -> &'static str {
        "prediction"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<SmartRecommendation> {
        let mut out = Vec::new();
        for (metric, pred) in ctx.predictions {
            if pred.trend == PredictionTrend::Up
                && pred.change_percent > ctx.config.growth_change_percent
            {
                out.push(SmartRecommendation {
                    id: format!("rec-growth-{metric}"),
                    kind: RecommendationKind::Insight,
                    priority: Priority::High,
                    title: format!("{metric} Growth Opportunity"),
                    description: format!(
                        "{metric} is predicted to grow by {:.1}% in the next hour. Consider scaling resources.",
                        pred.change_percent
                    ),
                    impact: Impact::Positive,
                    confidence: pred.confidence,
                    actions: actions(&[
                        "Increase resource allocation",
                        "Prepare for higher demand",
                        "Monitor closely for next 24 hours",
                    ]),
                    metrics: vec![metric.clone()],
                });
            } else if pred.trend == PredictionTrend::Down
                && pred.change_percent.abs() > ctx.config.decline_change_percent
            {
                out.push(SmartRecommendation {
                    id: format!("rec-decline-{metric}"),
                    kind: RecommendationKind::Alert,
                    priority: Priority::High,
                    title: format!("{metric} Decline Alert"),
                    description: format!(
                        "{metric} is expected to decrease by {:.1}%. Investigate potential issues.",
                        pred.change_percent.abs()
                    ),
                    impact: Impact::Negative,
                    confidence: pred.confidence,
                    actions: actions(&[
                        "Investigate root cause",
                        "Prepare contingency plans",
                        "Review recent changes",
                    ]),
                    metrics: vec![metric.clone()],
                });
            }
        }
        out
    }
}

/// Alerts for high and critical anomalies.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnomalyRule;

impl RecommendationRule for AnomalyRule {
    fn name(&self) -> &'static str {
        "anomaly"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<SmartRecommendation> {
        ctx.anomalies
            .iter()
            .filter(|a| a.severity >= Severity::High)
            .map(|a| SmartRecommendation {
                id: format!("rec-anomaly-{}", a.id),
                kind: RecommendationKind::Alert,
                priority: if a.severity == Severity::Critical {
                    Priority::High
                } else {
                    Priority::Medium
                },
                title: format!("{} Anomaly in {}", title_case(a.severity), a.metric),
                description: a.description.clone(),
                impact: Impact::Negative,
                confidence: ctx.config.anomaly_confidence,
                actions: actions(&[
                    "Immediate investigation required",
                    "Check system health",
                    "Review recent deployments",
                    "Contact on-call engineer",
                ]),
                metrics: vec![a.metric.clone()],
            })
            .collect()
    }
}

fn title_case(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "Low",
        Severity::Medium => "Medium",
        Severity::High => "High",
        Severity::Critical => "Critical",
    }
}

/// Volatility and seasonality calls on trend analyses.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendRule;

impl RecommendationRule for TrendRule {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<SmartRecommendation> {
        let mut out = Vec::new();
        for trend in ctx.trends {
            let metric = &trend.metric;
            if trend.trend == TrendCategory::Volatile
                && trend.strength > ctx.config.volatility_strength
            {
                out.push(SmartRecommendation {
                    id: format!("rec-volatility-{metric}"),
                    kind: RecommendationKind::Optimization,
                    priority: Priority::Medium,
                    title: format!("Stabilize {metric} Volatility"),
                    description: format!(
                        "{metric} shows high volatility ({:.0}%). Consider implementing stabilization measures.",
                        trend.strength * 100.0
                    ),
                    impact: Impact::Neutral,
                    confidence: ctx.config.volatility_confidence,
                    actions: actions(&[
                        "Implement load balancing",
                        "Add circuit breakers",
                        "Review caching strategies",
                        "Monitor for patterns",
                    ]),
                    metrics: vec![metric.clone()],
                });
            } else if trend.seasonality {
                out.push(SmartRecommendation {
                    id: format!("rec-seasonal-{metric}"),
                    kind: RecommendationKind::Insight,
                    priority: Priority::Low,
                    title: format!("Seasonal Pattern Detected in {metric}"),
                    description: format!(
                        "{metric} exhibits seasonal behavior. Plan resources accordingly."
                    ),
                    impact: Impact::Positive,
                    confidence: ctx.config.seasonal_confidence,
                    actions: actions(&[
                        "Schedule resources for peak periods",
                        "Implement predictive scaling",
                        "Prepare seasonal reports",
                    ]),
                    metrics: vec![metric.clone()],
                });
            }
        }
        out
    }
}

/// Priority descending, then confidence descending. Stable.
pub fn sort_recommendations(recs: &mut [SmartRecommendation]) {
    recs.sort_by(|a, b| match b.priority.rank().cmp(&a.priority.rank()) {
        Ordering::Equal => b.confidence.total_cmp(&a.confidence),
        other => other,
    });
}

/// Ordered rule set.
pub struct RecommendationEngine {
    config: RecommendationConfig,
    rules: Vec<Box<dyn RecommendationRule>>,
}

impl RecommendationEngine {
    /// Prediction, anomaly, and trend rules, in that order.
    pub fn new(config: RecommendationConfig) -> Self {
        Self {
            config,
            rules: vec![
                Box::new(PredictionRule),
                Box::new(AnomalyRule),
                Box::new(TrendRule),
            ],
        }
    }

    /// Append a rule after the built-in ones.
    pub fn with_rule(mut self, rule: Box<dyn RecommendationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn generate(
        &self,
        predictions: &BTreeMap<String, PredictiveMetric>,
        anomalies: &[AnomalyAlert],
        trends: &[TrendAnalysis],
    ) -> Vec<SmartRecommendation> {
        let ctx = RuleContext {
            predictions,
            anomalies,
            trends,
            config: &self.config,
        };
        let mut recs: Vec<SmartRecommendation> =
            self.rules.iter().flat_map(|r| r.evaluate(&ctx)).collect();
        sort_recommendations(&mut recs);
        recs
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(RecommendationConfig::default())
    }
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("config", &self.config)
            .field("rules", &self.rule_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ma_common::PredictionOrigin;

    fn pred(trend: PredictionTrend, change: f64, confidence: f64) -> PredictiveMetric {
        PredictiveMetric {
            current: 100.0,
            predicted: 100.0 + change,
            confidence,
            trend,
            change_percent: change,
            next_hour_prediction: 100.0 + change,
            next_day_prediction: 100.0 + change,
            source: PredictionOrigin::Local,
        }
    }

    fn anomaly(metric: &str, severity: Severity) -> AnomalyAlert {
        AnomalyAlert {
            id: format!("anomaly-1-{metric}"),
            metric: metric.to_string(),
            value: 50.0,
            expected_value: 10.0,
            deviation: 3.2,
            severity,
            description: format!("{severity} anomaly on {metric}"),
            timestamp: Utc::now(),
        }
    }

    fn trend(
        metric: &str,
        category: TrendCategory,
        strength: f64,
        seasonal: bool,
    ) -> TrendAnalysis {
        TrendAnalysis {
            metric: metric.to_string(),
            trend: category,
            strength,
            period: "24h".to_string(),
            slope: 0.0,
            r2: 0.0,
            seasonality: seasonal,
            forecast: vec![],
        }
    }

    #[test]
    fn growth_and_decline() {
        let mut preds = BTreeMap::new();
        preds.insert("clicks".to_string(), pred(PredictionTrend::Up, 12.0, 0.7));
        preds.insert("revenue".to_string(), pred(PredictionTrend::Down, -20.0, 0.6));
        preds.insert("flat".to_string(), pred(PredictionTrend::Up, 10.0, 0.9));

        let recs = RecommendationEngine::default().generate(&preds, &[], &[]);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id, "rec-growth-clicks");
        assert_eq!(recs[0].kind, RecommendationKind::Insight);
        assert_eq!(recs[0].confidence, 0.7);
        assert!(recs[0].description.contains("12.0%"));
        assert_eq!(recs[1].id, "rec-decline-revenue");
        assert_eq!(recs[1].impact, Impact::Negative);
        assert!(recs[1].description.contains("20.0%"));
        assert_eq!(recs[1].actions.len(), 3);
    }

    #[test]
    fn anomaly_priorities() {
        let anomalies = vec![
            anomaly("a", Severity::Medium),
            anomaly("b", Severity::High),
            anomaly("c", Severity::Critical),
        ];
        let recs = RecommendationEngine::default().generate(&BTreeMap::new(), &anomalies, &[]);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].metrics, vec!["c".to_string()]);
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].id, "rec-anomaly-anomaly-1-c");
        assert_eq!(recs[1].priority, Priority::Medium);
        assert_eq!(recs[1].confidence, 0.9);
        assert_eq!(recs[1].actions.len(), 4);
    }

    #[test]
    fn volatile_excludes_seasonal() {
        let trends = vec![
            trend("x", TrendCategory::Volatile, 0.8, true),
            trend("y", TrendCategory::Volatile, 0.4, true),
            trend("z", TrendCategory::Increasing, 0.2, false),
        ];
        let recs = RecommendationEngine::default().generate(&BTreeMap::new(), &[], &trends);
        let ids: Vec<&str> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rec-volatility-x", "rec-seasonal-y"]);
        assert!(recs[0].description.contains("80%"));
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let trends = vec![
            trend("b", TrendCategory::Stable, 0.0, true),
            trend("a", TrendCategory::Stable, 0.0, true),
        ];
        let recs = RecommendationEngine::default().generate(&BTreeMap::new(), &[], &trends);
        assert_eq!(recs[0].id, "rec-seasonal-b");
        assert_eq!(recs[1].id, "rec-seasonal-a");
    }

    #[test]
    fn sorted_by_priority_then_confidence() {
        let mut preds = BTreeMap::new();
        preds.insert("low_conf".to_string(), pred(PredictionTrend::Up, 30.0, 0.4));
        let anomalies = vec![anomaly("crit", Severity::Critical), anomaly("hi", Severity::High)];
        let trends = vec![
            trend("season", TrendCategory::Stable, 0.0, true),
            trend("vol", TrendCategory::Volatile, 0.9, false),
        ];
        let recs = RecommendationEngine::default().generate(&preds, &anomalies, &trends);
        let ids: Vec<&str> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "rec-anomaly-anomaly-1-crit",
                "rec-growth-low_conf",
                "rec-anomaly-anomaly-1-hi",
                "rec-volatility-vol",
                "rec-seasonal-season",
            ]
        );
    }

    struct Always;

    impl RecommendationRule for Always {
        fn name(&self) -> &'static str {
            "always"
        }

        fn evaluate(&self, _ctx: &RuleContext<'_>) -> Vec<SmartRecommendation> {
            vec![SmartRecommendation {
                id: "rec-custom".to_string(),
                kind: RecommendationKind::Action,
                priority: Priority::Low,
                title: "Custom".to_string(),
                description: String::new(),
                impact: Impact::Neutral,
                confidence: 1.0,
                actions: vec![],
                metrics: vec![],
            }]
        }
    }

    #[test]
    fn custom_rules_run_after_builtins() {
        let engine = RecommendationEngine::default().with_rule(Box::new(Always));
        assert_eq!(engine.rule_names(), vec!["prediction", "anomaly", "trend", "always"]);
        let recs = engine.generate(&BTreeMap::new(), &[], &[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::Action);
    }
}
