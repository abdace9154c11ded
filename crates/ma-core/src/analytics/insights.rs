//! Count-driven insight sentences.

use std::collections::BTreeMap;

use ma_common::{
    AnomalyAlert, PredictionTrend, PredictiveMetric, Severity, TrendAnalysis, TrendCategory,
};
use ma_config::InsightConfig;

/// Summarize a run as a short list of sentences.
///
/// The first sentence always reports overall health; the rest appear only
/// when their count is non-zero.
pub fn generate_insights(
    predictions: &BTreeMap<String, PredictiveMetric>,
    trends: &[TrendAnalysis],
    anomalies: &[AnomalyAlert],
    config: &InsightConfig,
) -> Vec<String> {
    let mut insights = Vec::new();

    let critical = anomalies
        .iter()
        .filter(|a| a.severity == Severity::Critical)
        .count();
    let high = anomalies
        .iter()
        .filter(|a| a.severity == Severity::High)
        .count();

    if critical > 0 {
        insights.push(format!(
            "Critical system issues detected ({critical}). Immediate attention required."
        ));
    } else if high > 0 {
        insights.push(format!(
            "High-priority anomalies detected ({high}). Monitor closely."
        ));
    } else {
        insights.push("System operating within normal parameters.".to_string());
    }

    let growing = predictions
        .values()
        .filter(|p| {
            p.trend == PredictionTrend::Up && p.change_percent > config.growth_change_percent
        })
        .count();
    if growing > 0 {
        insights.push(format!("{growing} metrics showing positive growth trends."));
    }

    let volatile = trends
        .iter()
        .filter(|t| t.trend == TrendCategory::Volatile && t.strength > config.volatile_strength)
        .count();
    if volatile > 0 {
        insights.push(format!(
            "{volatile} metrics exhibiting high volatility. Consider stabilization."
        ));
    }

    let seasonal = trends.iter().filter(|t| t.seasonality).count();
    if seasonal > 0 {
        insights.push(format!(
            "{seasonal} metrics show seasonal patterns. Resource planning recommended."
        ));
    }

    insights
}
