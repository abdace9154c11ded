//! Analytics orchestration.
//!
//! One call to [`AnalyticsEngine::run_analytics`] fans out prediction
//! requests, resolves histories, and runs anomaly detection, trend analysis,
//! recommendation rules and insight generation over the results.
//!
//! The call never fails. Collaborator failures fall back per metric; any
//! error or panic in the main path switches to a local-only path and the
//! result is marked `degraded`. After a panic the local path skips the
//! history provider, and if it panics as well only local predictions are
//! returned.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::FutureExt;
use ma_common::{
    change_percent, AnalyticsResult, Error, PredictionOrigin, PredictionTrend, PredictiveMetric,
    Result, RunId, SCHEMA_VERSION,
};
use ma_config::AnalyticsConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::analytics::{
    analyze_trends, generate_insights, noise_factor, AnomalyDetector, LocalPredictor,
    NoiseEnvelope, RecommendationEngine,
};
use crate::backend::{PredictionError, PredictionRequest, PredictionSource, UsablePrediction};
use crate::history::HistoryProvider;

/// Everything computed from predictions and histories.
struct RunOutput {
    predictions: BTreeMap<String, PredictiveMetric>,
    anomalies: Vec<ma_common::AnomalyAlert>,
    trends: Vec<ma_common::TrendAnalysis>,
    recommendations: Vec<ma_common::SmartRecommendation>,
    insights: Vec<String>,
}

/// How provider errors are treated while resolving histories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    /// Propagate the error.
    Strict,
    /// Treat the metric as having no provider data.
    Lenient,
    /// Skip the provider and use caller data only.
    CallerOnly,
}

/// The analytics orchestrator.
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
    source: Option<Arc<dyn PredictionSource>>,
    history: Option<Arc<dyn HistoryProvider>>,
    predictor: LocalPredictor,
    detector: AnomalyDetector,
    recommender: RecommendationEngine,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        let predictor = LocalPredictor::new(
            config.smoothing.clone(),
            NoiseEnvelope::from_config(&config.noise),
        );
        let detector = AnomalyDetector::new(config.anomaly.clone());
        let recommender = RecommendationEngine::new(config.recommendations.clone());
        Self {
            config,
            source: None,
            history: None,
            predictor,
            detector,
            recommender,
        }
    }

    /// Ask `source` for predictions. Ignored when `backend.enabled` is false.
    pub fn with_prediction_source(mut self, source: Arc<dyn PredictionSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Prefer `provider` over caller-supplied histories.
    pub fn with_history_provider(mut self, provider: Arc<dyn HistoryProvider>) -> Self {
        self.history = Some(provider);
        self
    }

    /// Replace the recommendation rule set, e.g. one extended with
    /// [`RecommendationEngine::with_rule`].
    pub fn with_recommender(mut self, recommender: RecommendationEngine) -> Self {
        self.recommender = recommender;
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    fn active_source(&self) -> Option<&Arc<dyn PredictionSource>> {
        self.source.as_ref().filter(|_| self.config.backend.enabled)
    }

    fn rng(&self) -> StdRng {
        match self.config.noise.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Run one analytics pass.
    pub async fn run_analytics(
        &self,
        current: &BTreeMap<String, f64>,
        historical: Option<&BTreeMap<String, Vec<f64>>>,
    ) -> AnalyticsResult {
        let run_id = RunId::new();
        let generated_at = Utc::now();
        let current = sanitize_current(current);

        let primary = AssertUnwindSafe(self.run_primary(&current, historical, generated_at))
            .catch_unwind()
            .await;

        let fallback_mode = match primary {
            Ok(Ok(output)) => return self.finish(run_id, generated_at, output, false),
            Ok(Err(e)) => {
                warn!(
                    run_id = %run_id,
                    error = %e,
                    code = e.code(),
                    "analytics run failed, using local fallback"
                );
                HistoryMode::Lenient
            }
            Err(_) => {
                warn!(run_id = %run_id, "analytics run panicked, using local fallback");
                HistoryMode::CallerOnly
            }
        };

        let fallback = std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_fallback(&current, historical, generated_at, fallback_mode)
        }));
        let output = match fallback {
            Ok(output) => output,
            Err(_) => {
                warn!(run_id = %run_id, "local fallback panicked, returning predictions only");
                self.last_resort(&current)
            }
        };
        self.finish(run_id, generated_at, output, true)
    }

    fn finish(
        &self,
        run_id: RunId,
        generated_at: DateTime<Utc>,
        output: RunOutput,
        degraded: bool,
    ) -> AnalyticsResult {
        info!(
            run_id = %run_id,
            metrics = output.predictions.len(),
            anomalies = output.anomalies.len(),
            trends = output.trends.len(),
            recommendations = output.recommendations.len(),
            degraded,
            "analytics run complete"
        );

        AnalyticsResult {
            schema_version: SCHEMA_VERSION.to_string(),
            run_id,
            generated_at,
            degraded,
            predictions: output.predictions,
            anomalies: output.anomalies,
            trends: output.trends,
            recommendations: output.recommendations,
            insights: output.insights,
        }
    }

    async fn run_primary(
        &self,
        current: &BTreeMap<String, f64>,
        historical: Option<&BTreeMap<String, Vec<f64>>>,
        now: DateTime<Utc>,
    ) -> Result<RunOutput> {
        let mut rng = self.rng();
        let predictions = match self.active_source() {
            Some(source) => self.backend_predictions(source.as_ref(), current, &mut rng).await,
            None => self.local_predictions(current, &mut rng),
        };
        let histories = self.resolve_histories(current, historical, HistoryMode::Strict)?;
        Ok(self.analyze(predictions, current, &histories, now))
    }

    /// Local-only path. Must not fail.
    fn run_fallback(
        &self,
        current: &BTreeMap<String, f64>,
        historical: Option<&BTreeMap<String, Vec<f64>>>,
        now: DateTime<Utc>,
        mode: HistoryMode,
    ) -> RunOutput {
        let mut rng = self.rng();
        let predictions = self.local_predictions(current, &mut rng);
        let histories = self
            .resolve_histories(current, historical, mode)
            .unwrap_or_default();
        self.analyze(predictions, current, &histories, now)
    }

    /// Predictions from current values only. No collaborator or rule runs.
    fn last_resort(&self, current: &BTreeMap<String, f64>) -> RunOutput {
        let mut rng = self.rng();
        let predictions = self.local_predictions(current, &mut rng);
        let insights = generate_insights(&predictions, &[], &[], &self.config.insights);
        RunOutput {
            predictions,
            anomalies: Vec::new(),
            trends: Vec::new(),
            recommendations: Vec::new(),
            insights,
        }
    }

    fn local_predictions(
        &self,
        current: &BTreeMap<String, f64>,
        rng: &mut StdRng,
    ) -> BTreeMap<String, PredictiveMetric> {
        current
            .iter()
            .map(|(metric, &value)| (metric.clone(), self.predictor.predict_current(value, rng)))
            .collect()
    }

    async fn backend_predictions(
        &self,
        source: &dyn PredictionSource,
        current: &BTreeMap<String, f64>,
        rng: &mut StdRng,
    ) -> BTreeMap<String, PredictiveMetric> {
        let calls = current
            .keys()
            .map(|metric| self.request_prediction(source, metric));
        let outcomes = join_all(calls).await;

        let mut predictions = BTreeMap::new();
        for ((metric, &value), outcome) in current.iter().zip(outcomes) {
            let prediction = match outcome {
                Ok(usable) => {
                    debug!(metric = %metric, source = source.name(), "using backend prediction");
                    self.backend_metric(value, usable, rng)
                }
                Err(e) => {
                    warn!(
                        metric = %metric,
                        source = source.name(),
                        error = %e,
                        "backend prediction failed, using local fallback"
                    );
                    self.predictor.predict_current(value, rng)
                }
            };
            predictions.insert(metric.clone(), prediction);
        }
        predictions
    }

    async fn request_prediction(
        &self,
        source: &dyn PredictionSource,
        metric: &str,
    ) -> std::result::Result<UsablePrediction, PredictionError> {
        let backend = &self.config.backend;
        let request = PredictionRequest::new(metric, &backend.context, backend.horizon);
        let seconds = backend.timeout_secs;
        let response = tokio::time::timeout(Duration::from_secs(seconds), source.predict(&request))
            .await
            .map_err(|_| PredictionError::Timeout { seconds })??;
        response.usable()
    }

    fn backend_metric(
        &self,
        input: f64,
        usable: UsablePrediction,
        rng: &mut StdRng,
    ) -> PredictiveMetric {
        let current = usable.current.unwrap_or(input);
        let predicted = usable.prediction;
        let next_day = predicted * noise_factor(self.config.noise.backend_next_day_band, rng);
        PredictiveMetric {
            current,
            predicted,
            confidence: usable.confidence,
            trend: PredictionTrend::from_change(current, predicted),
            change_percent: change_percent(current, predicted),
            next_hour_prediction: predicted,
            next_day_prediction: next_day,
            source: PredictionOrigin::Backend,
        }
    }

    /// Provider series (trailing window) first, then caller data.
    fn resolve_histories(
        &self,
        current: &BTreeMap<String, f64>,
        historical: Option<&BTreeMap<String, Vec<f64>>>,
        mode: HistoryMode,
    ) -> Result<BTreeMap<String, Vec<f64>>> {
        let mut resolved = BTreeMap::new();
        for metric in current.keys() {
            let provider = self.history.as_ref().filter(|_| mode != HistoryMode::CallerOnly);
            let from_provider = match provider {
                Some(provider) => match provider.history(metric) {
                    Ok(series) => series.map(|s| s.tail(self.config.history.window)),
                    Err(e) if mode == HistoryMode::Strict => {
                        return Err(Error::HistoryUnavailable {
                            metric: metric.clone(),
                            reason: e.to_string(),
                        });
                    }
                    Err(e) => {
                        debug!(
                            metric = %metric,
                            provider = provider.name(),
                            error = %e,
                            "ignoring provider history"
                        );
                        None
                    }
                },
                None => None,
            };

            let series = from_provider.or_else(|| {
                historical
                    .and_then(|h| h.get(metric))
                    .map(|values| values.iter().copied().filter(|v| v.is_finite()).collect())
            });

            if let Some(series) = series {
                resolved.insert(metric.clone(), series);
            }
        }
        Ok(resolved)
    }

    fn analyze(
        &self,
        predictions: BTreeMap<String, PredictiveMetric>,
        current: &BTreeMap<String, f64>,
        histories: &BTreeMap<String, Vec<f64>>,
        now: DateTime<Utc>,
    ) -> RunOutput {
        let anomalies = self.detector.detect(current, histories, now);
        let trends = analyze_trends(histories, &self.config.trend, &self.config.seasonality);
        let recommendations = self.recommender.generate(&predictions, &anomalies, &trends);
        let insights = generate_insights(&predictions, &trends, &anomalies, &self.config.insights);
        RunOutput {
            predictions,
            anomalies,
            trends,
            recommendations,
            insights,
        }
    }
}

impl std::fmt::Debug for AnalyticsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsEngine")
            .field("source", &self.source.as_ref().map(|s| s.name().to_string()))
            .field("history", &self.history.as_ref().map(|h| h.name().to_string()))
            .field("recommender", &self.recommender)
            .finish()
    }
}

/// Drop metrics whose current value is not finite.
fn sanitize_current(current: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    current
        .iter()
        .filter_map(|(metric, &value)| {
            if value.is_finite() {
                Some((metric.clone(), value))
            } else {
                warn!(metric = %metric, "dropping non-finite current value");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::StaticHistory;
    use ma_config::NoiseConfig;

    fn quiet_config() -> AnalyticsConfig {
        let mut config = AnalyticsConfig::default();
        config.noise = NoiseConfig::disabled();
        config.backend.enabled = false;
        config
    }

    fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[tokio::test]
    async fn local_only_run_is_not_degraded() {
        let engine = AnalyticsEngine::new(quiet_config());
        let result = engine.run_analytics(&map(&[("clicks", 100.0)]), None).await;
        assert!(!result.degraded);
        let p = &result.predictions["clicks"];
        assert_eq!(p.source, PredictionOrigin::Local);
        assert_eq!(p.next_hour_prediction, 100.0);
        assert!(result.anomalies.is_empty());
        assert!(result.trends.is_empty());
    }

    #[tokio::test]
    async fn non_finite_current_is_dropped() {
        let engine = AnalyticsEngine::new(quiet_config());
        let result = engine
            .run_analytics(&map(&[("a", f64::NAN), ("b", 1.0)]), None)
            .await;
        assert_eq!(result.predictions.len(), 1);
        assert!(result.predictions.contains_key("b"));
    }

    #[tokio::test]
    async fn provider_error_triggers_degraded_fallback() {
        let mut provider = StaticHistory::new();
        provider.insert(ma_common::MetricSeries::from_values("x", &[1.0, f64::INFINITY]));
        let mut historical = BTreeMap::new();
        historical.insert("x".to_string(), vec![10.0, 11.0, 9.0, 10.0, 12.0, 10.0]);

        let engine = AnalyticsEngine::new(quiet_config()).with_history_provider(Arc::new(provider));
        let result = engine
            .run_analytics(&map(&[("x", 10.0)]), Some(&historical))
            .await;
        assert!(result.degraded);
        assert_eq!(result.trends.len(), 1);
        assert_eq!(result.trends[0].metric, "x");
    }

    #[tokio::test]
    async fn provider_window_is_applied() {
        let mut provider = StaticHistory::new();
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        provider.insert(ma_common::MetricSeries::from_values("x", &values));
        let mut config = quiet_config();
        config.history.window = 10;

        let engine = AnalyticsEngine::new(config).with_history_provider(Arc::new(provider));
        let result = engine.run_analytics(&map(&[("x", 99.0)]), None).await;
        let trend = &result.trends[0];
        assert_eq!(trend.forecast[0], 99.0 + trend.slope);
        // Smoothed 90..=99 ramp; the full 0..100 ramp would give ~0.99.
        assert!((trend.slope - 61.0 / 66.0).abs() < 1e-9);
    }
}
