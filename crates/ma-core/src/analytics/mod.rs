//! Analytics stages: prediction, anomaly detection, trends, recommendations.

pub mod anomaly;
pub mod insights;
pub mod predictor;
pub mod recommend;
pub mod seasonality;
pub mod trend;

pub use anomaly::{AnomalyDetector, AnomalyScore};
pub use insights::generate_insights;
pub use predictor::{noise_factor, LocalPredictor, NoiseEnvelope};
pub use recommend::{
    sort_recommendations, AnomalyRule, PredictionRule, RecommendationEngine, RecommendationRule,
    RuleContext, TrendRule,
};
pub use seasonality::{detect_seasonality, seasonality_signal, SeasonalitySignal};
pub use trend::{
    analyze_trend, analyze_trends, classify_slope, detrended_volatility, estimate_trend,
};
