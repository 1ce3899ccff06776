pub mod risk_scorer;
pub mod velocity;

pub use risk_scorer::{compose_score, RiskScorer};
pub use velocity::VelocityTracker;
