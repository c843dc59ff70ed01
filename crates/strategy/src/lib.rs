pub mod decision;
pub mod predictor;
pub mod risk_gate;

pub use decision::DecisionEngine;
pub use predictor::HeuristicPredictor;
pub use risk_gate::RiskGate;
