//! Prediction values and relay wire bodies.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score returned by the space. Passed through to the browser unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PredictionValue {
    Number(f64),
    Text(String),
}

impl PredictionValue {
    /// Accept a JSON number or string; anything else is not a score.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(PredictionValue::Number),
            serde_json::Value::String(s) => Some(PredictionValue::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for PredictionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionValue::Number(n) => write!(f, "{}", n),
            PredictionValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Success body of `POST /api/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PredictionResponse {
    pub prediction: PredictionValue,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        assert_eq!(
            PredictionValue::from_json(&json!(7.8)),
            Some(PredictionValue::Number(7.8))
        );
        assert_eq!(
            PredictionValue::from_json(&json!("6.5")),
            Some(PredictionValue::Text("6.5".to_string()))
        );
        assert_eq!(PredictionValue::from_json(&json!(null)), None);
        assert_eq!(PredictionValue::from_json(&json!({"label": 1})), None);
    }

    #[test]
    fn test_response_serializes_value_unchanged() {
        let body = PredictionResponse {
            prediction: PredictionValue::Number(7.8),
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"prediction": 7.8}));

        let body = PredictionResponse {
            prediction: PredictionValue::Text("7.8".to_string()),
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"prediction": "7.8"}));
    }

    #[test]
    fn test_schema_names_fields() {
        let schema = serde_json::to_string(&schemars::schema_for!(PredictionResponse)).unwrap();
        assert!(schema.contains("prediction"));
        let schema = serde_json::to_string(&schemars::schema_for!(ErrorResponse)).unwrap();
        assert!(schema.contains("error"));
    }
}
