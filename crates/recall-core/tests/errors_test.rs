use recall_core::errors::*;

#[test]
fn unknown_operator_carries_name() {
    let err = FilterError::UnknownOperator {
        operator: "LIKEISH".into(),
    };
    assert!(err.to_string().contains("LIKEISH"));
}

#[test]
fn invalid_operand_carries_field_and_expectation() {
    let err = FilterError::InvalidOperand {
        field: "importance_score".into(),
        operator: "BETWEEN".into(),
        expected: "a [low, high] pair".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("importance_score"));
    assert!(msg.contains("BETWEEN"));
    assert!(msg.contains("pair"));
}

#[test]
fn all_origins_failed_lists_origins() {
    let err = RetrievalError::AllOriginsFailed {
        origins: vec!["vector".into(), "lexical".into()],
    };
    assert_eq!(err.to_string(), "all origins failed: vector, lexical");
}

#[test]
fn timed_out_carries_budget() {
    let err = RetrievalError::TimedOut { timeout_ms: 250 };
    assert!(err.to_string().contains("250"));
}

// --- From impls ---

#[test]
fn filter_error_converts_to_recall_error() {
    let err: RecallError = FilterError::DepthExceeded { max_depth: 32 }.into();
    assert!(matches!(err, RecallError::FilterError(_)));
}

#[test]
fn retrieval_error_converts_to_recall_error() {
    let err: RecallError = RetrievalError::Cancelled.into();
    assert!(matches!(err, RecallError::RetrievalError(_)));
}

#[test]
fn embedding_error_converts_to_recall_error() {
    let err: RecallError = EmbeddingError::DimensionMismatch {
        expected: 384,
        actual: 128,
    }
    .into();
    assert!(matches!(err, RecallError::EmbeddingError(_)));
    assert!(err.to_string().contains("384"));
}

#[test]
fn config_error_converts_to_recall_error() {
    let err: RecallError = ConfigError::UnknownPreset {
        name: "turbo".into(),
    }
    .into();
    assert!(matches!(err, RecallError::ConfigError(_)));
}

#[test]
fn serde_error_converts_to_recall_error() {
    let serde_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: RecallError = serde_err.into();
    assert!(matches!(err, RecallError::SerializationError(_)));
}
