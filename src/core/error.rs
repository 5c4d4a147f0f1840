use serde::Serialize;

pub type CalcResult<T> = Result<T, CalcError>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ValidationError,
    CalculationError,
}

/// Failure raised by either engine. Validation failures name the offending
/// field; calculation failures come from guards inside the arithmetic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("{message}")]
    Calculation { message: String },
}

impl CalcError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn calculation(message: impl Into<String>) -> Self {
        Self::Calculation {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::ValidationError,
            Self::Calculation { .. } => ErrorKind::CalculationError,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::Calculation { .. } => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::ValidationError
    }

    /// Text shown to the user: validation messages verbatim, calculation
    /// failures behind a generic prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::Calculation { message } => format!("計算エラー: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_field_and_kind() {
        let err = CalcError::validation("annualIncome", "年収は0以上で入力してください");
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(err.field(), Some("annualIncome"));
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "年収は0以上で入力してください");
    }

    #[test]
    fn calculation_error_is_prefixed_for_display() {
        let err = CalcError::calculation("計算結果が無限大または無効な値になりました");
        assert_eq!(err.kind(), ErrorKind::CalculationError);
        assert_eq!(err.field(), None);
        assert_eq!(
            err.user_message(),
            "計算エラー: 計算結果が無限大または無効な値になりました"
        );
        assert_eq!(err.to_string(), "計算結果が無限大または無効な値になりました");
    }

    #[test]
    fn kind_serializes_as_type_tag() {
        let json = serde_json::to_string(&ErrorKind::ValidationError).expect("serialize");
        assert_eq!(json, "\"VALIDATION_ERROR\"");
        let json = serde_json::to_string(&ErrorKind::CalculationError).expect("serialize");
        assert_eq!(json, "\"CALCULATION_ERROR\"");
    }
}
