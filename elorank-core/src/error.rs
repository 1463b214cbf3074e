/// Error taxonomy for the ranking engine.
///
/// Every error is raised synchronously by the call that violates the contract.
/// A failed call never leaves the engine partially mutated.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RankingError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankingError {
    /// An item with this id is already registered.
    #[error("Item already exists: {id}")]
    DuplicateItem { id: String },

    /// No item with this id is registered.
    #[error("Item not found: {id}")]
    ItemNotFound { id: String },

    /// Both sides of a comparison name the same item.
    #[error("Cannot compare item {id} against itself")]
    SelfComparison { id: String },

    /// A numeric parameter falls outside its accepted range.
    #[error("Invalid {parameter} = {value}: {reason}")]
    ConfigurationRange {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// No opponent could be found for the least-compared item.
    #[error("No opponent available for item {id}")]
    NoOpponent { id: String },
}

impl RankingError {
    pub(crate) fn not_found(id: &str) -> Self {
        RankingError::ItemNotFound { id: id.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_item() {
        let err = RankingError::not_found("apple");
        assert_eq!(err.to_string(), "Item not found: apple");

        let err = RankingError::SelfComparison { id: "pear".into() };
        assert!(err.to_string().contains("pear"));
    }

    #[test]
    fn test_configuration_range_message() {
        let err = RankingError::ConfigurationRange {
            parameter: "k_factor",
            value: -1.0,
            reason: "must be a positive finite number",
        };
        assert_eq!(
            err.to_string(),
            "Invalid k_factor = -1: must be a positive finite number"
        );
    }
}
