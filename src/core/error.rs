//! Gameplay error type

/// Errors surfaced while setting up or configuring the simulation.
///
/// Per-tick gameplay never fails: unknown state keys, short patrol routes and
/// missing attack prototypes degrade silently. Only setup-time problems end
/// up here.
#[derive(Debug, Clone, PartialEq)]
pub enum GameplayError {
    /// A collaborator required at initialization is absent
    MissingDependency(String),
    /// Tuning names an attack prototype the config does not define
    UnknownPrototype(String),
    /// IO error reading or writing a config file
    Io(String),
    /// Serialization error
    Serialize(String),
    /// Deserialization error
    Deserialize(String),
}

impl std::fmt::Display for GameplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDependency(what) => write!(f, "Missing dependency: {what}"),
            Self::UnknownPrototype(name) => write!(f, "Unknown attack prototype: {name}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for GameplayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_dependency() {
        let err = GameplayError::MissingDependency("player".to_string());
        assert_eq!(err.to_string(), "Missing dependency: player");

        let err = GameplayError::UnknownPrototype("Snowball".to_string());
        assert!(err.to_string().contains("Snowball"));
    }
}
