//! Error types for router tree construction, dispatch and history control.

use thiserror::Error;

/// Errors raised by the router tree, the manager and the location stores.
///
/// All of these are programming or configuration errors. They are raised
/// at the point of violation and propagate to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// A required declaration field is empty.
    #[error("Router declaration is missing required field '{field}'")]
    MissingField { field: &'static str },

    /// A second root-level router was declared.
    #[error("Cannot add root router '{name}': root '{existing}' already exists")]
    DuplicateRoot { existing: String, name: String },

    /// The declared parent does not exist in the tree.
    #[error("Parent router '{parent}' for '{name}' not found")]
    ParentNotFound { parent: String, name: String },

    /// Router names must be unique across the whole tree.
    #[error("Router name '{name}' is already in use")]
    DuplicateName { name: String },

    /// Route keys must be unique across the whole tree.
    #[error("Route key '{route_key}' of router '{name}' is already in use")]
    DuplicateRouteKey { route_key: String, name: String },

    /// A router forced onto the pathname sits under a query-parameter parent.
    #[error("Router '{name}' is configured as a path router but its parent '{parent}' is not")]
    PathRouterUnderQueryParent { name: String, parent: String },

    /// `go(0)` was requested on a location store.
    #[error("History offset must be non-zero")]
    InvalidHistoryOffset,

    /// The state store has no record for the router yet.
    #[error("State for router '{name}' is not available")]
    StateUnavailable { name: String },

    /// No router with this name exists.
    #[error("Router '{name}' not found")]
    UnknownRouter { name: String },

    /// The router type has no registered template.
    #[error("No template registered for router type '{kind}'")]
    UnknownTemplate { kind: String },

    /// The router's template does not define this action.
    #[error("Router '{name}' has no action '{action}'")]
    UnknownAction { name: String, action: String },

    /// The root can only go away together with its manager.
    #[error("Root router '{name}' cannot be removed")]
    RootRemoval { name: String },
}

/// Result alias used throughout the crate.
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_router() {
        let err = RouterError::DuplicateRouteKey {
            route_key: "m".to_string(),
            name: "modal".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Route key 'm' of router 'modal' is already in use"
        );
    }

    #[test]
    fn test_missing_field_message() {
        let err = RouterError::MissingField { field: "name" };
        assert!(err.to_string().contains("'name'"));
    }
}
