use std::fmt;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigReadFailed,
    ConfigParseError,
    InvalidLocation,
    UnknownRoute,
    CollectionNotLoaded,
    NotCollectionOwner,
    SignInRequired,
    CreateModeMutation,
    ScriptParseError,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigReadFailed => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InvalidLocation => "E2001",
            Self::UnknownRoute => "E2002",
            Self::CollectionNotLoaded => "E3001",
            Self::NotCollectionOwner => "E3002",
            Self::SignInRequired => "E3003",
            Self::CreateModeMutation => "E3004",
            Self::ScriptParseError => "E4001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigReadFailed => "Config file could not be read",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidLocation => "Malformed page location",
            Self::UnknownRoute => "Location is not a collection page",
            Self::CollectionNotLoaded => "Collection not loaded",
            Self::NotCollectionOwner => "Viewer does not own this collection",
            Self::SignInRequired => "Sign-in required",
            Self::CreateModeMutation => "No collection exists yet in create mode",
            Self::ScriptParseError => "Event script parse error",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigReadFailed => Some("Check permissions on .shelf/config.toml."),
            Self::ConfigParseError => Some("Fix syntax in .shelf/config.toml and retry."),
            Self::InvalidLocation => {
                Some("Use /{lang}/{app}/collections/{user}/{slug}/ or /{lang}/{app}/collections/add/.")
            }
            Self::UnknownRoute => Some("Only collection detail, edit and add pages are handled."),
            Self::CollectionNotLoaded => Some("Wait for the collection to load before editing it."),
            Self::NotCollectionOwner => None,
            Self::SignInRequired => Some("Sign in as the collection author first."),
            Self::CreateModeMutation => Some("Create the collection before changing its add-ons."),
            Self::ScriptParseError => {
                Some("Scripts are a JSON array of events; see `shelf replay --help`.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
