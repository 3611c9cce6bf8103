use std::fmt;

/// Entry point that built the request context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    /// Lending API call on behalf of a (possibly unauthenticated) user
    API,

    /// Administrative CLI command
    CLI,
}

impl fmt::Display for RequestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::API => "api",
            Self::CLI => "cli",
        })
    }
}
