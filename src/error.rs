//! Error types for signature composition.

pub type SignatureResult<T> = Result<T, SignatureError>;

/// Failures that abort a whole render.
///
/// Pattern, icon and colour problems are absorbed inside the compositor and
/// never show up here; only the logo and the output surface are load-bearing.
#[derive(thiserror::Error, Debug)]
pub enum SignatureError {
    #[error("logo decode error: {0}")]
    LogoDecode(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

impl SignatureError {
    pub fn logo_decode(msg: impl Into<String>) -> Self {
        Self::LogoDecode(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Failures raised while painting a background pattern.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    #[error("cannot allocate a {width}x{height} pattern surface")]
    Surface { width: u32, height: u32 },

    #[error("degenerate gradient in {0}")]
    Gradient(&'static str),

    #[error("degenerate path in {0}")]
    Path(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            SignatureError::logo_decode("x")
                .to_string()
                .contains("logo decode error:")
        );
        assert!(SignatureError::surface("x").to_string().contains("surface error:"));
        assert!(SignatureError::encode("x").to_string().contains("encode error:"));
        assert!(SignatureError::config("x").to_string().contains("config error:"));
    }

    #[test]
    fn pattern_error_is_transparent() {
        let err: SignatureError = PatternError::Gradient("gradient-rings").into();
        assert_eq!(err.to_string(), "degenerate gradient in gradient-rings");
    }
}
