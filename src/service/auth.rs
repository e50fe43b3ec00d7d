use crate::error::{Result, SheetError};

/// Environment variable read by [`GoogleAuth::from_env`]
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Signed credential shared by the Sheets and Drive clients.
///
/// Token acquisition happens elsewhere; this only carries the bearer token.
#[derive(Clone)]
pub struct GoogleAuth {
    access_token: String,
}

impl GoogleAuth {
    pub fn new(access_token: impl Into<String>) -> Self {
        GoogleAuth {
            access_token: access_token.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Ok(GoogleAuth::new(token.trim())),
            _ => Err(SheetError::Config(format!("{} is not set", ACCESS_TOKEN_ENV))),
        }
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for GoogleAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAuth")
            .field("access_token_len", &self.access_token.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_token() {
        let auth = GoogleAuth::new("secret-token");
        let printed = format!("{:?}", auth);
        assert!(!printed.contains("secret-token"));
        assert_eq!(auth.authorization_header(), "Bearer secret-token");
    }
}
