//! Provider credential lookup

use secrecy::SecretString;
use std::collections::HashMap;

use crate::error::ConvertError;
use crate::registry::Provider;

/// Where provider API keys come from.
pub trait CredentialSource: Send + Sync {
    fn lookup(&self, var: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl CredentialSource for ProcessEnv {
    fn lookup(&self, var: &str) -> Option<String> {
        std::env::var(var).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn lookup(&self, var: &str) -> Option<String> {
        self.get(var).cloned()
    }
}

/// The provider's API key. Missing or blank values are an error.
pub fn require_credential(
    provider: Provider,
    source: &dyn CredentialSource,
) -> Result<SecretString, ConvertError> {
    let var = provider.credential_var();
    match source.lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
        _ => Err(ConvertError::Credential { provider, var }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn present_key_is_returned() {
        let env = HashMap::from([("OPENAI_API_KEY".to_string(), "sk-123".to_string())]);
        let key = require_credential(Provider::OpenAi, &env).expect("key");
        assert_eq!(key.expose_secret(), "sk-123");
    }

    #[test]
    fn missing_or_blank_key_fails_for_every_provider() {
        for provider in Provider::ALL {
            let empty: HashMap<String, String> = HashMap::new();
            assert!(matches!(
                require_credential(provider, &empty),
                Err(ConvertError::Credential { var, .. }) if var == provider.credential_var()
            ));

            let blank = HashMap::from([(provider.credential_var().to_string(), "  ".to_string())]);
            assert!(require_credential(provider, &blank).is_err());
        }
    }
}
