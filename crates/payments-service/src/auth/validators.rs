//! Claim validator chain.
//!
//! Issuer and audience checks are policy decisions layered on top of the
//! structural verification done by the token verifier. Each validator is a
//! pure function of the claims; the chain runs them in order and stops at
//! the first failure. New checks are added by appending to the chain, not
//! by touching the verifier.

use crate::auth::claims::Claims;
use crate::errors::AuthError;

/// A single, independently testable claim check.
pub trait ClaimValidator: Send + Sync {
    /// Short identifier used in diagnostics.
    fn name(&self) -> &'static str;

    /// Validate one aspect of the claims.
    ///
    /// # Errors
    ///
    /// Returns the validator-specific [`AuthError`] on mismatch.
    fn validate(&self, claims: &Claims) -> Result<(), AuthError>;
}

/// Requires the `iss` claim to exactly equal the configured issuer URI.
pub struct IssuerValidator {
    expected: String,
}

impl IssuerValidator {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl ClaimValidator for IssuerValidator {
    fn name(&self) -> &'static str {
        "issuer"
    }

    fn validate(&self, claims: &Claims) -> Result<(), AuthError> {
        if claims.iss == self.expected {
            Ok(())
        } else {
            Err(AuthError::IssuerMismatch)
        }
    }
}

/// Requires the `aud` claim set to contain the configured audience.
pub struct AudienceValidator {
    expected: String,
}

impl AudienceValidator {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl ClaimValidator for AudienceValidator {
    fn name(&self) -> &'static str {
        "audience"
    }

    fn validate(&self, claims: &Claims) -> Result<(), AuthError> {
        if claims.aud.iter().any(|aud| aud == &self.expected) {
            Ok(())
        } else {
            Err(AuthError::AudienceMismatch)
        }
    }
}

/// Ordered chain of claim validators with short-circuit semantics.
pub struct ValidatorChain {
    validators: Vec<Box<dyn ClaimValidator>>,
}

impl ValidatorChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Append a validator to the chain.
    #[must_use]
    pub fn with(mut self, validator: impl ClaimValidator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// The standard chain: issuer match, then audience match.
    pub fn standard(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self::new()
            .with(IssuerValidator::new(issuer))
            .with(AudienceValidator::new(audience))
    }

    /// Run every validator in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the failing validator's [`AuthError`].
    pub fn validate(&self, claims: &Claims) -> Result<(), AuthError> {
        for validator in &self.validators {
            if let Err(e) = validator.validate(claims) {
                tracing::debug!(
                    target: "payments.auth.claims",
                    validator = validator.name(),
                    "Claim validation failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

impl Default for ValidatorChain {
    fn default() -> Self {
        Self::new()
    }
}
