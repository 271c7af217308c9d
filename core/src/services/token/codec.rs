//! Stateless encode/decode of signed tokens

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tp_shared::TokenConfig;
use tracing::{debug, error, warn};

use crate::domain::entities::token::{ClaimMap, Claims, TokenKind, VerifiedToken};
use crate::errors::{DomainError, TokenError};

use super::config::resolve_algorithm;

/// Signs and validates tokens for one [`TokenConfig`].
///
/// The codec holds no mutable state; build one per configuration and share
/// it. Reconfiguring means constructing a new codec.
#[derive(Clone)]
pub struct TokenCodec {
    config: TokenConfig,
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lenient_validation: Validation,
}

impl TokenCodec {
    /// Creates a codec for the given configuration
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Internal` when the configured algorithm is not
    /// an HMAC algorithm, or when the built-in development secret is in use
    /// but forbidden by the configuration.
    pub fn new(config: TokenConfig) -> Result<Self, DomainError> {
        let algorithm = resolve_algorithm(&config.algorithm)?;

        if config.is_using_default_secret() {
            if !config.allow_default_secret {
                error!("Refusing to sign tokens with the built-in development secret");
                return Err(DomainError::Internal {
                    message: "TOKEN_SECRET must be set; the development secret is not allowed here"
                        .to_string(),
                });
            }
            warn!("Token codec is using the built-in development secret");
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["sub"]);

        let mut lenient_validation = validation.clone();
        lenient_validation.validate_exp = false;

        Ok(Self {
            config,
            algorithm,
            encoding_key,
            decoding_key,
            validation,
            lenient_validation,
        })
    }

    /// Configuration this codec was built from
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Lifetime in seconds for tokens of `kind`
    pub fn ttl_for(&self, kind: TokenKind) -> u64 {
        match kind {
            TokenKind::Access => self.config.access_ttl,
            TokenKind::Refresh => self.config.refresh_ttl,
        }
    }

    /// Produces a signed token expiring `ttl` seconds from now.
    ///
    /// With `ttl = None` the token carries no `exp` claim and stays valid
    /// until the secret changes. Expiry is still enforced for every token
    /// that has one.
    pub fn encode(
        &self,
        subject: &str,
        kind: TokenKind,
        payload: Option<ClaimMap>,
        header: Option<ClaimMap>,
        ttl: Option<u64>,
        sid: &str,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(subject, kind, sid, payload, header, ttl);
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(|e| {
            TokenError::Unknown {
                message: format!("Failed to sign {} token: {}", kind, e),
            }
        })
    }

    /// Verifies signature, structure and expiry, returning the claims
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(classify)
    }

    /// Subject of a correctly signed token, ignoring expiry.
    ///
    /// Returns `None` for anything that does not carry a valid signature.
    pub fn subject_lenient(&self, token: &str) -> Option<String> {
        decode::<Claims>(token, &self.decoding_key, &self.lenient_validation)
            .map(|data| data.claims.sub)
            .ok()
    }

    /// Decodes the token and checks it is of the expected kind.
    ///
    /// The kind check only runs once signature and expiry have passed.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<VerifiedToken, TokenError> {
        let claims = self.decode(token)?;
        if claims.kind != expected {
            debug!(expected = %expected, actual = %claims.kind, "Token kind mismatch");
            return Err(TokenError::WrongType {
                expected,
                actual: claims.kind,
            });
        }
        Ok(claims.into())
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.config.access_ttl)
            .field("refresh_ttl", &self.config.refresh_ttl)
            .field("leeway", &self.config.leeway)
            .finish_non_exhaustive()
    }
}

/// Map a decoding failure onto the token error taxonomy
pub(crate) fn classify(err: JwtError) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::TtlExpired,
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature => TokenError::IncorrectToken,
        _ => TokenError::Unknown {
            message: err.to_string(),
        },
    }
}
