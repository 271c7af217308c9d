//! Signing algorithm selection for the token codec

use jsonwebtoken::Algorithm;

use crate::errors::DomainError;

/// Algorithms the codec accepts: the HMAC family, keyed by the shared secret
pub const SUPPORTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Resolve the configured algorithm name, rejecting non-HMAC algorithms
pub(crate) fn resolve_algorithm(name: &str) -> Result<Algorithm, DomainError> {
    let algorithm: Algorithm = name
        .trim()
        .to_uppercase()
        .parse()
        .map_err(|_| DomainError::Internal {
            message: format!("Unknown signing algorithm: {}", name),
        })?;

    if !SUPPORTED_ALGORITHMS.contains(&algorithm) {
        return Err(DomainError::Internal {
            message: format!("Signing algorithm {:?} requires key material; use an HMAC algorithm", algorithm),
        });
    }

    Ok(algorithm)
}
