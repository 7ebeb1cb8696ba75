use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Which of the two signing secrets a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Signing configuration for [`TokenCodec`].
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    /// JWT algorithm name, e.g. `HS256`. Only HMAC algorithms are accepted.
    pub algorithm: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKeys {
    /// The lifetime must be representable and must not push `exp` past the
    /// range of a timestamp, otherwise issuance would fail on every request.
    fn from_secret(secret: &str, ttl_minutes: i64, kind: TokenKind) -> Result<Self, JwtError> {
        let ttl = Duration::try_minutes(ttl_minutes)
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| {
                JwtError::InvalidConfiguration(format!(
                    "{kind:?} token lifetime of {ttl_minutes} minutes is out of range"
                ))
            })?;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }
}

/// Issues and validates expiring access and refresh tokens.
///
/// Access and refresh tokens are signed with independent secrets, so a token
/// of one kind never validates as the other and a leaked refresh secret
/// cannot mint access tokens.
pub struct TokenCodec {
    access: SigningKeys,
    refresh: SigningKeys,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Build a codec from settings.
    ///
    /// # Errors
    /// * `InvalidConfiguration` - Empty or identical secrets, a non-HMAC or
    ///   unknown algorithm, a non-positive access TTL, or a refresh TTL that
    ///   is not longer than the access TTL
    pub fn new(settings: &TokenSettings) -> Result<Self, JwtError> {
        let algorithm: Algorithm = settings.algorithm.parse().map_err(|_| {
            JwtError::InvalidConfiguration(format!("unknown algorithm '{}'", settings.algorithm))
        })?;

        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(JwtError::InvalidConfiguration(format!(
                "algorithm '{}' is not an HMAC algorithm",
                settings.algorithm
            )));
        }

        if settings.access_secret.is_empty() || settings.refresh_secret.is_empty() {
            return Err(JwtError::InvalidConfiguration(
                "access and refresh secrets must not be empty".to_string(),
            ));
        }

        if settings.access_secret == settings.refresh_secret {
            return Err(JwtError::InvalidConfiguration(
                "access and refresh secrets must differ".to_string(),
            ));
        }

        if settings.access_ttl_minutes <= 0 {
            return Err(JwtError::InvalidConfiguration(
                "access token lifetime must be positive".to_string(),
            ));
        }

        if settings.refresh_ttl_minutes <= settings.access_ttl_minutes {
            return Err(JwtError::InvalidConfiguration(
                "refresh token lifetime must exceed access token lifetime".to_string(),
            ));
        }

        Ok(Self {
            access: SigningKeys::from_secret(
                &settings.access_secret,
                settings.access_ttl_minutes,
                TokenKind::Access,
            )?,
            refresh: SigningKeys::from_secret(
                &settings.refresh_secret,
                settings.refresh_ttl_minutes,
                TokenKind::Refresh,
            )?,
            algorithm,
        })
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Sign an access token for `claims`, valid for the access TTL.
    pub fn issue_access(&self, claims: &Claims) -> Result<String, JwtError> {
        self.issue(claims, TokenKind::Access)
    }

    /// Sign a refresh token for `claims`, valid for the refresh TTL.
    pub fn issue_refresh(&self, claims: &Claims) -> Result<String, JwtError> {
        self.issue(claims, TokenKind::Refresh)
    }

    fn issue(&self, claims: &Claims, kind: TokenKind) -> Result<String, JwtError> {
        let keys = self.keys(kind);
        let now = Utc::now();

        let expires_at = now.checked_add_signed(keys.ttl).ok_or_else(|| {
            JwtError::EncodingFailed(format!("{kind:?} token expiry is out of range"))
        })?;

        let claims = claims
            .payload()
            .with_issued_at(now.timestamp())
            .with_expiration(expires_at.timestamp());

        encode(&Header::new(self.algorithm), &claims, &keys.encoding)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a token of the given kind against the current time.
    ///
    /// # Errors
    /// * `TokenExpired` - Signature is valid but `exp` is not in the future
    /// * `InvalidToken` - Signature, structure, algorithm or required claims
    ///   do not match
    pub fn decode(&self, token: &str, kind: TokenKind) -> Result<Claims, JwtError> {
        self.decode_at(token, kind, Utc::now().timestamp())
    }

    /// Same as [`TokenCodec::decode`] with an explicit clock.
    pub fn decode_at(&self, token: &str, kind: TokenKind, now: i64) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against `now` so that `exp == now` is expired.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.keys(kind).decoding, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?
            .claims;

        if claims.is_expired(now) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}
