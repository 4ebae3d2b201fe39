use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::{DateTime, Duration, Utc};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    TimeOptions,
    Token,
    UntrustedToken,
};
use serde::{Deserialize, Serialize};

use miniapp_engine::db_types::User;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// Access tokens live this long from issuance. There is no refresh and no revocation list; a
/// compromised token is only bounded by this window.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;
const EXPECTED_ALG: &str = "HS256";

/// The custom claims carried by an access token: the durable key of the local account and the
/// Telegram id it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub user_id: i64,
    pub telegram_id: i64,
}

/// Extracts validated claims that [`crate::middleware::JwtMiddlewareFactory`] placed in the
/// request extensions. Reaching a handler without them means the route was not wrapped in the
/// middleware, which is treated as unauthenticated rather than an internal error.
impl FromRequest for JwtClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req
            .extensions()
            .get::<JwtClaims>()
            .cloned()
            .ok_or_else(|| ServerError::Unauthenticated(AuthError::MissingToken).into());
        ready(claims)
    }
}

/// Issues and validates the HS256 access tokens that authenticate every protected request.
#[derive(Clone)]
pub struct TokenIssuer {
    key: Hs256Key,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: Hs256Key::new(config.jwt_secret.reveal().as_bytes()) }
    }

    /// Issue a new access token for the given user account.
    /// This method DOES NOT verify launch data. That must be done before resolving the account.
    pub fn issue_token(&self, user: &User) -> Result<String, ServerError> {
        self.issue_token_at(user, &TimeOptions::default())
    }

    /// Issue a token against an explicit clock. Only tests need a clock other than `Utc::now`.
    pub fn issue_token_at<F>(&self, user: &User, time_options: &TimeOptions<F>) -> Result<String, ServerError>
    where F: Fn() -> DateTime<Utc> {
        let custom = JwtClaims { user_id: user.id, telegram_id: user.telegram_id };
        let now = (time_options.clock_fn)();
        let claims = Claims::new(custom)
            .set_duration_and_issuance(time_options, Duration::hours(TOKEN_LIFETIME_HOURS))
            .set_not_before(now);
        let header = Header::empty().with_token_type("JWT");
        Hs256
            .token(&header, &claims, &self.key)
            .map_err(|e| ServerError::InternalSigningFault(format!("{e}")))
    }

    /// Validate a bearer token and return its claims.
    ///
    /// Rejects, in order: unparseable structure, any header algorithm other than HS256 (before a
    /// single byte of signature work), signature mismatch, and a validity window that does not
    /// contain the current time.
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let untrusted =
            UntrustedToken::new(token).map_err(|e| AuthError::PoorlyFormattedToken(format!("{e}")))?;
        if untrusted.algorithm() != EXPECTED_ALG {
            return Err(AuthError::AlgorithmMismatch(untrusted.algorithm().to_string()));
        }
        let token: Token<JwtClaims> = Hs256
            .validator(&self.key)
            .validate(&untrusted)
            .map_err(|e| AuthError::ValidationError(format!("{e}")))?;
        let time_options = TimeOptions::default();
        token
            .claims()
            .validate_expiration(&time_options)
            .and_then(|claims| claims.validate_maturity(&time_options))
            .map_err(|_| AuthError::OutsideValidityWindow)?;
        Ok(token.claims().custom.clone())
    }
}
