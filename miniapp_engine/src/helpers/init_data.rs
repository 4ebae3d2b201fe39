//! # Telegram Mini App launch data
//!
//! When Telegram opens a Mini App, it hands the web view a signed query string (`init_data`)
//! proving the invoking user's identity. We cannot take the embedded user object at face value,
//! since anyone can POST an arbitrary payload at the auth endpoint; the payload has to be
//! verified against the bot token that only Telegram and this service know.
//!
//! ## Verification scheme
//!
//! The Bot API fixes the scheme, so it must be reproduced exactly:
//!
//! 1. Drop the `hash` field from the decoded key/value pairs.
//! 2. Render every remaining pair as `key=value`, with the value percent-decoded but otherwise
//!    verbatim.
//! 3. Sort the rendered strings lexicographically by byte value (the full `key=value` string,
//!    not the key alone) and join them with `\n` to form the data-check string.
//! 4. Derive the secret key as `HMAC-SHA256(key = "WebAppData", msg = bot_token)`.
//! 5. The signature is `HMAC-SHA256(key = secret_key, msg = data_check_string)`, lowercase hex.
//!
//! A payload without a `hash` field never verifies. Verification failure reports nothing about
//! which byte differed.

use hmac::{Hmac, Mac};
use percent_encoding::percent_decode_str;
use sha2::Sha256;
use thiserror::Error;
use url::form_urlencoded;

use crate::db_types::TelegramUser;

type HmacSha256 = Hmac<Sha256>;

/// The HMAC key-derivation domain constant fixed by the Bot API.
const HMAC_DOMAIN: &[u8] = b"WebAppData";
/// The query-string field carrying the signature.
const SIGNATURE_FIELD: &str = "hash";

#[derive(Debug, Clone, Error)]
pub enum InitDataError {
    #[error("Launch data is empty")]
    Empty,
    #[error("Launch data has no user field")]
    MissingUser,
    #[error("The user field is not a valid user object. {0}")]
    InvalidUserJson(String),
    #[error("The user id is not a valid 64-bit integer. {0}")]
    InvalidUserId(String),
    #[error("Launch data carries no signature")]
    MissingSignature,
    #[error("Launch data signature mismatch")]
    InvalidSignature,
}

/// The decoded launch payload for a single authentication attempt. Never persisted.
#[derive(Debug, Clone)]
pub struct InitData {
    /// All decoded pairs except `hash`, in wire order.
    fields: Vec<(String, String)>,
    signature: Option<String>,
    user: TelegramUser,
}

impl InitData {
    /// Decode the raw query-string payload and extract the identity claim.
    ///
    /// No signature checks happen here; call [`InitData::verify`] before trusting the claim.
    pub fn parse(raw: &str) -> Result<Self, InitDataError> {
        if raw.trim().is_empty() {
            return Err(InitDataError::Empty);
        }
        let mut fields = Vec::new();
        let mut signature = None;
        let mut user_json = None;
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            let (key, value) = (key.into_owned(), value.into_owned());
            if key == SIGNATURE_FIELD {
                signature = Some(value);
                continue;
            }
            if key == "user" {
                user_json = Some(value.clone());
            }
            fields.push((key, value));
        }
        let user_json = user_json.ok_or(InitDataError::MissingUser)?;
        let user = parse_user(&user_json)?;
        Ok(Self { fields, signature, user })
    }

    pub fn user(&self) -> &TelegramUser {
        &self.user
    }

    /// Recompute the expected signature under `bot_token` and compare it to the supplied one.
    /// The comparison runs in constant time over the decoded digest.
    ///
    /// A payload without a signature fails closed with [`InitDataError::MissingSignature`].
    pub fn verify(&self, bot_token: &str) -> Result<(), InitDataError> {
        let claimed = self.signature.as_deref().ok_or(InitDataError::MissingSignature)?;
        let claimed = hex::decode(claimed).map_err(|_| InitDataError::InvalidSignature)?;
        let mut mac = derived_mac(bot_token);
        mac.update(data_check_string(&self.fields).as_bytes());
        mac.verify_slice(&claimed).map_err(|_| InitDataError::InvalidSignature)
    }
}

/// Render, sort and join the data-check fields per the Bot API rules.
fn data_check_string(fields: &[(String, String)]) -> String {
    let mut lines = fields.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<String>>();
    lines.sort_unstable();
    lines.join("\n")
}

/// Build the HMAC keyed with the per-bot secret key derived from `bot_token`.
fn derived_mac(bot_token: &str) -> HmacSha256 {
    let mut derivation =
        HmacSha256::new_from_slice(HMAC_DOMAIN).expect("HMAC-SHA256 accepts keys of any length");
    derivation.update(bot_token.as_bytes());
    let secret_key = derivation.finalize().into_bytes();
    HmacSha256::new_from_slice(&secret_key).expect("HMAC-SHA256 accepts keys of any length")
}

fn parse_user(json: &str) -> Result<TelegramUser, InitDataError> {
    match serde_json::from_str(json) {
        Ok(user) => Ok(user),
        Err(first_err) => {
            // Some clients double-encode the user payload. Undo one more layer before giving up,
            // but report the first error: that is the one describing the wire value.
            let retry = percent_decode_str(json)
                .decode_utf8()
                .ok()
                .and_then(|decoded| serde_json::from_str(&decoded).ok());
            retry.ok_or_else(|| InitDataError::InvalidUserJson(first_err.to_string()))
        },
    }
}

/// Parse the legacy flat-parameter form (`user_id=...&username=...`).
///
/// This variant carries no signature and exists purely as a shim for unsigned local-development
/// payloads; it must never be reachable in a deployment that verifies launch data.
pub fn parse_legacy_test_params(raw: &str) -> Result<TelegramUser, InitDataError> {
    if raw.trim().is_empty() {
        return Err(InitDataError::Empty);
    }
    let mut claim = TelegramUser::default();
    let mut id = None;
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            "user_id" => {
                id = Some(
                    value.parse::<i64>().map_err(|e| InitDataError::InvalidUserId(e.to_string()))?,
                )
            },
            "username" => claim.username = Some(value.into_owned()),
            "first_name" => claim.first_name = Some(value.into_owned()),
            "last_name" => claim.last_name = Some(value.into_owned()),
            _ => {},
        }
    }
    match id {
        Some(id) => Ok(TelegramUser { id, ..claim }),
        None => Err(InitDataError::MissingUser),
    }
}
