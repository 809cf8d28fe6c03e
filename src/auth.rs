use crate::error::AppError;
use crate::routes::AppState;
use crate::schemas::OwnerId;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::num::ParseIntError;

type HmacSha256 = Hmac<Sha256>;

/// Signed identity carried as JSON in the `Authorization` header.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OwnerToken {
    pub username: OwnerId,
    pub issued_at: String,
    pub hash: String,
}

impl OwnerToken {
    pub fn sign(username: impl Into<OwnerId>, issued_at: impl Into<String>, secret: &str) -> Self {
        let username = username.into();
        let issued_at = issued_at.into();
        let hash = compute_hash(&username, &issued_at, secret)
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect();
        OwnerToken {
            username,
            issued_at,
            hash,
        }
    }

    pub fn verify(&self, secret: &str) -> Option<&OwnerId> {
        let hash = decode_hex(&self.hash)?;
        let mut mac = keyed_mac(secret);
        mac.update(data_check_string(&self.username, &self.issued_at).as_bytes());
        mac.verify_slice(&hash).ok().map(|_| &self.username)
    }

    pub fn to_header(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// The authenticated user behind a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Owner(pub OwnerId);

pub fn check_owner(request: &HttpRequest, secret: &str) -> Option<OwnerId> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(header::HeaderValue::to_str)?
        .ok()?;
    let token: OwnerToken = serde_json::from_str(authorization).ok()?;
    token.verify(secret).cloned()
}

impl FromRequest for Owner {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let owner = req
            .app_data::<web::Data<AppState>>()
            .and_then(|state| check_owner(req, &state.auth_secret));
        match owner {
            Some(owner) => ready(Ok(Owner(owner))),
            None => {
                log::debug!("rejected request to {} without a valid owner token", req.path());
                ready(Err(AppError::Unauthorized))
            }
        }
    }
}

fn decode_hex(hash: &str) -> Option<Vec<u8>> {
    if hash.len() % 2 != 0 {
        return None;
    }
    hash.chars()
        .collect::<Vec<_>>()
        .chunks(2)
        .map(|n| u8::from_str_radix(&String::from_iter(n), 16))
        .collect::<Result<Vec<u8>, ParseIntError>>()
        .ok()
}

fn data_check_string(username: &str, issued_at: &str) -> String {
    [("issued_at", issued_at), ("username", username)]
        .into_iter()
        .map(|(key, val)| format!("{key}={val}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn keyed_mac(secret: &str) -> HmacSha256 {
    let mut sha256_hasher = Sha256::new();
    sha256_hasher.update(secret.as_bytes());
    let secret_hash = sha256_hasher.finalize();
    // HMAC accepts keys of any length.
    HmacSha256::new_from_slice(&secret_hash).expect("hmac key of any size")
}

fn compute_hash(username: &str, issued_at: &str, secret: &str) -> Vec<u8> {
    let mut mac = keyed_mac(secret);
    mac.update(data_check_string(username, issued_at).as_bytes());
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    const SECRET: &str = "s3cret";

    #[test]
    fn signed_token_verifies() {
        let token = OwnerToken::sign("thiago", "2024-03-01T10:00:00Z", SECRET);
        assert_eq!(token.hash.len(), 64);
        assert_eq!(token.verify(SECRET), Some(&"thiago".to_string()));
    }

    #[test]
    fn tampered_or_foreign_tokens_fail() {
        let mut token = OwnerToken::sign("thiago", "2024-03-01T10:00:00Z", SECRET);
        assert_eq!(token.verify("other secret"), None);

        token.username = "maria".into();
        assert_eq!(token.verify(SECRET), None);

        token.hash = "zz".into();
        assert_eq!(token.verify(SECRET), None);

        token.hash = "abc".into();
        assert_eq!(token.verify(SECRET), None);
    }

    #[test]
    fn owner_is_read_from_authorization_header() {
        let token = OwnerToken::sign("thiago", "now", SECRET);
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, token.to_header()))
            .to_http_request();
        assert_eq!(check_owner(&req, SECRET), Some("thiago".to_string()));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer thiago"))
            .to_http_request();
        assert_eq!(check_owner(&req, SECRET), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(check_owner(&req, SECRET), None);
    }
}
