use actix_web::{
    FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
    Error as ActixError,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};

use crate::config::Config;
use crate::database::models::{Actor, Role};

/// Bearer token payload. Tokens are issued elsewhere; this service only
/// verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64, // user id
    pub email: String,
    pub role: Role,
    pub tenant_id: Option<i64>,
    pub exp: usize, // expiration time
}

impl Claims {
    /// Users without an explicit tenant are their own tenant.
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub, self.role, self.tenant_id.unwrap_or(self.sub))
    }
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(token_data.claims)
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        let (Some(token), Some(config)) = (token, req.app_data::<Data<Config>>()) else {
            return ready(Err(ErrorUnauthorized(
                "Missing or invalid authorization header",
            )));
        };

        match decode_token(token, &config.jwt_secret) {
            Ok(claims) => ready(Ok(claims)),
            Err(err) => {
                log::debug!("Rejected bearer token: {}", err);
                ready(Err(ErrorUnauthorized("Invalid token")))
            }
        }
    }
}
