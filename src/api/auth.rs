use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::auth::{AuthToken, AUTH_TOKEN_COOKIE};
use crate::model::AccountId;

pub fn routes() -> Vec<Route> {
    routes![login, logout]
}

/// Issue a signed identity cookie for the given account. All mutating
/// election routes resolve the caller's identity from this cookie.
#[post("/auth/login", data = "<request>", format = "json")]
fn login(request: Json<LoginRequest>, cookies: &CookieJar<'_>, config: &State<Config>) -> Result<()> {
    let request = request.0;
    if request.account_id.is_empty() {
        return Err(Error::Unauthorized("Empty account ID".to_string()));
    }
    let token = AuthToken::new(request.account_id);
    cookies.add(token.into_cookie(config));
    Ok(())
}

#[post("/auth/logout")]
fn logout(cookies: &CookieJar<'_>) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

/// An identity claim. There is no credential to verify: authentication
/// proper is delegated to the deployment environment.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    pub account_id: AccountId,
}
