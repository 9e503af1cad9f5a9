//! The session cookie, built from `[cookie]`.

use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use tg_domain::config::CookieConfig;

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(cfg: &CookieConfig, token: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build((cfg.name.clone(), token.to_owned()))
        .http_only(cfg.http_only)
        .secure(cfg.secure)
        .same_site(SameSite::Lax)
        .path(cfg.path.clone())
        .max_age(Duration::seconds(cfg.max_age_secs))
        .build();
    if let Some(domain) = &cfg.domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

/// Removal cookie.  Path and domain must match the issued cookie or the
/// browser keeps the old one.
pub fn clear_session_cookie(cfg: &CookieConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((cfg.name.clone(), ""))
        .http_only(cfg.http_only)
        .secure(cfg.secure)
        .same_site(SameSite::Lax)
        .path(cfg.path.clone())
        .max_age(Duration::ZERO)
        .build();
    if let Some(domain) = &cfg.domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

/// Whether a response already sets the cookie called `name`.
pub fn sets_cookie(headers: &HeaderMap, name: &str) -> bool {
    headers.get_all(SET_COOKIE).iter().any(|v| {
        v.to_str()
            .ok()
            .and_then(|s| s.split_once('='))
            .is_some_and(|(n, _)| n.trim() == name)
    })
}
