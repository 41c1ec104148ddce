//! Refresh token cookie

use actix_web::cookie::{time::Duration, Cookie, SameSite};

use blog_shared::RefreshCookieConfig;

fn same_site(value: &str) -> SameSite {
    match value.to_ascii_lowercase().as_str() {
        "lax" => SameSite::Lax,
        "none" => SameSite::None,
        _ => SameSite::Strict,
    }
}

/// Cookie carrying a freshly issued refresh token for `max_age_seconds`
pub fn refresh_cookie(
    config: &RefreshCookieConfig,
    token: String,
    max_age_seconds: i64,
) -> Cookie<'static> {
    Cookie::build(config.name.clone(), token)
        .path(config.path.clone())
        .secure(config.secure)
        .http_only(config.http_only)
        .same_site(same_site(&config.same_site))
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// Cookie instructing the client to drop the refresh token
pub fn removal_cookie(config: &RefreshCookieConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build(config.name.clone(), "")
        .path(config.path.clone())
        .secure(config.secure)
        .http_only(config.http_only)
        .same_site(same_site(&config.same_site))
        .finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_attributes() {
        let config = RefreshCookieConfig::default();
        let cookie = refresh_cookie(&config, "token".to_string(), 604_800);

        assert_eq!(cookie.name(), "refresh_token");
        assert_eq!(cookie.value(), "token");
        assert_eq!(cookie.path(), Some("/api/v1/auth"));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(604_800)));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let config = RefreshCookieConfig {
            same_site: "lax".to_string(),
            ..Default::default()
        };
        let cookie = removal_cookie(&config);

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}
