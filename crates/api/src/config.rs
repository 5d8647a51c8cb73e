//! Process configuration, read from the environment.

use std::net::SocketAddr;

use lumina_auth::RedirectConfig;
use lumina_core::DomainError;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub redirects: RedirectConfig,
}

impl ApiConfig {
    /// `JWT_SECRET`, `LUMINA_BIND_ADDR`, `LUMINA_LOGIN_PATH`, `LUMINA_LANDING_PATH`.
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let bind_addr = match lookup("LUMINA_BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|e| DomainError::validation(format!("LUMINA_BIND_ADDR '{raw}': {e}")))?,
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let defaults = RedirectConfig::default();
        let redirects = RedirectConfig {
            login_path: path_var(&lookup, "LUMINA_LOGIN_PATH", defaults.login_path)?,
            landing_path: path_var(&lookup, "LUMINA_LANDING_PATH", defaults.landing_path)?,
            callback_param: defaults.callback_param,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            redirects,
        })
    }

    /// Loopback address, dev secret, default redirects. Used by tests.
    pub fn local(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            redirects: RedirectConfig::default(),
        }
    }
}

fn path_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: String,
) -> Result<String, DomainError> {
    let value = lookup(key).unwrap_or(default);
    if !value.starts_with('/') {
        return Err(DomainError::validation(format!(
            "{key} must be an absolute path, got '{value}'"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let cfg = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.redirects, RedirectConfig::default());
    }

    #[test]
    fn overrides_are_read() {
        let cfg = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("LUMINA_BIND_ADDR", "127.0.0.1:9000"),
            ("LUMINA_LOGIN_PATH", "/auth/sign-in"),
            ("LUMINA_LANDING_PATH", "/welcome"),
        ]))
        .unwrap();
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.redirects.login_path, "/auth/sign-in");
        assert_eq!(cfg.redirects.landing_path, "/welcome");
    }

    #[test]
    fn relative_paths_and_bad_addresses_are_rejected() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[("LUMINA_LOGIN_PATH", "login")])),
            Err(DomainError::Validation(_))
        ));
        assert!(ApiConfig::from_lookup(lookup(&[("LUMINA_BIND_ADDR", "nowhere")])).is_err());
    }
}
