//! Server settings read from the environment

use anyhow::{bail, Context};
use cookbook_lakehouse::{Cookbook, IdentityView};

/// Optional admin identity seeded at startup
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub display_name: String,
    pub address: String,
    pub secret: String,
}

impl AdminSeed {
    /// Create the admin if its address is free. Fails if the address already
    /// belongs to a non-admin identity.
    pub async fn apply(&self, cookbook: &Cookbook) -> anyhow::Result<IdentityView> {
        let view = cookbook
            .auth()
            .ensure_admin(
                self.display_name.clone(),
                self.address.clone(),
                self.secret.clone(),
            )
            .await
            .context("seeding bootstrap admin")?;
        if !view.role.is_admin() {
            bail!(
                "bootstrap admin address {} belongs to identity {} without the admin role",
                self.address,
                view.id
            );
        }
        Ok(view)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub cookie_secure: bool,
    pub admin: Option<AdminSeed>,
}

impl ServerConfig {
    /// `PORT` (default 8080), `COOKBOOK_COOKIE_SECURE` (default true) and the
    /// `COOKBOOK_ADMIN_*` triple, which must be given together or not at all.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().with_context(|| format!("invalid PORT: {raw}"))?,
            Err(_) => 8080,
        };

        let cookie_secure = match std::env::var("COOKBOOK_COOKIE_SECURE") {
            Ok(raw) => parse_flag(&raw)
                .with_context(|| format!("invalid COOKBOOK_COOKIE_SECURE: {raw}"))?,
            Err(_) => true,
        };

        let admin = match (
            std::env::var("COOKBOOK_ADMIN_NAME").ok(),
            std::env::var("COOKBOOK_ADMIN_ADDRESS").ok(),
            std::env::var("COOKBOOK_ADMIN_SECRET").ok(),
        ) {
            (Some(display_name), Some(address), Some(secret)) => Some(AdminSeed {
                display_name,
                address,
                secret,
            }),
            (None, None, None) => None,
            _ => bail!(
                "COOKBOOK_ADMIN_NAME, COOKBOOK_ADMIN_ADDRESS and COOKBOOK_ADMIN_SECRET must be set together"
            ),
        };

        Ok(Self {
            port,
            cookie_secure,
            admin,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
