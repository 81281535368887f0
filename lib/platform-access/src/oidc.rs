//! OIDC (OpenID Connect) configuration.
//!
//! This module provides configuration types for connecting to an external
//! OIDC identity provider for user authentication.

use serde::{Deserialize, Serialize};

use crate::role::RoleGroupMapping;

/// Configuration for the OIDC identity provider.
///
/// This configuration is used to connect to an external OIDC provider
/// (e.g., Keycloak, Auth0, Authentik) for user authentication.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcConfig {
    /// The OIDC issuer URL (e.g., "https://auth.example.com/realms/main").
    /// Used for OIDC discovery.
    issuer_url: String,
    /// The OAuth2 client ID registered with the provider.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// The redirect URI for the OAuth2 callback (e.g., "https://app.example.com/auth/callback").
    redirect_uri: String,
    /// OAuth2 scopes to request as a comma-separated string.
    /// Default: "openid,email,profile"
    #[serde(default = "default_scopes")]
    scopes: String,
    /// The claim name in the ID token that contains user groups.
    /// Default: "groups"
    #[serde(default = "default_groups_claim")]
    groups_claim: String,
    /// The group name that grants admin access.
    #[serde(default = "default_admin_group")]
    admin_group: String,
    /// The group name that grants manager access.
    #[serde(default = "default_manager_group")]
    manager_group: String,
    /// The group name that grants employee access.
    #[serde(default = "default_employee_group")]
    employee_group: String,
    /// The group name that grants viewer access.
    #[serde(default = "default_viewer_group")]
    viewer_group: String,
}

fn default_scopes() -> String {
    "openid,email,profile".to_string()
}

fn default_groups_claim() -> String {
    "groups".to_string()
}

fn default_admin_group() -> String {
    "stockroom-admins".to_string()
}

fn default_manager_group() -> String {
    "stockroom-managers".to_string()
}

fn default_employee_group() -> String {
    "stockroom-employees".to_string()
}

fn default_viewer_group() -> String {
    "stockroom-viewers".to_string()
}

impl OidcConfig {
    /// Creates a new OIDC configuration with defaults for optional fields.
    #[must_use]
    pub fn new(
        issuer_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Self {
        Self {
            issuer_url,
            client_id,
            client_secret,
            redirect_uri,
            scopes: default_scopes(),
            groups_claim: default_groups_claim(),
            admin_group: default_admin_group(),
            manager_group: default_manager_group(),
            employee_group: default_employee_group(),
            viewer_group: default_viewer_group(),
        }
    }

    /// Creates a configuration builder for more customization.
    #[must_use]
    pub fn builder(
        issuer_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> OidcConfigBuilder {
        OidcConfigBuilder::new(issuer_url, client_id, client_secret, redirect_uri)
    }

    /// Returns the OIDC issuer URL.
    #[must_use]
    pub fn issuer_url(&self) -> &str {
        &self.issuer_url
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the OAuth2 redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the OAuth2 scopes to request, parsed from the comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes.split(',').map(str::trim).collect()
    }

    /// Returns the name of the claim containing user groups.
    #[must_use]
    pub fn groups_claim(&self) -> &str {
        &self.groups_claim
    }

    /// Returns the group-to-role mapping for sign-in role derivation.
    #[must_use]
    pub fn role_groups(&self) -> RoleGroupMapping {
        RoleGroupMapping {
            admin: self.admin_group.clone(),
            manager: self.manager_group.clone(),
            employee: self.employee_group.clone(),
            viewer: self.viewer_group.clone(),
        }
    }
}

/// Builder for `OidcConfig`.
#[derive(Debug)]
pub struct OidcConfigBuilder {
    issuer_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    groups_claim: String,
    role_groups: RoleGroupMapping,
}

impl OidcConfigBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(
        issuer_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Self {
        Self {
            issuer_url,
            client_id,
            client_secret,
            redirect_uri,
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
            groups_claim: default_groups_claim(),
            role_groups: RoleGroupMapping::default(),
        }
    }

    /// Sets the OAuth2 scopes to request.
    #[must_use]
    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Adds a scope to the list of scopes to request.
    #[must_use]
    pub fn add_scope(mut self, scope: String) -> Self {
        if !self.scopes.contains(&scope) {
            self.scopes.push(scope);
        }
        self
    }

    /// Sets the claim name for user groups.
    #[must_use]
    pub fn groups_claim(mut self, claim: String) -> Self {
        self.groups_claim = claim;
        self
    }

    /// Sets the group-to-role mapping.
    #[must_use]
    pub fn role_groups(mut self, mapping: RoleGroupMapping) -> Self {
        self.role_groups = mapping;
        self
    }

    /// Builds the `OidcConfig`.
    #[must_use]
    pub fn build(self) -> OidcConfig {
        OidcConfig {
            issuer_url: self.issuer_url,
            client_id: self.client_id,
            client_secret: self.client_secret,
            redirect_uri: self.redirect_uri,
            scopes: self.scopes.join(","),
            groups_claim: self.groups_claim,
            admin_group: self.role_groups.admin,
            manager_group: self.role_groups.manager,
            employee_group: self.role_groups.employee,
            viewer_group: self.role_groups.viewer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> OidcConfig {
        OidcConfig::new(
            "https://auth.example.com".to_string(),
            "client-id".to_string(),
            "client-secret".to_string(),
            "https://app.example.com/auth/callback".to_string(),
        )
    }

    #[test]
    fn new_config_has_defaults() {
        let config = test_config();

        assert_eq!(config.issuer_url(), "https://auth.example.com");
        assert_eq!(config.client_id(), "client-id");
        assert_eq!(config.redirect_uri(), "https://app.example.com/auth/callback");
        assert_eq!(config.scopes(), vec!["openid", "email", "profile"]);
        assert_eq!(config.groups_claim(), "groups");
        assert_eq!(config.role_groups(), RoleGroupMapping::default());
    }

    #[test]
    fn builder_customizes_groups() {
        let mapping = RoleGroupMapping {
            admin: "ops".to_string(),
            manager: "leads".to_string(),
            employee: "staff".to_string(),
            viewer: "guests".to_string(),
        };

        let config = OidcConfig::builder(
            "https://auth.example.com".to_string(),
            "client-id".to_string(),
            "client-secret".to_string(),
            "https://app.example.com/auth/callback".to_string(),
        )
        .groups_claim("cognito:groups".to_string())
        .role_groups(mapping.clone())
        .build();

        assert_eq!(config.groups_claim(), "cognito:groups");
        assert_eq!(config.role_groups(), mapping);
    }

    #[test]
    fn builder_add_scope_deduplicates() {
        let config = OidcConfig::builder(
            "https://auth.example.com".to_string(),
            "client-id".to_string(),
            "client-secret".to_string(),
            "https://app.example.com/auth/callback".to_string(),
        )
        .add_scope("phone".to_string())
        .add_scope("phone".to_string())
        .build();

        assert_eq!(config.scopes(), vec!["openid", "email", "profile", "phone"]);
    }

    #[test]
    fn scopes_parse_trims_whitespace() {
        let config = OidcConfig::builder(
            "https://auth.example.com".to_string(),
            "client-id".to_string(),
            "client-secret".to_string(),
            "https://app.example.com/auth/callback".to_string(),
        )
        .scopes(vec!["openid".to_string(), " email".to_string()])
        .build();

        assert_eq!(config.scopes(), vec!["openid", "email"]);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let json = serde_json::json!({
            "issuer_url": "https://auth.example.com",
            "client_id": "cid",
            "client_secret": "secret",
            "redirect_uri": "https://app.example.com/auth/callback",
        });
        let config: OidcConfig = serde_json::from_value(json).expect("deserialize");
        assert_eq!(config.groups_claim(), "groups");
        assert_eq!(config.role_groups(), RoleGroupMapping::default());
    }
}
