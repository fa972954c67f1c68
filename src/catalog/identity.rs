use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Hostname of a cloud's identity service (e.g., `js2.jetstream-cloud.org`).
///
/// Unique within one deployment config; lookups compare it exactly and
/// case-sensitively.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeystoneHostname(pub String);

/// Key a deployment snapshot is registered under in a `CatalogRepository`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentKey(pub String);

impl KeystoneHostname {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeystoneHostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DeploymentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Image visibility used when matching featured images.
///
/// Known variants follow the OpenStack image API; `Other` keeps configs that
/// name a newer visibility loadable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ImageVisibility {
    Public,
    Private,
    Shared,
    Community,
    Other(String),
}

/// Login view the console opens with.
///
/// `Other` preserves deployment-specific views the console may add later.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoginView {
    OpenStack,
    Jetstream,
    Oidc,
    Other(String),
}

impl Serialize for ImageVisibility {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ImageVisibility {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

impl ImageVisibility {
    pub fn as_str(&self) -> &str {
        match self {
            ImageVisibility::Public => "public",
            ImageVisibility::Private => "private",
            ImageVisibility::Shared => "shared",
            ImageVisibility::Community => "community",
            ImageVisibility::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "public" => ImageVisibility::Public,
            "private" => ImageVisibility::Private,
            "shared" => ImageVisibility::Shared,
            "community" => ImageVisibility::Community,
            other => ImageVisibility::Other(other.to_string()),
        }
    }
}

impl Serialize for LoginView {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LoginView {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

impl LoginView {
    pub fn as_str(&self) -> &str {
        match self {
            LoginView::OpenStack => "openstack",
            LoginView::Jetstream => "jetstream",
            LoginView::Oidc => "oidc",
            LoginView::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "openstack" => LoginView::OpenStack,
            "jetstream" => LoginView::Jetstream,
            "oidc" => LoginView::Oidc,
            other => LoginView::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_round_trips_known_and_unknown() {
        let known = ImageVisibility::Community;
        let json = serde_json::to_string(&known).unwrap();
        assert_eq!(json.trim_matches('"'), "community");
        let back: ImageVisibility = serde_json::from_str(&json).unwrap();
        assert_eq!(back, known);

        let custom_json = "\"tenant_only\"";
        let parsed: ImageVisibility = serde_json::from_str(custom_json).unwrap();
        assert_eq!(parsed, ImageVisibility::Other("tenant_only".to_string()));
        let serialized = serde_json::to_string(&parsed).unwrap();
        assert_eq!(serialized, custom_json);
    }

    #[test]
    fn login_view_round_trips_known_and_unknown() {
        let parsed: LoginView = serde_json::from_str("\"jetstream\"").unwrap();
        assert_eq!(parsed, LoginView::Jetstream);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"jetstream\"");

        let other: LoginView = serde_json::from_str("\"chameleon\"").unwrap();
        assert_eq!(other, LoginView::Other("chameleon".to_string()));
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"chameleon\"");
    }

    #[test]
    fn hostname_is_transparent() {
        let host = KeystoneHostname("js2.jetstream-cloud.org".to_string());
        let serialized = serde_json::to_string(&host).unwrap();
        assert_eq!(serialized, "\"js2.jetstream-cloud.org\"");
        let parsed: KeystoneHostname = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, host);
        assert_eq!(parsed.to_string(), "js2.jetstream-cloud.org");
    }
}
