use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::config::ProfileFields;
use crate::secrets::TokenPair;

/// The access token pair handed back to the caller on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileCredentials {
    pub token: String,
    pub secret: String,
}

/// Canonical profile fields. A field absent from the provider payload is
/// omitted here, never defaulted to an empty string.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub urls: BTreeMap<String, String>,
}

/// Final output of a completed handshake.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedProfile {
    pub uid: String,
    pub info: ProfileInfo,
    pub credentials: ProfileCredentials,
    pub raw: Value,
}

/// Pure mapping from the raw verify-credentials payload into the canonical
/// shape. Returns `None` when the unique id field is missing or empty.
pub(crate) fn normalize(
    raw: &Value,
    access: &TokenPair,
    fields: &ProfileFields,
) -> Option<NormalizedProfile> {
    let uid = string_field(raw, &fields.uid)?;

    let nickname = string_field(raw, &fields.nickname);
    let mut urls = BTreeMap::new();
    if let Some(nick) = &nickname {
        urls.insert(
            fields.profile_url_key.clone(),
            fields.profile_url_template.replace("{screen_name}", nick),
        );
    }
    if let Some(website) = string_field(raw, &fields.website) {
        urls.insert("website".to_string(), website);
    }

    Some(NormalizedProfile {
        uid,
        info: ProfileInfo {
            name: string_field(raw, &fields.name),
            nickname,
            location: string_field(raw, &fields.location),
            description: string_field(raw, &fields.description),
            image: string_field(raw, &fields.image),
            urls,
        },
        credentials: ProfileCredentials {
            token: access.token().to_owned(),
            secret: access.token_secret().to_owned(),
        },
        raw: raw.clone(),
    })
}

// Empty strings count as absent, like the original strategy's field mapping.
fn string_field(raw: &Value, name: &str) -> Option<String> {
    match raw.get(name)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn access() -> TokenPair {
        TokenPair::new("tok", "sec").unwrap()
    }

    #[test]
    fn full_payload_maps_every_field() {
        let raw = json!({
            "id": 42,
            "name": "Alice Example",
            "screen_name": "alice",
            "location": "Wonderland",
            "description": "Just testing.",
            "profile_image_url": "https://img.example/alice.png",
            "url": "https://alice.example",
        });
        let profile = normalize(&raw, &access(), &ProfileFields::default()).unwrap();
        assert_eq!(profile.uid, "42");
        assert_eq!(profile.info.name.as_deref(), Some("Alice Example"));
        assert_eq!(profile.info.nickname.as_deref(), Some("alice"));
        assert_eq!(profile.info.location.as_deref(), Some("Wonderland"));
        assert_eq!(profile.info.description.as_deref(), Some("Just testing."));
        assert_eq!(
            profile.info.image.as_deref(),
            Some("https://img.example/alice.png")
        );
        assert_eq!(
            profile.info.urls.get("twitter").map(String::as_str),
            Some("https://twitter.com/alice")
        );
        assert_eq!(
            profile.info.urls.get("website").map(String::as_str),
            Some("https://alice.example")
        );
        assert_eq!(profile.credentials.token, "tok");
        assert_eq!(profile.credentials.secret, "sec");
        assert_eq!(profile.raw, raw);
    }

    #[test]
    fn absent_fields_are_omitted_not_emptied() {
        let raw = json!({"id": "7", "screen_name": "bob", "location": ""});
        let profile = normalize(&raw, &access(), &ProfileFields::default()).unwrap();
        assert_eq!(profile.uid, "7");
        assert!(profile.info.name.is_none());
        assert!(profile.info.location.is_none());
        assert!(profile.info.description.is_none());
        assert!(profile.info.image.is_none());
        assert!(!profile.info.urls.contains_key("website"));

        let rendered = serde_json::to_value(&profile).unwrap();
        assert!(rendered["info"].get("location").is_none());
    }

    #[test]
    fn missing_or_empty_uid_yields_none() {
        let fields = ProfileFields::default();
        assert!(normalize(&json!({"screen_name": "alice"}), &access(), &fields).is_none());
        assert!(normalize(&json!({"id": ""}), &access(), &fields).is_none());
        assert!(normalize(&Value::Null, &access(), &fields).is_none());
    }

    #[test]
    fn profile_url_comes_from_the_template() {
        let fields = ProfileFields {
            profile_url_template: "https://social.example/u/{screen_name}".into(),
            profile_url_key: "social".into(),
            ..ProfileFields::default()
        };
        let raw = json!({"id": 1, "screen_name": "carol"});
        let profile = normalize(&raw, &access(), &fields).unwrap();
        assert_eq!(
            profile.info.urls.get("social").map(String::as_str),
            Some("https://social.example/u/carol")
        );
    }
}
