use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Icon set attached to a payment method or issuer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub size1x: String,
    pub size2x: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A bank or wallet behind a payment method, e.g. an iDEAL bank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issuer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A payment method offered by the provider, passed through as received.
///
/// Only the keys the gateway reads are typed. Everything else the provider
/// sends (`minimumAmount`, `_links`, ...) is kept in `extra` and written back
/// under its original key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuers: Option<Vec<Issuer>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The provider's list envelope: `{"count": n, "_embedded": {"methods": [...]}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodList {
    #[serde(rename = "_embedded")]
    pub embedded: EmbeddedMethods,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedMethods {
    pub methods: Vec<PaymentMethod>,
}

/// Either the enveloped list or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MethodsResponse {
    Enveloped(MethodList),
    Bare(Vec<PaymentMethod>),
}

impl MethodsResponse {
    pub fn into_methods(self) -> Vec<PaymentMethod> {
        match self {
            MethodsResponse::Enveloped(list) => list.embedded.methods,
            MethodsResponse::Bare(methods) => methods,
        }
    }
}
