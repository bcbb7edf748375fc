//! Catalog fetcher: reads variant availability from the fulfillment provider.

use crate::settings::CatalogSettings;
use serde::Deserialize;
use thiserror::Error;
use turbo_commerce::{Currency, Money, VariantId};
use turbo_data::{FetchClient, FetchError};

/// Per-product fetch failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The API answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The body was not the expected shape.
    #[error("undecodable response: {0}")]
    Decode(String),

    /// The envelope reported a failure.
    #[error("catalog API error {code}: {message}")]
    Api { code: i64, message: String },
}

impl From<FetchError> for CatalogError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::HttpError { status, message } => CatalogError::Http { status, message },
            FetchError::ParseError(m) | FetchError::JsonError(m) => CatalogError::Decode(m),
            other => CatalogError::Transport(other.to_string()),
        }
    }
}

/// A variant as reported by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteVariant {
    pub id: VariantId,
    pub title: String,
    pub available: bool,
    pub enabled: bool,
    /// `None` when the price could not be read; the stored price is kept.
    pub price: Option<Money>,
}

/// A product as reported by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteProduct {
    pub external_id: String,
    pub title: String,
    pub variants: Vec<RemoteVariant>,
}

/// Source of current catalog state. Read-only.
pub trait CatalogSource {
    fn fetch_product(&self, external_id: &str) -> Result<RemoteProduct, CatalogError>;
}

/// Catalog backed by the provider's REST API.
pub struct HttpCatalog {
    client: FetchClient,
    api_token: String,
}

impl HttpCatalog {
    pub fn new(settings: &CatalogSettings) -> Self {
        let mut client = FetchClient::new().with_base_url(settings.base_url.clone());
        if let Some(store_id) = &settings.store_id {
            client = client.with_default_header("X-PF-Store-Id", store_id.clone());
        }
        Self {
            client,
            api_token: settings.api_token.clone(),
        }
    }
}

impl CatalogSource for HttpCatalog {
    fn fetch_product(&self, external_id: &str) -> Result<RemoteProduct, CatalogError> {
        let response = self
            .client
            .get(format!("/store/products/{}", external_id))
            .bearer_auth(&self.api_token)
            .accept("application/json")
            .send()?
            .error_for_status()?;
        decode_product(external_id, &response.body)
    }
}

#[derive(Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct SyncProductResult {
    sync_product: SyncProduct,
    #[serde(default)]
    sync_variants: Vec<SyncVariant>,
}

#[derive(Deserialize)]
struct SyncProduct {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
struct SyncVariant {
    id: RawId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    retail_price: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    availability_status: Option<String>,
    #[serde(default)]
    is_ignored: bool,
}

/// Only `active` counts as purchasable; `discontinued`, `out_of_stock` and
/// `temporary_out_of_stock` do not.
const AVAILABLE_STATUS: &str = "active";

fn decode_product(external_id: &str, body: &[u8]) -> Result<RemoteProduct, CatalogError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| CatalogError::Decode(e.to_string()))?;

    if envelope.code != 200 {
        let message = envelope
            .error
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .or_else(|| envelope.result.as_str().map(str::to_string))
            .unwrap_or_default();
        return Err(CatalogError::Api {
            code: envelope.code,
            message,
        });
    }

    let result: SyncProductResult = serde_json::from_value(envelope.result)
        .map_err(|e| CatalogError::Decode(e.to_string()))?;

    let variants = result.sync_variants.into_iter().map(decode_variant).collect();

    Ok(RemoteProduct {
        external_id: external_id.to_string(),
        title: result.sync_product.name,
        variants,
    })
}

fn decode_variant(raw: SyncVariant) -> RemoteVariant {
    let currency = match raw.currency.as_deref() {
        Some(code) => Currency::from_code(code),
        None => Some(Currency::default()),
    };
    let price = currency.and_then(|currency| match raw.retail_price.as_deref() {
        Some(amount) => Money::parse_decimal(amount, currency).ok(),
        None => Some(Money::zero(currency)),
    });

    RemoteVariant {
        id: VariantId::new(raw.id.into_string()),
        title: raw.name,
        available: raw.availability_status.as_deref() == Some(AVAILABLE_STATUS),
        enabled: !raw.is_ignored,
        price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASTLE_TEE: &str = r#"{
        "code": 200,
        "result": {
            "sync_product": {"id": 4711, "name": "Castle Tee"},
            "sync_variants": [
                {"id": 101, "name": "Castle Tee / S", "retail_price": "29.00",
                 "currency": "EUR", "availability_status": "active", "is_ignored": false},
                {"id": 102, "name": "Castle Tee / M", "retail_price": "29.50",
                 "currency": "EUR", "availability_status": "temporary_out_of_stock",
                 "is_ignored": false},
                {"id": "103", "name": "Castle Tee / L", "retail_price": "29.00",
                 "currency": "EUR", "availability_status": "active", "is_ignored": true}
            ]
        }
    }"#;

    #[test]
    fn test_decode_product() {
        let product = decode_product("4711", CASTLE_TEE.as_bytes()).unwrap();
        assert_eq!(product.title, "Castle Tee");
        assert_eq!(product.variants.len(), 3);

        let s = &product.variants[0];
        assert_eq!(s.id, VariantId::new("101"));
        assert!(s.available);
        assert!(s.enabled);
        assert_eq!(s.price, Some(Money::new(2900, Currency::EUR)));

        assert!(!product.variants[1].available);
        assert_eq!(product.variants[1].price.map(|p| p.amount_cents), Some(2950));

        let l = &product.variants[2];
        assert_eq!(l.id, VariantId::new("103"));
        assert!(l.available);
        assert!(!l.enabled);
    }

    #[test]
    fn test_envelope_error_code() {
        let body = br#"{"code": 404, "result": "Not found", "error": {"reason": "NotFound", "message": "Product not found"}}"#;
        assert_eq!(
            decode_product("1", body).unwrap_err(),
            CatalogError::Api {
                code: 404,
                message: "Product not found".to_string()
            }
        );
    }

    #[test]
    fn test_undecodable_bodies() {
        assert!(matches!(
            decode_product("1", b"<html>bad gateway</html>"),
            Err(CatalogError::Decode(_))
        ));
        assert!(matches!(
            decode_product("1", br#"{"code": 200, "result": {"unexpected": true}}"#),
            Err(CatalogError::Decode(_))
        ));
    }

    #[test]
    fn test_unreadable_price_keeps_availability() {
        let body = br#"{"code":200,"result":{"sync_product":{"name":"x"},
            "sync_variants":[
                {"id":1,"name":"S","retail_price":"49.00","currency":"PLN","availability_status":"active"},
                {"id":2,"name":"M","retail_price":"abc","currency":"EUR","availability_status":"active"}
            ]}}"#;
        let product = decode_product("1", body).unwrap();
        assert_eq!(product.variants.len(), 2);
        for variant in &product.variants {
            assert!(variant.available);
            assert_eq!(variant.price, None);
        }
    }

    #[test]
    fn test_fetch_error_mapping() {
        let http = CatalogError::from(FetchError::HttpError {
            status: 401,
            message: "unauthorized".into(),
        });
        assert!(matches!(http, CatalogError::Http { status: 401, .. }));
        assert!(matches!(
            CatalogError::from(FetchError::Timeout),
            CatalogError::Transport(_)
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_http_catalog_unreachable_host_is_transport_error() {
        let catalog = HttpCatalog::new(&CatalogSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            api_token: "t".to_string(),
            store_id: None,
        });
        assert!(matches!(
            catalog.fetch_product("4711"),
            Err(CatalogError::Transport(_))
        ));
    }
}
