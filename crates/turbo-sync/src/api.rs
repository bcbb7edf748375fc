//! HTTP handlers for the sync triggers and subscription endpoints.
//!
//! Handlers work on an [`edge_core::RequestContext`] and return an
//! [`ApiResponse`], so the Spin component only converts types.

use crate::catalog::CatalogSource;
use crate::clock::Clock;
use crate::orchestrator::{InventorySync, SyncRequest};
use crate::result::SyncResponse;
use crate::settings::SyncSettings;
use crate::store::{NotificationStore, ProductStore, SyncLease};
use crate::subscriptions::Subscriptions;
use crate::SyncError;
use edge_core::{Method, RequestContext};
use edge_observability::StructuredLogger;
use serde::{Deserialize, Serialize};
use turbo_auth::{AuthError, Role, SessionStore, SharedSecret};
use turbo_cache::Cache;
use turbo_commerce::{ProductId, RestockNotification, VariantId};

pub const CRON_SYNC_ROUTE: &str = "/api/cron/sync-inventory";
pub const ADMIN_SYNC_ROUTE: &str = "/api/admin/sync-inventory";
pub const SUBSCRIPTIONS_ROUTE: &str = "/api/restock-notifications";

/// Cookie carrying the admin session id.
pub const SESSION_COOKIE: &str = "session_id";

/// A JSON response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
    /// Extra headers, e.g. `Allow` on 405.
    pub headers: Vec<(String, String)>,
}

impl ApiResponse {
    pub fn json<T: Serialize>(status: u16, body: &T) -> Self {
        let body = serde_json::to_value(body).unwrap_or_else(|e| {
            serde_json::json!({"success": false, "message": format!("serialization failed: {}", e)})
        });
        Self {
            status,
            body,
            headers: Vec::new(),
        }
    }

    fn failure(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, &SyncResponse::failure(message))
    }

    fn method_not_allowed(allow: &str) -> Self {
        let mut response = Self::failure(405, "Method not allowed");
        response.headers.push(("allow".to_string(), allow.to_string()));
        response
    }

    /// Serialized body.
    pub fn body_bytes(&self) -> Vec<u8> {
        self.body.to_string().into_bytes()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionBody {
    email: String,
    product_id: String,
    variant_id: String,
}

#[derive(Serialize)]
struct SubscriptionCreated<'a> {
    success: bool,
    created: bool,
    notification: &'a RestockNotification,
}

#[derive(Serialize)]
struct SubscriptionRemoved {
    success: bool,
    removed: bool,
}

/// Everything a request handler needs.
pub struct SyncApi<'a, S: ?Sized, C: ?Sized, K: ?Sized> {
    pub store: &'a S,
    pub catalog: &'a C,
    pub clock: &'a K,
    pub settings: &'a SyncSettings,
    pub sessions: &'a Cache,
    pub cron_secret: &'a SharedSecret,
    pub logger: &'a StructuredLogger,
}

impl<'a, S, C, K> SyncApi<'a, S, C, K>
where
    S: ProductStore + NotificationStore + SyncLease + ?Sized,
    C: CatalogSource + ?Sized,
    K: Clock + ?Sized,
{
    /// Route and handle one request.
    pub fn handle(&self, ctx: &RequestContext) -> ApiResponse {
        let response = match ctx.path.as_str() {
            CRON_SYNC_ROUTE => match ctx.method {
                Method::GET | Method::POST => self.cron_sync(ctx),
                _ => ApiResponse::method_not_allowed("GET, POST"),
            },
            ADMIN_SYNC_ROUTE => match ctx.method {
                Method::POST => self.admin_sync(ctx),
                _ => ApiResponse::method_not_allowed("POST"),
            },
            SUBSCRIPTIONS_ROUTE => match ctx.method {
                Method::POST => self.subscribe(ctx),
                Method::DELETE => self.unsubscribe(ctx),
                _ => ApiResponse::method_not_allowed("POST, DELETE"),
            },
            _ => ApiResponse::failure(404, "Not found"),
        };

        self.logger
            .info_builder("request handled")
            .field("method", ctx.method.as_str())
            .field("path", ctx.path.as_str())
            .field_i64("status", i64::from(response.status))
            .emit();
        response
    }

    fn cron_sync(&self, ctx: &RequestContext) -> ApiResponse {
        if let Err(e) = self.cron_secret.verify(ctx.bearer_token()) {
            return self.auth_failure(e);
        }
        self.run_sync(&SyncRequest::all())
    }

    fn admin_sync(&self, ctx: &RequestContext) -> ApiResponse {
        let session_id = ctx
            .cookie(SESSION_COOKIE)
            .or_else(|| ctx.authorization("Session"));
        let sessions = SessionStore::new(self.sessions);
        let user = match sessions.require_role(session_id, Role::Admin, self.clock.now()) {
            Ok(user) => user,
            Err(e) => return self.auth_failure(e),
        };

        let mut request = SyncRequest::all().forced(ctx.query_flag("force"));
        if let Some(id) = ctx.query_param("productId").filter(|id| !id.is_empty()) {
            request.product_id = Some(ProductId::new(id));
        }

        self.logger
            .info_builder("admin sync requested")
            .field("user", user.email().unwrap_or("unknown"))
            .field_bool("force", request.force)
            .emit();
        self.run_sync(&request)
    }

    fn run_sync(&self, request: &SyncRequest) -> ApiResponse {
        let job = InventorySync::new(
            self.store,
            self.catalog,
            self.clock,
            self.settings,
            self.logger,
        );
        match job.run(request) {
            Ok(result) => ApiResponse::json(200, &result.to_response()),
            Err(e) if e.is_conflict() => ApiResponse::failure(409, e.to_string()),
            Err(e) => {
                self.logger
                    .error_builder("inventory sync failed")
                    .field("error", e.to_string())
                    .emit();
                ApiResponse::failure(500, format!("Inventory sync failed: {}", e))
            }
        }
    }

    fn subscribe(&self, ctx: &RequestContext) -> ApiResponse {
        let body = match parse_body(ctx) {
            Ok(body) => body,
            Err(response) => return response,
        };
        let subs = Subscriptions::new(self.store, self.clock);
        match subs.subscribe(
            &body.email,
            &ProductId::new(body.product_id),
            &VariantId::new(body.variant_id),
        ) {
            Ok(subscribed) => {
                let status = if subscribed.is_created() { 201 } else { 200 };
                ApiResponse::json(
                    status,
                    &SubscriptionCreated {
                        success: true,
                        created: subscribed.is_created(),
                        notification: subscribed.notification(),
                    },
                )
            }
            Err(e) => self.domain_failure(e),
        }
    }

    fn unsubscribe(&self, ctx: &RequestContext) -> ApiResponse {
        let body = match parse_body(ctx) {
            Ok(body) => body,
            Err(response) => return response,
        };
        let subs = Subscriptions::new(self.store, self.clock);
        match subs.unsubscribe(
            &body.email,
            &ProductId::new(body.product_id),
            &VariantId::new(body.variant_id),
        ) {
            Ok(removed) => ApiResponse::json(
                200,
                &SubscriptionRemoved {
                    success: true,
                    removed,
                },
            ),
            Err(e) => self.domain_failure(e),
        }
    }

    fn auth_failure(&self, e: AuthError) -> ApiResponse {
        let status = e.status_code();
        if status >= 500 {
            self.logger
                .error_builder("session lookup failed")
                .field("error", e.to_string())
                .emit();
            return ApiResponse::failure(status, "Internal error");
        }
        self.logger
            .warn_builder("request rejected")
            .field("reason", e.to_string())
            .emit();
        let message = if status == 403 { "Forbidden" } else { "Unauthorized" };
        ApiResponse::failure(status, message)
    }

    fn domain_failure(&self, e: SyncError) -> ApiResponse {
        if e.is_conflict() {
            ApiResponse::failure(409, e.to_string())
        } else if e.is_client_error() {
            ApiResponse::failure(400, e.to_string())
        } else {
            self.logger
                .error_builder("subscription request failed")
                .field("error", e.to_string())
                .emit();
            ApiResponse::failure(500, "Internal error")
        }
    }
}

fn parse_body(ctx: &RequestContext) -> Result<SubscriptionBody, ApiResponse> {
    serde_json::from_slice(&ctx.body)
        .map_err(|e| ApiResponse::failure(400, format!("Invalid request body: {}", e)))
}
