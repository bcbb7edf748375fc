//! Spin component serving the inventory sync triggers and restock
//! subscription endpoints.
//!
//! Routes:
//! - `GET|POST /api/cron/sync-inventory` - scheduler trigger, bearer secret
//! - `POST /api/admin/sync-inventory` - admin trigger, session cookie
//! - `POST|DELETE /api/restock-notifications` - subscribe / unsubscribe

use anyhow::Context;
use spin_sdk::http::{Method as SpinMethod, Request, Response};
use spin_sdk::http_component;

use edge_core::{Method, RequestContext, RequestId};
use edge_observability::{LogLevel, StructuredLogger};
use turbo_auth::SharedSecret;
use turbo_cache::Cache;
use turbo_db::Db;
use turbo_sync::api::{ApiResponse, SyncApi};
use turbo_sync::{HttpCatalog, SqliteStore, SyncSettings, SystemClock};

const WORKLOAD: &str = "inventory-sync";

#[http_component]
fn handle(req: Request) -> anyhow::Result<Response> {
    let ctx = request_context(&req);
    let Some(ctx) = ctx else {
        return Ok(into_spin(&ApiResponse::json(
            405,
            &turbo_sync::SyncResponse::failure("Method not allowed"),
        )));
    };

    let min_level = variable("log_level")
        .and_then(|level| LogLevel::parse(&level))
        .unwrap_or(LogLevel::Info);
    let logger = StructuredLogger::new(ctx.request_id.clone())
        .with_workload(WORKLOAD)
        .with_route(ctx.path.as_str())
        .with_min_level(min_level);

    let settings = SyncSettings::from_lookup(variable).context("invalid sync settings")?;
    let cron_secret = SharedSecret::new(variable("cron_secret").unwrap_or_default());
    if !cron_secret.is_configured() {
        logger.warn("cron_secret is not set; scheduler trigger will reject every call");
    }

    let store = SqliteStore::new(Db::open_default().context("failed to open database")?);
    store.migrate().context("failed to apply schema")?;
    let sessions = Cache::open_default().context("failed to open key-value store")?;
    let catalog = HttpCatalog::new(&settings.catalog);

    let api = SyncApi {
        store: &store,
        catalog: &catalog,
        clock: &SystemClock,
        settings: &settings,
        sessions: &sessions,
        cron_secret: &cron_secret,
        logger: &logger,
    };
    Ok(into_spin(&api.handle(&ctx)))
}

/// Build the platform context; `None` for methods the routes never accept.
fn request_context(req: &Request) -> Option<RequestContext> {
    let method = match req.method() {
        SpinMethod::Get => Method::GET,
        SpinMethod::Post => Method::POST,
        SpinMethod::Put => Method::PUT,
        SpinMethod::Delete => Method::DELETE,
        SpinMethod::Patch => Method::PATCH,
        SpinMethod::Head => Method::HEAD,
        SpinMethod::Options => Method::OPTIONS,
        _ => return None,
    };

    let mut ctx = RequestContext::new(method, req.path_and_query().unwrap_or("/"));
    for (name, value) in req.headers() {
        if let Some(value) = value.as_str() {
            ctx = ctx.with_header(name, value);
        }
    }
    if let Some(id) = ctx.header("x-request-id").map(RequestId::from_string) {
        ctx = ctx.with_request_id(id);
    }
    Some(ctx.with_body(req.body().to_vec()))
}

fn into_spin(response: &ApiResponse) -> Response {
    let mut builder = Response::builder();
    builder
        .status(response.status)
        .header("content-type", "application/json")
        .header("cache-control", "no-store");
    for (name, value) in &response.headers {
        builder.header(name.as_str(), value.as_str());
    }
    builder.body(response.body_bytes()).build()
}

fn variable(name: &str) -> Option<String> {
    spin_sdk::variables::get(name).ok()
}
