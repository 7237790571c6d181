//! Portico development server
//!
//! A synchronous HTTP dispatch engine with pattern routing, guarded
//! interceptors and signed-cookie sessions.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌────────────────────────────────────────────────────────┐
//!                          │                        PORTICO                         │
//!                          │                                                        │
//!     Client Request       │  ┌─────────┐    ┌─────────┐    ┌──────────────┐       │
//!     ─────────────────────┼─▶│ server  │───▶│ gateway │───▶│ interceptor  │       │
//!                          │  │TCP+parse│    │dispatch │    │    chain     │       │
//!                          │  └─────────┘    └─────────┘    └──────┬───────┘       │
//!                          │                                      │                │
//!                          │                                      ▼                │
//!                          │                              ┌──────────────┐        │
//!                          │                              │ route table  │        │
//!                          │                              │ + static dir │        │
//!                          │                              └──────┬───────┘        │
//!                          │                                      │                │
//!                          │                                      ▼                │
//!     Client Response      │  ┌─────────┐    ┌─────────┐    ┌──────────────┐       │
//!     ◀────────────────────┼──│response │◀───│ payload │◀───│   handler    │       │
//!                          │  │ writer  │    │ realize │    │   closure    │       │
//!                          │  └─────────┘    └─────────┘    └──────────────┘       │
//!                          │                                                        │
//!                          │  ┌──────────────────────────────────────────────────┐ │
//!                          │  │              Cross-Cutting Concerns              │ │
//!                          │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌───────┐ │ │
//!                          │  │  │ config  │ │ session │ │ template │ │ error │ │ │
//!                          │  │  │         │ │ cookies │ │  engine  │ │ pages │ │ │
//!                          │  │  └─────────┘ └─────────┘ └──────────┘ └───────┘ │ │
//!                          │  └──────────────────────────────────────────────────┘ │
//!                          └────────────────────────────────────────────────────────┘
//! ```
//!
//! # Demo Application
//!
//! The binary wires a small demo site onto the engine:
//! - Page routes on `/` and `/hello/:name`
//! - A JSON echo endpoint on `POST /api/echo`
//! - Signed-cookie sign-in on `/signin`, `/api/signin` and `/signout`
//! - An admin area under `/manage/` behind the admin gate
//! - Static files and a directory template engine when enabled in config

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portico::config::{load_config, EngineConfig};
use portico::error::{DispatchError, DispatchResult};
use portico::gateway::{ComposeError, Gateway, RequestContext};
use portico::http::{Cookie, FormValue, Payload};
use portico::http::Method;
use portico::interceptor::Next;
use portico::routing::PathArgs;
use portico::server::DevServer;
use portico::session::{
    AdminGate, CookieResolver, MemoryStore, Principal, PrincipalRecord, PrincipalStore,
    SessionSigner,
};
use portico::template::DirEngine;

#[derive(Parser)]
#[command(name = "portico")]
#[command(about = "Development server for the portico dispatch engine", long_about = None)]
struct Args {
    /// Path to a TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Include internal failure detail in 500 bodies.
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("portico={}", config.observability.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("portico v0.1.0 starting");

    // Named `debug_mode` because tracing's value-set macro imports
    // `tracing::field::debug` into its expansion scope, shadowing a local
    // named `debug` used as a field value.
    let debug_mode = args.debug || config.debug;
    let bind_address = args
        .bind
        .clone()
        .unwrap_or_else(|| config.server.bind_address.clone());

    tracing::info!(
        bind_address = %bind_address,
        static_files = config.static_files.enabled,
        templates = config.templates.enabled,
        debug = debug_mode,
        "Configuration loaded"
    );

    let gateway = compose(&config, debug_mode)?;
    let server = DevServer::new(gateway, &config.server);
    server.run(&bind_address)?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Assembles the demo site onto a [`Gateway`].
fn compose(config: &EngineConfig, debug: bool) -> Result<Gateway, ComposeError> {
    let mut store = MemoryStore::new();
    store.insert(PrincipalRecord {
        principal: Principal {
            id: "admin0001".to_string(),
            name: "Admin".to_string(),
            admin: true,
        },
        token: "dev-only-token".to_string(),
    });
    let store = Arc::new(store);

    let signer = SessionSigner::new(
        config.session.cookie_name.clone(),
        config.session.secret.clone(),
        config.session.ttl_secs,
    );

    let signin_signer = signer.clone();
    let signin_store = Arc::clone(&store);
    let cookie_name = signer.cookie_name().to_string();

    let mut builder = Gateway::builder()
        .debug(debug)
        .principal_resolver(Arc::new(CookieResolver::new(signer.clone(), store.clone())))
        .interceptor("/", Arc::new(access_log))
        .interceptor("/manage/", Arc::new(AdminGate::new("/signin")))
        .route(Method::Get, "/", home)
        .route(Method::Get, "/hello/:name", |_ctx, args| {
            let name = args.get(0).unwrap_or("world");
            Ok(Payload::Text(format!("<h1>Hello, {name}!</h1>")))
        })
        .route(Method::Get, "/signin", sign_in_page)
        .route(Method::Get, "/signout", move |ctx, _args| {
            ctx.response_mut().delete_cookie(&cookie_name);
            Err(DispatchError::see_other("/"))
        })
        .route(Method::Get, "/manage/", manage_page)
        .api_route(Method::Post, "/api/echo", |ctx, _args| {
            let mut object = serde_json::Map::new();
            for (name, value) in ctx.request().form()?.iter() {
                if let FormValue::Text(text) = value {
                    object.insert(name.clone(), serde_json::Value::String(text.clone()));
                }
            }
            Ok(Payload::Json(serde_json::Value::Object(object)))
        })
        .api_route(Method::Post, "/api/signin", move |ctx, _args| {
            let (id, token) = {
                let form = ctx.request().form()?;
                (
                    form.text("id").unwrap_or_default().to_string(),
                    form.text("token").unwrap_or_default().to_string(),
                )
            };
            let record = signin_store
                .lookup(&id)
                .filter(|record| record.token == token)
                .ok_or_else(|| {
                    DispatchError::validation("token", "unknown principal or wrong token")
                })?;
            let cookie = signin_signer
                .issue(&record)
                .map_err(|err| DispatchError::Internal(err.to_string()))?;
            ctx.response_mut().set_cookie(
                Cookie::new(signin_signer.cookie_name(), cookie)
                    .path("/")
                    .max_age(signin_signer.ttl_secs())
                    .http_only(true),
            );
            ctx.set_principal(record.principal.clone());
            Ok(Payload::Json(serde_json::json!({
                "id": record.principal.id,
                "name": record.principal.name,
                "admin": record.principal.admin,
            })))
        });

    if config.static_files.enabled {
        builder = builder.static_files(&config.static_files.prefix, &config.static_files.root);
    }
    if config.templates.enabled {
        builder = builder.template_engine(Arc::new(DirEngine::new(&config.templates.root)));
    }

    builder.build()
}

/// Logs one line per dispatch with the outcome attached.
fn access_log(ctx: &mut RequestContext, next: Next<'_>) -> DispatchResult<Payload> {
    let method = ctx.request().method();
    let path = ctx.request().path().to_string();
    let result = next.run(ctx);
    match &result {
        Ok(_) => tracing::info!(
            method = %method,
            path = %path,
            status = %ctx.response().status_line(),
            "Handled"
        ),
        Err(error) => tracing::info!(
            method = %method,
            path = %path,
            error = %error,
            "Raised"
        ),
    }
    result
}

fn home(_ctx: &mut RequestContext, _args: &PathArgs) -> DispatchResult<Payload> {
    Ok(Payload::Text(
        "<html><body>\
         <h1>Portico</h1>\
         <p>The dispatch engine is running.</p>\
         <ul>\
         <li><a href=\"/hello/portico\">Greeting page</a></li>\
         <li><a href=\"/signin\">Sign in</a></li>\
         <li><a href=\"/manage/\">Admin area</a></li>\
         </ul>\
         </body></html>"
            .to_string(),
    ))
}

fn sign_in_page(_ctx: &mut RequestContext, _args: &PathArgs) -> DispatchResult<Payload> {
    Ok(Payload::Text(
        "<html><body>\
         <h1>Sign in</h1>\
         <form method=\"post\" action=\"/api/signin\">\
         <input name=\"id\" placeholder=\"principal id\">\
         <input name=\"token\" type=\"password\" placeholder=\"token\">\
         <button type=\"submit\">Sign in</button>\
         </form>\
         </body></html>"
            .to_string(),
    ))
}

fn manage_page(ctx: &mut RequestContext, _args: &PathArgs) -> DispatchResult<Payload> {
    let name = ctx
        .principal()
        .map(|principal| principal.name.clone())
        .unwrap_or_else(|| "unknown".to_string());
    Ok(Payload::Text(format!(
        "<html><body><h1>Manage</h1><p>Signed in as {name}.</p>\
         <p><a href=\"/signout\">Sign out</a></p></body></html>"
    )))
}
