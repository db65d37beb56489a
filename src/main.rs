#![forbid(unsafe_code)]

use anyhow::Result;
use lazy_static::lazy_static;
use log::info;
use poem::http::Method;
use poem::listener::{Listener, RustlsCertificate, RustlsConfig};
use poem::middleware::Cors;
use poem::{get, handler, listener::TcpListener, Endpoint, EndpointExt, Route};
use poem_openapi::OpenApiService;

// Server Utilities
use crate::v1::numbers::classify::ClassifyApi;
use crate::v1::numbers::version::{build_info, VersionApi};
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx};
use crate::utils::errors::Errors;
use crate::utils::fact_fetcher::FactFetcher;
use crate::utils::server_utils::get_absolute_path;

// Modules
mod utils;
mod v1;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "NumclassServer"; // for poem logging
const WELCOME_MSG : &str = "Welcome to the Number Classification API";

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Lazily initialize the parameters variable so that is has a 'static lifetime.
// We exit if we can't read our parameters.
lazy_static! {
    static ref RUNTIME_CTX: RuntimeCtx = init_runtime_context();
}

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<()> {
    // --------------- Initialize Server --------------
    println!("Starting numclass_server!");
    server_init()?;

    // --------------- Main Loop Set Up ---------------
    let config = &RUNTIME_CTX.parms.config;
    let server_url = format!("{}:{}{}", config.http_addr, config.http_port, "/api");

    // One fact fetcher, and so one connection pool, for the life of the process.
    let fetcher = FactFetcher::new(&config.numbers_api_url)?;
    info!("Fun facts retrieved from {}", config.numbers_api_url);
    let app = make_app(fetcher, &config.title, &server_url);

    // ------------------ Main Loop -------------------
    let addr = format!("{}{}", "0.0.0.0:", config.http_port);
    match config.tls_files() {
        Some((cert, key)) => {
            info!("Listening for https requests on {}", addr);
            poem::Server::new(
                TcpListener::bind(addr).rustls(
                    RustlsConfig::new().fallback(
                        RustlsCertificate::new()
                            .key(std::fs::read(get_absolute_path(key))?)
                            .cert(std::fs::read(get_absolute_path(cert))?),
                    ),
                ),
            )
            .name(SERVER_NAME)
            .run(app)
            .await?;
        }
        None => {
            info!("Listening for http requests on {}", addr);
            poem::Server::new(TcpListener::bind(addr))
                .name(SERVER_NAME)
                .run(app)
                .await?;
        }
    }

    Ok(())
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// server_init:
// ---------------------------------------------------------------------------
/** Read the configuration, start logging and announce the build. */
fn server_init() -> Result<()> {
    // Configure our log.
    init_log(&RUNTIME_CTX.parms.config)?;

    info!("{}", Errors::InputParms(format!("{:#?}", *RUNTIME_CTX)));
    info!("\n{}.", build_info());
    Ok(())
}

// ---------------------------------------------------------------------------
// make_app:
// ---------------------------------------------------------------------------
/** Assemble the routes.  The api endpoints live under /api with the openapi
 * documents and swagger ui alongside them.
 */
fn make_app(fetcher: FactFetcher, title: &str, server_url: &str) -> impl Endpoint {
    let endpoints = (ClassifyApi::new(fetcher), VersionApi);
    let api_service =
        OpenApiService::new(endpoints, title, env!("CARGO_PKG_VERSION")).server(server_url);

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let ui = api_service.swagger_ui();

    Route::new()
        .at("/", get(welcome))
        .nest("/api", api_service)
        .nest("/docs", ui)
        .at("/spec", spec)
        .at("/spec_yaml", spec_yaml)
        .with(make_cors())
}

// ---------------------------------------------------------------------------
// make_cors:
// ---------------------------------------------------------------------------
// Any origin may call us.
fn make_cors() -> Cors {
    Cors::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(["Origin", "Content-Type", "Accept"])
        .allow_credentials(true)
}

// ***************************************************************************
//                             Welcome Endpoint
// ***************************************************************************
#[handler]
fn welcome() -> &'static str {
    WELCOME_MSG
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use poem::http::StatusCode;
    use poem::test::TestClient;

    fn test_app() -> impl Endpoint {
        let fetcher = FactFetcher::new("http://127.0.0.1:1").unwrap();
        make_app(fetcher, "test", "http://localhost:8081/api")
    }

    #[tokio::test]
    async fn welcome_page() {
        let cli = TestClient::new(test_app());
        let resp = cli.get("/").send().await;
        resp.assert_status_is_ok();
        resp.assert_text(WELCOME_MSG).await;
    }

    #[tokio::test]
    async fn cors_headers_on_cross_origin_requests() {
        let cli = TestClient::new(test_app());
        let resp = cli.get("/api/version")
            .header("Origin", "https://example.com")
            .send()
            .await;
        resp.assert_status_is_ok();
        resp.assert_header_exist("access-control-allow-origin");
        resp.assert_header("access-control-allow-credentials", "true");
    }

    #[tokio::test]
    async fn cors_preflight_lists_allowed_methods_and_headers() {
        let cli = TestClient::new(test_app());
        let resp = cli.options("/api/classify-number")
            .header("Origin", "https://example.com")
            .header("Access-Control-Request-Method", "GET")
            .header("Access-Control-Request-Headers", "content-type")
            .send()
            .await;
        resp.assert_status_is_ok();
        resp.assert_header_exist("access-control-allow-origin");
        resp.assert_header("access-control-allow-credentials", "true");

        let header = |name: &str| {
            resp.0.headers().get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_ascii_lowercase()
        };
        let methods = header("access-control-allow-methods");
        assert!(methods.contains("get"), "allow-methods: {}", methods);
        assert!(methods.contains("post"), "allow-methods: {}", methods);
        assert!(!methods.contains("delete"), "allow-methods: {}", methods);
        let headers = header("access-control-allow-headers");
        for h in ["origin", "content-type", "accept"] {
            assert!(headers.contains(h), "allow-headers: {}", headers);
        }
    }

    #[tokio::test]
    async fn cors_preflight_rejects_other_methods() {
        let cli = TestClient::new(test_app());
        let resp = cli.options("/api/classify-number")
            .header("Origin", "https://example.com")
            .header("Access-Control-Request-Method", "DELETE")
            .send()
            .await;
        assert_ne!(resp.0.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn openapi_spec_lists_classify_endpoint() {
        let cli = TestClient::new(test_app());
        let resp = cli.get("/spec").send().await;
        resp.assert_status_is_ok();
        let body = resp.0.into_body().into_string().await.unwrap();
        assert!(body.contains("/classify-number"));
        assert!(body.contains("/version"));
    }

    #[tokio::test]
    async fn input_errors_skip_upstream_entirely() {
        // The upstream is unreachable, so a 400 proves no lookup happened.
        let cli = TestClient::new(test_app());
        let resp = cli.get("/api/classify-number").query("number", &"12abc").send().await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }
}
