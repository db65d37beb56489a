#![forbid(unsafe_code)]

use poem_openapi::{ OpenApi, payload::Json, Object };

// From cargo.toml and build.rs.
const SERVER_VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");
const GIT_BRANCH: Option<&str> = option_env!("GIT_BRANCH");
const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT_SHORT");
const GIT_DIRTY: Option<&str> = option_env!("GIT_DIRTY");
const SOURCE_TS: Option<&str> = option_env!("SOURCE_TIMESTAMP");
const RUSTC_VERSION: Option<&str> = option_env!("RUSTC_VERSION");

const UNKNOWN: &str = "unknown";

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct VersionApi;

#[derive(Object, Debug)]
pub struct RespVersion
{
    server_version: String,
    git_branch: String,
    git_commit: String,
    git_dirty: String,
    source_ts: String,
    rustc_version: String,
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl VersionApi {
    #[oai(path = "/version", method = "get")]
    async fn get_version(&self) -> Json<RespVersion> {
        Json(RespVersion::new())
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespVersion {
    fn new() -> Self {
        Self {server_version: SERVER_VERSION.unwrap_or(UNKNOWN).to_string(),
              git_branch: GIT_BRANCH.unwrap_or(UNKNOWN).to_string(),
              git_commit: GIT_COMMIT.unwrap_or(UNKNOWN).to_string(),
              git_dirty: GIT_DIRTY.unwrap_or(UNKNOWN).to_string(),
              source_ts: SOURCE_TS.unwrap_or(UNKNOWN).to_string(),
              rustc_version: RUSTC_VERSION.unwrap_or(UNKNOWN).to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// build_info:
// ---------------------------------------------------------------------------
/** One line summary of the build for the startup log. */
pub fn build_info() -> String {
    let v = RespVersion::new();
    format!("*** Running numclass_server={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}",
            v.server_version, v.git_branch, v.git_commit, v.git_dirty, v.source_ts, v.rustc_version)
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use poem::test::TestClient;
    use poem::Route;
    use poem_openapi::OpenApiService;

    #[tokio::test]
    async fn reports_package_version() {
        let api_service = OpenApiService::new(VersionApi, "test", "0.0.0");
        let cli = TestClient::new(Route::new().nest("/api", api_service));
        let resp = cli.get("/api/version").send().await;
        resp.assert_status_is_ok();

        let body = resp.0.into_body().into_string().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["server_version"], env!("CARGO_PKG_VERSION"));
        assert!(json["rustc_version"].is_string());
    }

    #[test]
    fn build_info_names_the_server() {
        assert!(build_info().contains("numclass_server="));
    }
}
