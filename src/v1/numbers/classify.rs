#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, Object, param::Query, ApiResponse };
use log::{error, info, warn};

use crate::utils::classifier::{self, Classification};
use crate::utils::errors::InputError;
use crate::utils::fact_fetcher::FactFetcher;
use crate::utils::server_utils::{self, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
/// The classification endpoint.  Holds the process-wide fact fetcher.
pub struct ClassifyApi {
    fetcher: FactFetcher,
}

struct ReqClassify
{
    number: Option<String>,
}

#[derive(Object, Debug)]
pub struct RespClassify
{
    number: u64,
    is_prime: bool,
    is_perfect: bool,
    properties: Vec<String>,
    digit_sum: u64,
    fun_fact: String,
}

#[derive(Object, Debug)]
pub struct RespError
{
    error: bool,
    #[oai(skip_serializing_if_is_none)]
    number: Option<String>,
    message: String,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqClassify {
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(64);
        s.push_str("  Request parameters:");
        s.push_str("\n    number: ");
        s.push_str(self.number.as_deref().unwrap_or("None"));
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum ClassifyResponse {
    #[oai(status = 200)]
    Http200(Json<RespClassify>),
    #[oai(status = 400)]
    Http400(Json<RespError>),
    #[oai(status = 500)]
    Http500(Json<RespError>),
}

fn make_http_200(resp: RespClassify) -> ClassifyResponse {
    ClassifyResponse::Http200(Json(resp))
}
fn make_http_400(e: &InputError) -> ClassifyResponse {
    ClassifyResponse::Http400(Json(RespError::new(e.raw_input(), e.to_string())))
}
fn make_http_500(msg: String) -> ClassifyResponse {
    ClassifyResponse::Http500(Json(RespError::new(None, msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl ClassifyApi {
    /// Classify a non-negative integer and attach a math fun fact.
    #[oai(path = "/classify-number", method = "get")]
    async fn classify_number_api(&self, http_req: &Request, number: Query<Option<String>>) -> ClassifyResponse {
        let req = ReqClassify {number: number.0};
        server_utils::debug_request(http_req, &req);

        // -------------------- Validate Input -----------------------
        let n = match parse_number(req.number.as_deref()) {
            Ok(n) => n,
            Err(e) => {
                warn!("Rejected classify request: {}", e);
                return make_http_400(&e);
            }
        };

        // -------------------- Process Request ----------------------
        // Nothing is returned unless the fact lookup succeeds.
        let fun_fact = match self.fetcher.fetch(n).await {
            Ok(f) => f,
            Err(e) => {
                let msg = e.to_string();
                error!("{}", msg);
                return make_http_500(msg);
            }
        };

        // Trial division on a large n takes seconds, keep it off the async workers.
        let classification = match tokio::task::spawn_blocking(move || classifier::classify(n)).await {
            Ok(c) => c,
            Err(e) => {
                let msg = format!("ERROR: classification of {} failed: {}", n, e);
                error!("{}", msg);
                return make_http_500(msg);
            }
        };

        let resp = RespClassify::new(classification, fun_fact);
        info!("Classified {}: prime={}, perfect={}, properties={:?}",
              resp.number, resp.is_prime, resp.is_perfect, resp.properties);
        make_http_200(resp)
    }
}

impl ClassifyApi {
    pub fn new(fetcher: FactFetcher) -> Self {
        Self { fetcher }
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespClassify {
    fn new(c: Classification, fun_fact: String) -> Self {
        Self {
            number: c.number,
            is_prime: c.is_prime,
            is_perfect: c.is_perfect,
            properties: c.properties.iter().map(|p| p.to_string()).collect(),
            digit_sum: c.digit_sum,
            fun_fact,
        }
    }
}

impl RespError {
    fn new(number: Option<&str>, message: String) -> Self {
        Self {error: true, number: number.map(str::to_string), message}
    }
}

// ***************************************************************************
//                          Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// parse_number:
// ---------------------------------------------------------------------------
/** The single validation step for the number query parameter.  Surrounding
 * whitespace is ignored and a leading '+' is accepted.  Anything that isn't
 * a base-10 integer in the range 0..=u64::MAX is rejected, negative values
 * included.  Decimal and exponent forms ("1.5", "1e3") are rejected too
 * rather than truncated to an integer.
 */
pub fn parse_number(raw: Option<&str>) -> Result<u64, InputError> {
    let raw = match raw {
        Some(r) => r,
        None => return Err(InputError::Missing),
    };
    let s = raw.trim();
    if s.is_empty() {
        return Err(InputError::Missing);
    }

    // The optional sign is followed by one or more ascii digits, nothing else.
    let (negative, digits) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::InvalidFormat(raw.to_string()));
    }

    // "-0" is still zero.
    if negative {
        if digits.bytes().all(|b| b == b'0') {
            return Ok(0);
        }
        return Err(InputError::Negative(raw.to_string()));
    }

    digits.parse::<u64>().map_err(|_| InputError::OutOfRange(raw.to_string()))
}
