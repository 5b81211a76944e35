//! AWS Lambda handler for calculator requests
//!
//! Accepts a single calculation request, or a JSON array of them, and returns
//! the engine results. Supports Lambda Function URLs for direct HTTP access.
//!
//! Reference tables come from `CALC_DATA_DIR` when set, otherwise the
//! built-in tables are used.

use std::path::Path;

use aws_lambda_events::event::lambda_function_urls::{
    LambdaFunctionUrlRequest, LambdaFunctionUrlResponse,
};
use aws_lambda_events::http::{header, HeaderMap, HeaderValue};
use calculator_engines::{CalcError, CalcRequest, Calculator};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::info;
use serde_json::{json, Value};

const DATA_DIR_VAR: &str = "CALC_DATA_DIR";

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers
}

fn response(status_code: i64, body: Option<String>) -> LambdaFunctionUrlResponse {
    LambdaFunctionUrlResponse {
        status_code,
        headers: cors_headers(),
        body,
        is_base64_encoded: false,
        cookies: Vec::new(),
    }
}

fn error_response(status_code: i64, message: &str) -> LambdaFunctionUrlResponse {
    response(status_code, Some(json!({ "error": message }).to_string()))
}

fn error_body(error: &CalcError) -> Value {
    json!({
        "error": {
            "code": error.error_code(),
            "message": error.to_string(),
            "details": error,
        }
    })
}

/// Run one request, reporting engine failures in the body
fn run_one(calculator: &Calculator, request: &CalcRequest) -> Value {
    match calculator.run(request) {
        Ok(result) => json!(result),
        Err(e) => error_body(&e),
    }
}

/// Lambda handler function
async fn handler(
    calculator: &Calculator,
    event: LambdaEvent<LambdaFunctionUrlRequest>,
) -> Result<LambdaFunctionUrlResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    // Handle CORS preflight
    if request.request_context.http.method.as_deref() == Some("OPTIONS") {
        return Ok(response(200, None));
    }

    if request.is_base64_encoded {
        return Ok(error_response(400, "Binary request bodies are not supported"));
    }

    let body: Value = match serde_json::from_str(request.body.as_deref().unwrap_or("{}")) {
        Ok(v) => v,
        Err(e) => return Ok(error_response(400, &format!("Invalid JSON: {}", e))),
    };

    // An array body is a batch; each element succeeds or fails on its own
    let (status, output) = if body.is_array() {
        let requests: Vec<CalcRequest> = match serde_json::from_value(body) {
            Ok(r) => r,
            Err(e) => return Ok(error_response(400, &format!("Invalid request: {}", e))),
        };
        let results: Vec<Value> = calculator
            .run_batch(&requests)
            .into_iter()
            .map(|result| match result {
                Ok(r) => json!(r),
                Err(e) => error_body(&e),
            })
            .collect();
        info!("batch of {} requests in {:?}", requests.len(), start.elapsed());
        (200, Value::Array(results))
    } else {
        let request: CalcRequest = match serde_json::from_value(body) {
            Ok(r) => r,
            Err(e) => return Ok(error_response(400, &format!("Invalid request: {}", e))),
        };
        let output = run_one(calculator, &request);
        let status = if output.get("error").is_some() { 422 } else { 200 };
        info!("{} request in {:?}", request.name(), start.elapsed());
        (status, output)
    };

    Ok(response(status, Some(output.to_string())))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let calculator = match std::env::var(DATA_DIR_VAR) {
        Ok(dir) => Calculator::from_data_dir(Path::new(&dir))?,
        Err(_) => Calculator::new(),
    };

    let calculator = &calculator;
    run(service_fn(move |event| async move { handler(calculator, event).await })).await
}
