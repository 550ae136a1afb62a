mod error;

pub use error::{ApiError, GENERIC_FAILURE};

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::core::{
    FirstMonthPayment, MonthlyAverages, MortgageInput, TotalSummary, YearlySummary,
    run_calculation,
};
use crate::form::{FormPayload, FormValues, parse_form};
use crate::report::{Report, build_report};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub input: MortgageInput,
    pub total_months: u32,
    pub first_month: FirstMonthPayment,
    pub monthly_averages: MonthlyAverages,
    pub yearly: Vec<YearlySummary>,
    pub total: TotalSummary,
    pub report: Report,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route("/api/defaults", get(defaults_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("mortgage calculator listening on http://{addr}");
    info!("local access: http://127.0.0.1:{}/", addr.port());

    axum::serve(listener, router()).await
}

pub fn calculate(payload: FormPayload) -> Result<CalculateResponse, ApiError> {
    let values = payload.into_form_values()?;
    calculate_form(&values)
}

/// Validates raw form values and runs the engine. Shared by both HTTP
/// methods and the `calculate` command.
pub fn calculate_form(values: &FormValues) -> Result<CalculateResponse, ApiError> {
    let input = parse_form(values)?;
    let calc = run_calculation(&input);
    let report = build_report(&calc)?;

    Ok(CalculateResponse {
        total_months: calc.input.total_months(),
        input: calc.input,
        first_month: calc.first_month,
        monthly_averages: calc.monthly_averages,
        yearly: calc.yearly,
        total: calc.total,
        report,
    })
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", None)
}

async fn defaults_handler() -> Response {
    json_response(StatusCode::OK, FormValues::default())
}

async fn calculate_get_handler(payload: Result<Query<FormPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => calculate_handler_impl(payload),
        Err(rejection) => rejected_request(&rejection.body_text()),
    }
}

async fn calculate_post_handler(payload: Result<Json<FormPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => calculate_handler_impl(payload),
        Err(rejection) => rejected_request(&rejection.body_text()),
    }
}

/// Undecodable bodies and query strings get the same JSON error shape as
/// invalid fields.
fn rejected_request(detail: &str) -> Response {
    debug!(detail, "rejected undecodable calculate request");
    error_response(
        StatusCode::BAD_REQUEST,
        &format!("Invalid request: {detail}"),
        None,
    )
}

fn calculate_handler_impl(payload: FormPayload) -> Response {
    match calculate(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(e) => e.into_response(),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str, field: Option<&'static str>) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            field,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalculationError;
    use axum::{body::Body, http::Request};
    use serde_json::Value;
    use tower::ServiceExt;

    const VALID_QUERY: &str =
        "principal=300000&interestRate=4&paymentType=annuity&mortgageTerm=30&taxRate=37";

    async fn send(request: Request<Body>) -> Response {
        router()
            .oneshot(request)
            .await
            .expect("router never fails")
    }

    async fn get(uri: &str) -> Response {
        send(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
    }

    async fn post_json(body: &'static str) -> Response {
        send(
            Request::builder()
                .method("POST")
                .uri("/api/calculate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .expect("request should build"),
        )
        .await
    }

    fn header_str(response: &Response, name: header::HeaderName) -> &str {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    fn payload(json: &str) -> FormPayload {
        serde_json::from_str(json).expect("payload should parse")
    }

    #[tokio::test]
    async fn calculate_returns_report_for_valid_form() {
        let response = calculate_handler_impl(payload(
            r#"{
              "principal": "300000",
              "interestRate": "4",
              "paymentType": "annuity",
              "mortgageTerm": "30",
              "taxRate": "37",
              "inflationRate": "0"
            }"#,
        ));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&header::HeaderValue::from_static("no-store"))
        );

        let json = body_json(response).await;
        assert_eq!(json["totalMonths"], 360);
        assert_eq!(json["input"]["paymentType"], "annuity");
        assert_eq!(json["report"]["showRealValues"], false);
        assert_eq!(json["report"]["display"]["monthlyPayment"], "€\u{a0}1.432");
        assert_eq!(json["report"]["table"]["rows"].as_array().map(Vec::len), Some(30));
        assert_eq!(json["report"]["table"]["totals"]["year"], "Total");
        assert_eq!(json["yearly"].as_array().map(Vec::len), Some(30));
        assert!(json.get("schedule").is_none());
    }

    #[tokio::test]
    async fn calculate_rejects_invalid_field_with_message() {
        let response = calculate_handler_impl(payload(
            r#"{
              "principal": "300000",
              "interestRate": "4",
              "paymentType": "linear",
              "mortgageTerm": "30",
              "taxRate": "137"
            }"#,
        ));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Please enter a valid tax rate (0-100)");
        assert_eq!(json["field"], "taxRate");
    }

    #[tokio::test]
    async fn calculate_reports_missing_fields() {
        let response = calculate_handler_impl(payload(r#"{"principal": 1000}"#));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        let message = json["error"].as_str().expect("error message");
        assert!(message.contains("interestRate"));
        assert!(message.contains("taxRate"));
        assert!(json.get("field").is_none());
    }

    #[tokio::test]
    async fn calculation_failure_is_a_generic_server_error() {
        let response = ApiError::from(CalculationError::NonFinite {
            figure: "total payment".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn unknown_paths_are_json_not_found() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Not found");
    }

    #[tokio::test]
    async fn defaults_are_a_valid_form() {
        let json = body_json(defaults_handler().await).await;
        let values: FormValues = serde_json::from_value(json).expect("defaults deserialize");
        assert!(parse_form(&values).is_ok());
    }

    #[test]
    fn calculate_with_inflation_carries_real_figures() {
        let response = calculate(payload(
            r#"{
              "principal": 200000,
              "interestRate": 3,
              "paymentType": "linear",
              "mortgageTerm": 20,
              "taxRate": 37,
              "inflationRate": 2
            }"#,
        ))
        .expect("valid form");
        assert!(response.report.show_real_values);
        assert_eq!(response.total_months, 240);
        assert!(response.total.real.net_payment < response.total.net_payment);
    }

    #[tokio::test]
    async fn malformed_json_body_is_a_json_bad_request() {
        let response = post_json("{not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(header_str(&response, header::CONTENT_TYPE).starts_with("application/json"));
        let json = body_json(response).await;
        let message = json["error"].as_str().expect("error message");
        assert!(message.starts_with("Invalid request: "));
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_a_json_bad_request() {
        let response = post_json(
            r#"{
              "principal": true,
              "interestRate": "4",
              "paymentType": "annuity",
              "mortgageTerm": "30",
              "taxRate": "37"
            }"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(header_str(&response, header::CONTENT_TYPE).starts_with("application/json"));
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn post_route_calculates_valid_form() {
        let response = post_json(
            r#"{
              "principal": "300000",
              "interestRate": "4",
              "paymentType": "linear",
              "mortgageTerm": "30",
              "taxRate": "37",
              "inflationRate": "2"
            }"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["input"]["paymentType"], "linear");
        assert_eq!(json["report"]["showRealValues"], true);
    }

    #[tokio::test]
    async fn get_route_reads_the_query_string() {
        let response = get(&format!("/api/calculate?{VALID_QUERY}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, header::CACHE_CONTROL), "no-store");
        let json = body_json(response).await;
        assert_eq!(json["totalMonths"], 360);
        assert_eq!(json["report"]["display"]["monthlyPayment"], "€\u{a0}1.432");
    }

    #[tokio::test]
    async fn get_route_rejects_terms_beyond_the_bound() {
        let response = get(
            "/api/calculate?principal=300000&interestRate=4&paymentType=annuity&mortgageTerm=101&taxRate=37",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Please enter a valid mortgage term");
        assert_eq!(json["field"], "mortgageTerm");
    }

    #[tokio::test]
    async fn static_assets_are_served_uncached_with_their_types() {
        for (uri, content_type) in [
            ("/", "text/html"),
            ("/index.html", "text/html"),
            ("/styles.css", "text/css"),
            ("/app.js", "application/javascript"),
        ] {
            let response = get(uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert!(
                header_str(&response, header::CONTENT_TYPE).starts_with(content_type),
                "{uri}"
            );
            assert_eq!(header_str(&response, header::CACHE_CONTROL), "no-store", "{uri}");
        }
    }

    #[tokio::test]
    async fn router_falls_back_to_json_not_found() {
        let response = get("/does-not-exist").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Not found");
    }

    #[tokio::test]
    async fn defaults_route_is_wired() {
        let response = get("/api/defaults").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["mortgageTerm"], "30");
    }

    #[test]
    fn page_script_shares_failure_message_and_checks_fields() {
        assert!(APP_JS.contains(&format!("'{GENERIC_FAILURE}'")));
        assert!(APP_JS.contains("function missingFields()"));
        for field in [
            crate::form::PRINCIPAL,
            crate::form::INTEREST_RATE,
            crate::form::PAYMENT_TYPE,
            crate::form::MORTGAGE_TERM,
            crate::form::TAX_RATE,
            crate::form::INFLATION_RATE,
        ] {
            assert!(APP_JS.contains(&format!("'{field}'")), "{field}");
            assert!(INDEX_HTML.contains(&format!("id=\"{field}\"")), "{field}");
        }
    }
}
