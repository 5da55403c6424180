use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand};
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{ProjectionInput, ProjectionResult, RawProjectionInput, Tier, run_projection};
use crate::present::{
    ChartSnapshot, DistributionChart, GrowthChart, Palette, RATE_PRESETS, Theme, active_preset,
    format_currency, format_percent, tier_message,
};
use crate::report::{Report, ReportError};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const DEFAULT_INITIAL_CAPITAL: &str = "10000";
const DEFAULT_CURRENT_AGE: &str = "25";
const DEFAULT_TARGET_AGE: &str = "65";
const DEFAULT_ANNUAL_RATE: &str = "8";
const DEFAULT_MONTHLY_CONTRIBUTION: &str = "500";

#[derive(Parser, Debug)]
#[command(
    name = "smartsave",
    about = "Compound-growth projection for a monthly savings plan"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the calculator page and the JSON API
    Serve {
        #[arg(long, env = "SMARTSAVE_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Print a projection
    Project {
        #[command(flatten)]
        args: ProjectionArgs,
        #[arg(long, help = "Print the full result as JSON")]
        json: bool,
    },
    /// Write the printable report
    Report {
        #[command(flatten)]
        args: ProjectionArgs,
        #[arg(long, short, help = "Output file; defaults to SmartSave-Savings-Report.html")]
        output: Option<PathBuf>,
    },
}

/// Form fields as free text. Malformed numbers count as zero.
#[derive(Args, Debug, Clone)]
struct ProjectionArgs {
    #[arg(long, default_value = DEFAULT_INITIAL_CAPITAL, allow_hyphen_values = true)]
    initial_capital: String,
    #[arg(long, default_value = DEFAULT_CURRENT_AGE, allow_hyphen_values = true)]
    current_age: String,
    #[arg(long, default_value = DEFAULT_TARGET_AGE, allow_hyphen_values = true)]
    target_age: String,
    #[arg(
        long,
        default_value = DEFAULT_ANNUAL_RATE,
        allow_hyphen_values = true,
        help = "Annual interest rate in percent, e.g. 8"
    )]
    annual_rate: String,
    #[arg(
        long,
        default_value = DEFAULT_MONTHLY_CONTRIBUTION,
        allow_hyphen_values = true,
        help = "Monthly contribution; negative values model withdrawals"
    )]
    monthly_contribution: String,
    #[arg(long, default_value = "light", help = "Chart colors: light or dark")]
    theme: String,
}

impl ProjectionArgs {
    fn raw(&self) -> RawProjectionInput {
        RawProjectionInput {
            initial_capital: Some(self.initial_capital.clone()),
            current_age: Some(self.current_age.clone()),
            target_age: Some(self.target_age.clone()),
            annual_rate: Some(self.annual_rate.clone()),
            monthly_contribution: Some(self.monthly_contribution.clone()),
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("failed to encode result: {0}")]
    Json(#[from] serde_json::Error),
}

/// A numeric field as sent by the browser: a JSON number or the text typed in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RawField {
    Number(f64),
    Text(String),
}

impl RawField {
    fn into_text(self) -> String {
        match self {
            RawField::Number(value) => value.to_string(),
            RawField::Text(text) => text,
        }
    }
}

/// A field that is present keeps its value and an explicit `null` reads as
/// blank text, so it coerces to zero like any other malformed entry.
fn present_field<'de, D>(deserializer: D) -> Result<Option<RawField>, D::Error>
where
    D: Deserializer<'de>,
{
    let field = Option::<RawField>::deserialize(deserializer)?;
    Ok(Some(field.unwrap_or(RawField::Text(String::new()))))
}

/// Absent numeric fields stay `None` and take the form defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    #[serde(deserialize_with = "present_field")]
    initial_capital: Option<RawField>,
    #[serde(deserialize_with = "present_field")]
    current_age: Option<RawField>,
    #[serde(deserialize_with = "present_field")]
    target_age: Option<RawField>,
    #[serde(deserialize_with = "present_field")]
    annual_rate: Option<RawField>,
    #[serde(deserialize_with = "present_field")]
    monthly_contribution: Option<RawField>,
    theme: Option<String>,
}

#[derive(Debug)]
struct ApiRequest {
    input: ProjectionInput,
    theme: Theme,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormattedFigures {
    final_value: String,
    total_invested: String,
    total_interest: String,
    monthly_rate: String,
    yield_ratio: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartsResponse {
    palette: Palette,
    distribution: DistributionChart,
    growth: GrowthChart,
    distribution_svg: Option<String>,
    growth_svg: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    input: ProjectionInput,
    theme: Theme,
    result: ProjectionResult,
    tier: Tier,
    icon: &'static str,
    message: String,
    formatted: FormattedFigures,
    rate_presets: [f64; 4],
    active_preset: Option<f64>,
    charts: ChartsResponse,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_cli(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve { port } => run_http_server(port).await?,
        Command::Project { args, json } => {
            let input = args.raw().coerce();
            let result = run_projection(&input);
            if json {
                let response = build_project_response(input, result, Theme::parse(&args.theme));
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print!("{}", render_summary(&result));
            }
        }
        Command::Report { args, output } => {
            let input = args.raw().coerce();
            let result = run_projection(&input);
            let today = chrono::Local::now().date_naive();
            let report = Report::build(&input, &result, today, Theme::parse(&args.theme));
            let path = output.unwrap_or_else(|| PathBuf::from(Report::file_name()));
            report.write_to(&path)?;
            println!("Report written to {}", path.display());
        }
    }
    Ok(())
}

fn render_summary(result: &ProjectionResult) -> String {
    let tier = Tier::of(result);
    let mut out = String::new();
    out.push_str(&format!("Final value:           {}\n", format_currency(result.final_value)));
    out.push_str(&format!("Total invested:        {}\n", format_currency(result.total_invested)));
    out.push_str(&format!("Interest earned:       {}\n", format_currency(result.total_interest)));
    out.push_str(&format!("Monthly rate:          {}\n", format_percent(result.monthly_rate)));
    out.push_str(&format!("Return on investment:  {}\n", format_percent(result.yield_ratio)));
    out.push_str(&format!("{} {}\n\n", tier.icon(), tier_message(tier, result)));
    out.push_str(&format!("{:>5} {:>18} {:>18}\n", "Age", "Total", "Invested"));
    for point in &result.yearly_series {
        out.push_str(&format!(
            "{:>5} {:>18} {:>18}\n",
            point.age,
            format_currency(point.total),
            format_currency(point.invested)
        ));
    }
    out
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route(
            "/api/report",
            get(report_get_handler).post(report_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("SmartSave listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
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
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn report_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    report_handler_impl(payload)
}

async fn report_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    report_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let request = api_request_from_payload(payload);
    let result = run_projection(&request.input);
    debug!(
        "Projected {:?}: {} years, final value {}",
        request.input, result.years, result.final_value
    );
    json_response(
        StatusCode::OK,
        build_project_response(request.input, result, request.theme),
    )
}

fn report_handler_impl(payload: ProjectPayload) -> Response {
    let request = api_request_from_payload(payload);
    let result = run_projection(&request.input);
    let today = chrono::Local::now().date_naive();
    let report = Report::build(&request.input, &result, today, request.theme);

    let disposition = format!("attachment; filename=\"{}\"", Report::file_name());
    with_cache_control((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.to_html(),
    ))
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

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(api_request_from_payload(payload))
}

/// Absent fields keep their defaults; present ones are coerced, so malformed
/// text becomes zero rather than an error.
fn api_request_from_payload(payload: ProjectPayload) -> ApiRequest {
    let mut raw = default_raw_for_api();

    if let Some(v) = payload.initial_capital {
        raw.initial_capital = Some(v.into_text());
    }
    if let Some(v) = payload.current_age {
        raw.current_age = Some(v.into_text());
    }
    if let Some(v) = payload.target_age {
        raw.target_age = Some(v.into_text());
    }
    if let Some(v) = payload.annual_rate {
        raw.annual_rate = Some(v.into_text());
    }
    if let Some(v) = payload.monthly_contribution {
        raw.monthly_contribution = Some(v.into_text());
    }

    ApiRequest {
        input: raw.coerce(),
        theme: payload
            .theme
            .as_deref()
            .map(Theme::parse)
            .unwrap_or_default(),
    }
}

fn default_raw_for_api() -> RawProjectionInput {
    RawProjectionInput {
        initial_capital: Some(DEFAULT_INITIAL_CAPITAL.to_string()),
        current_age: Some(DEFAULT_CURRENT_AGE.to_string()),
        target_age: Some(DEFAULT_TARGET_AGE.to_string()),
        annual_rate: Some(DEFAULT_ANNUAL_RATE.to_string()),
        monthly_contribution: Some(DEFAULT_MONTHLY_CONTRIBUTION.to_string()),
    }
}

fn render_snapshot(name: &str, chart: &dyn ChartSnapshot, palette: &Palette) -> Option<String> {
    match chart.snapshot(palette) {
        Ok(snapshot) => Some(snapshot.svg),
        Err(err) => {
            warn!("Could not render {name} chart: {err}");
            None
        }
    }
}

fn build_project_response(
    input: ProjectionInput,
    result: ProjectionResult,
    theme: Theme,
) -> ProjectResponse {
    let tier = Tier::of(&result);
    let palette = Palette::for_theme(theme);
    let distribution = DistributionChart::from_result(&result);
    let growth = GrowthChart::from_result(&result);

    ProjectResponse {
        input,
        theme,
        tier,
        icon: tier.icon(),
        message: tier_message(tier, &result),
        formatted: FormattedFigures {
            final_value: format_currency(result.final_value),
            total_invested: format_currency(result.total_invested),
            total_interest: format_currency(result.total_interest),
            monthly_rate: format_percent(result.monthly_rate),
            yield_ratio: format_percent(result.yield_ratio),
        },
        rate_presets: RATE_PRESETS,
        active_preset: active_preset(input.annual_rate),
        charts: ChartsResponse {
            palette,
            distribution_svg: render_snapshot("distribution", &distribution, &palette),
            growth_svg: render_snapshot("growth", &growth, &palette),
            distribution,
            growth,
        },
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MAX_HORIZON_YEARS;
    use axum::http::Uri;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn api_request_from_json_parses_numbers_and_text() {
        let json = r#"{
          "initialCapital": 1000,
          "currentAge": "30",
          "targetAge": 31.7,
          "annualRate": "0",
          "monthlyContribution": "100",
          "theme": "dark"
        }"#;
        let request = api_request_from_json(json).expect("json should parse");

        assert_approx(request.input.initial_capital, 1_000.0);
        assert_eq!(request.input.current_age, 30);
        assert_eq!(request.input.target_age, 31);
        assert_approx(request.input.annual_rate, 0.0);
        assert_approx(request.input.monthly_contribution, 100.0);
        assert_eq!(request.theme, Theme::Dark);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let request = api_request_from_json("{}").expect("json should parse");

        assert_approx(request.input.initial_capital, 10_000.0);
        assert_eq!(request.input.current_age, 25);
        assert_eq!(request.input.target_age, 65);
        assert_approx(request.input.annual_rate, 8.0);
        assert_approx(request.input.monthly_contribution, 500.0);
        assert_eq!(request.theme, Theme::Light);
    }

    #[test]
    fn malformed_fields_coerce_to_zero() {
        let json = r#"{
          "initialCapital": "lots",
          "currentAge": "",
          "annualRate": "seven",
          "monthlyContribution": "12abc",
          "theme": "neon"
        }"#;
        let request = api_request_from_json(json).expect("json should parse");

        assert_approx(request.input.initial_capital, 0.0);
        assert_eq!(request.input.current_age, 0);
        assert_eq!(request.input.target_age, 65);
        assert_approx(request.input.annual_rate, 0.0);
        assert_approx(request.input.monthly_contribution, 12.0);
        assert_eq!(request.theme, Theme::Light);
    }

    #[test]
    fn null_fields_coerce_to_zero_instead_of_defaults() {
        let request =
            api_request_from_json(r#"{"initialCapital": null}"#).expect("json should parse");
        assert_eq!(request.input.initial_capital, 0.0);
        assert_approx(request.input.monthly_contribution, 500.0);

        let json = r#"{
          "currentAge": null,
          "targetAge": null,
          "annualRate": null,
          "monthlyContribution": null,
          "theme": null
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        assert_eq!(request.input.current_age, 0);
        assert_eq!(request.input.target_age, 0);
        assert_eq!(request.input.annual_rate, 0.0);
        assert_eq!(request.input.monthly_contribution, 0.0);
        assert_approx(request.input.initial_capital, 10_000.0);
        assert_eq!(request.theme, Theme::Light);
    }

    #[test]
    fn widest_age_span_projects_a_bounded_series() {
        let json = r#"{"currentAge":"-2147483648","targetAge":"2147483647"}"#;
        let request = api_request_from_json(json).expect("json should parse");
        assert_eq!(request.input.current_age, i32::MIN);
        assert_eq!(request.input.target_age, i32::MAX);

        let result = run_projection(&request.input);
        assert_eq!(result.years, MAX_HORIZON_YEARS);
        assert_eq!(result.yearly_series.len(), MAX_HORIZON_YEARS as usize + 1);

        let response = build_project_response(request.input, result, request.theme);
        assert_eq!(response.charts.growth.ages.len(), MAX_HORIZON_YEARS as usize + 1);
    }

    #[test]
    fn query_string_values_are_coerced() {
        let uri: Uri = "/api/project?initialCapital=0&currentAge=30&targetAge=31&annualRate=12&monthlyContribution=100x"
            .parse()
            .expect("valid uri");
        let Query(payload) = Query::<ProjectPayload>::try_from_uri(&uri).expect("query parses");
        let request = api_request_from_payload(payload);

        assert_eq!(request.input.current_age, 30);
        assert_eq!(request.input.target_age, 31);
        assert_approx(request.input.annual_rate, 12.0);
        assert_approx(request.input.monthly_contribution, 100.0);
    }

    #[test]
    fn project_response_serialization_contains_expected_fields() {
        let input = ProjectionInput {
            initial_capital: 0.0,
            current_age: 30,
            target_age: 31,
            annual_rate: 12.0,
            monthly_contribution: 100.0,
        };
        let response = build_project_response(input, run_projection(&input), Theme::Light);

        assert_eq!(response.formatted.final_value, "$1,268.25");
        assert_eq!(response.formatted.total_invested, "$1,200.00");
        assert_eq!(response.formatted.monthly_rate, "1.00%");
        assert_eq!(response.active_preset, Some(12.0));
        assert!(response.charts.distribution_svg.is_some());
        assert!(response.charts.growth_svg.is_some());

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"finalValue\""));
        assert!(json.contains("\"yearlySeries\""));
        assert!(json.contains("\"yieldRatio\""));
        assert!(json.contains("\"tier\":\"modest\""));
        assert!(json.contains("\"activePreset\":12.0"));
        assert!(json.contains("\"distributionSvg\""));
        assert!(json.contains("\"theme\":\"light\""));
    }

    #[test]
    fn overflowed_projection_still_responds_without_svgs() {
        let input = ProjectionInput {
            initial_capital: 1e300,
            current_age: 0,
            target_age: 100,
            annual_rate: 100.0,
            monthly_contribution: 0.0,
        };
        let result = run_projection(&input);
        assert!(result.final_value.is_infinite());

        let response = build_project_response(input, result, Theme::Dark);
        assert!(response.charts.distribution_svg.is_none());
        assert!(response.charts.growth_svg.is_none());
        assert_eq!(response.formatted.final_value, "$∞");
    }

    #[test]
    fn zero_horizon_reports_no_horizon_tier() {
        let request = api_request_from_json(r#"{"currentAge": 40, "targetAge": 35}"#)
            .expect("json should parse");
        let result = run_projection(&request.input);
        let response = build_project_response(request.input, result, request.theme);

        assert_eq!(response.tier, Tier::NoHorizon);
        assert_eq!(response.result.yearly_series.len(), 1);
        assert_approx(response.result.final_value, 10_000.0);
    }

    #[test]
    fn report_response_is_an_html_attachment() {
        let response = report_handler_impl(ProjectPayload::default());

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers.get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some("text/html; charset=utf-8".as_bytes())
        );
        let disposition = headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(disposition.contains("SmartSave-Savings-Report.html"));
        assert_eq!(
            headers.get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some("no-store".as_bytes())
        );
    }

    #[test]
    fn summary_lists_one_row_per_year() {
        let input = ProjectionInput {
            initial_capital: 1_000.0,
            current_age: 30,
            target_age: 33,
            annual_rate: 0.0,
            monthly_contribution: 100.0,
        };
        let summary = render_summary(&run_projection(&input));

        assert!(summary.contains("Final value:           $4,600.00"));
        assert!(summary.contains("Return on investment:  0.00%"));
        let rows = summary
            .lines()
            .filter(|line| line.trim_start().starts_with("3"))
            .count();
        assert_eq!(rows, 4);
    }

    #[test]
    fn cli_parses_negative_contribution_and_subcommands() {
        let cli = Cli::try_parse_from([
            "smartsave",
            "project",
            "--monthly-contribution",
            "-250",
            "--json",
        ])
        .expect("cli should parse");
        let Command::Project { args, json } = cli.command else {
            panic!("expected project command");
        };
        assert!(json);
        assert_approx(args.raw().coerce().monthly_contribution, -250.0);
        assert_eq!(args.raw().coerce().target_age, 65);
    }
}
