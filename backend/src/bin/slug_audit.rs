//! Report products whose slug is missing or malformed, with a proposed fix.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use marketplace::config::DataApiSettings;
use marketplace::domain::Slug;
use marketplace::domain::ports::{DataPort, Order, Row, Table, TableQuery};
use marketplace::domain::services::UniqueSlugGenerator;
use marketplace::outbound::postgrest::PostgrestDataPort;
use marketplace::telemetry;
use ortho_config::OrthoConfig;
use serde_json::Value;
use tokio::runtime::Builder;
use tracing::info;
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: u32 = 200;

/// `slug-audit` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "slug-audit",
    about = "List products with missing or invalid slugs and propose replacements",
    version
)]
struct CliArgs {
    /// Project URL. Falls back to `DATA_API_URL`.
    #[arg(long, value_name = "url")]
    url: Option<String>,
    /// API key. Falls back to `DATA_API_KEY`.
    #[arg(long, value_name = "key")]
    key: Option<String>,
    /// Rows fetched per request.
    #[arg(long = "page-size", value_name = "rows", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,
}

/// Why a product's slug needs attention.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Problem {
    Missing,
    Invalid(String),
}

/// One product whose slug should be replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Finding {
    product_id: Uuid,
    current: Option<String>,
    problem: Problem,
    proposed: Slug,
}

impl Finding {
    fn line(&self) -> String {
        let reason = match &self.problem {
            Problem::Missing => "missing".to_owned(),
            Problem::Invalid(detail) => format!("invalid ({detail})"),
        };
        format!(
            "{}\t{reason}\t{}\t{}",
            self.product_id,
            self.current.as_deref().unwrap_or("-"),
            self.proposed
        )
    }
}

fn text(row: &Row, column: &str) -> Option<String> {
    row.get(column).and_then(Value::as_str).map(str::to_owned)
}

fn problem_with(current: Option<&str>) -> Option<Problem> {
    match current.map(str::trim).filter(|slug| !slug.is_empty()) {
        None => Some(Problem::Missing),
        Some(slug) => Slug::new(slug)
            .err()
            .map(|error| Problem::Invalid(error.to_string())),
    }
}

/// Walk every product, newest first, and collect slugs that need fixing.
async fn audit<D>(port: Arc<D>, page_size: u32) -> Result<Vec<Finding>>
where
    D: DataPort + ?Sized,
{
    let mut generator = UniqueSlugGenerator::new(Arc::clone(&port));
    let page_size = page_size.max(1);
    let mut findings = Vec::new();
    let mut offset = 0;

    loop {
        let query = TableQuery::new(Table::Products)
            .columns("id,title,slug")
            .order(Order::desc("created_at"))
            .order(Order::desc("id"))
            .limit(page_size)
            .offset(offset);
        let rows = port
            .list(&query)
            .await
            .wrap_err("failed to read products")?;
        let fetched = rows.len();

        for row in rows {
            let current = text(&row, "slug");
            let Some(problem) = problem_with(current.as_deref()) else {
                continue;
            };
            let product_id = text(&row, "id")
                .and_then(|id| Uuid::parse_str(&id).ok())
                .ok_or_else(|| eyre!("product row without a valid id"))?;
            let title = text(&row, "title").unwrap_or_default();
            let proposal = generator
                .generate(&title, Some(product_id))
                .await
                .wrap_err_with(|| format!("failed to propose a slug for {product_id}"))?;
            generator.reserve(proposal.slug.as_str());
            findings.push(Finding {
                product_id,
                current,
                problem,
                proposed: proposal.slug,
            });
        }

        if fetched < page_size as usize {
            break;
        }
        offset += page_size;
    }
    Ok(findings)
}

/// Arguments forwarded to the settings loader so flags outrank the
/// environment and config files.
fn settings_args(args: &CliArgs) -> Vec<OsString> {
    let mut forwarded = vec![OsString::from("slug-audit")];
    for (flag, value) in [("--url", &args.url), ("--key", &args.key)] {
        if let Some(value) = value {
            forwarded.push(OsString::from(flag));
            forwarded.push(OsString::from(value));
        }
    }
    forwarded
}

fn settings(args: &CliArgs) -> Result<DataApiSettings> {
    DataApiSettings::load_from_iter(settings_args(args))
        .map_err(|error| eyre!("failed to load DATA_API settings: {error}"))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    telemetry::init();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = CliArgs::parse();
    let settings = settings(&args)?;
    let port = PostgrestDataPort::new(&settings.endpoint()?, settings.api_key()?, settings.timeout())?
        .with_schema(settings.schema());

    let findings = audit(Arc::new(port), args.page_size).await?;
    for finding in &findings {
        println!("{}", finding.line());
    }
    info!(findings = findings.len(), "slug audit finished");
    Ok(())
}
