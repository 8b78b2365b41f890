use anyhow::{Context, Result};
use clap::Parser;
use pfmt_client::http::Method;
use pfmt_client::probe::{self, Probe};
use pfmt_client::{AsyncOperationTracker, ClientConfig, Outcome, RequestClient};

/// pfmt-client - PFMT API client
///
/// Sends one request to the PFMT backend with the development identity
/// headers and prints the JSON response.
///
/// The base address defaults to http://localhost:3004 and can be set with
/// --base-url or the PFMT_API_BASE_URL environment variable.
///
/// Examples:
///   pfmt-client get /api/test
///   pfmt-client post /api/projects --data '{"name": "Bridge rehab"}'
#[derive(Parser, Debug)]
#[command(author, version = env!("PFMT_CLIENT_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base address (also via PFMT_API_BASE_URL)
    #[arg(long = "base-url", env = "PFMT_API_BASE_URL", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Header override in the form name:value (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE", global = true)]
    pub headers: Vec<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Send a GET request
    Get(EndpointArgs),

    /// Send a POST request with a JSON body
    Post(PayloadArgs),

    /// Send a PUT request with a JSON body
    Put(PayloadArgs),

    /// Send a DELETE request
    Delete(EndpointArgs),
}

#[derive(clap::Args, Debug)]
pub struct EndpointArgs {
    /// Path relative to the base address, e.g. /api/projects
    #[arg(value_name = "ENDPOINT")]
    pub endpoint: String,
}

#[derive(clap::Args, Debug)]
pub struct PayloadArgs {
    /// Path relative to the base address, e.g. /api/projects
    #[arg(value_name = "ENDPOINT")]
    pub endpoint: String,

    /// JSON request body
    #[arg(long, short = 'd', value_name = "JSON")]
    pub data: String,
}

impl Cli {
    fn probe(&self) -> Result<Probe> {
        let headers = self
            .headers
            .iter()
            .map(|raw| probe::parse_header(raw))
            .collect::<Result<Vec<_>>>()?;

        let probe = match &self.command {
            Commands::Get(args) => Probe::new(Method::GET, &args.endpoint),
            Commands::Delete(args) => Probe::new(Method::DELETE, &args.endpoint),
            Commands::Post(args) => Probe::new(Method::POST, &args.endpoint).with_data(parse_data(&args.data)?),
            Commands::Put(args) => Probe::new(Method::PUT, &args.endpoint).with_data(parse_data(&args.data)?),
        };

        Ok(probe.with_headers(headers))
    }

    /// `--base-url` and `PFMT_API_BASE_URL` both arrive here; blank means default.
    fn config(&self) -> ClientConfig {
        ClientConfig::from_base_url(self.base_url.as_deref())
    }
}

fn parse_data(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).context("--data must be valid JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let probe = cli.probe()?;
    let client = RequestClient::new(cli.config())?;
    let tracker = AsyncOperationTracker::new();

    match probe::execute(&client, &tracker, &probe).await {
        Outcome::Success(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Outcome::Failure(error) => {
            let cause = error
                .details
                .as_ref()
                .map(|d| format!(": {:#}", d))
                .unwrap_or_default();
            anyhow::bail!("{}{}", error, cause)
        }
    }
}
