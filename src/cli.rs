use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sportscloud", version, about = "Firstbeat Sports Cloud API client")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "API url (or set FIRSTBEAT_API_URL), default: https://api.firstbeat.com"
    )]
    pub api: Option<String>,
    #[arg(
        long,
        global = true,
        help = "Shared secret from registration (or set FIRSTBEAT_SHARED_SECRET)"
    )]
    pub shared_secret: Option<String>,
    #[arg(
        long,
        global = true,
        help = "Consumer ID from registration (or set FIRSTBEAT_CONSUMER_ID)"
    )]
    pub consumer_id: Option<String>,
    #[arg(
        long,
        global = true,
        help = "API key (or set FIRSTBEAT_API_KEY); retrieved automatically when absent"
    )]
    pub api_key: Option<String>,
    #[arg(long, global = true, default_value_t = 3, help = "Attempts per request, including the first")]
    pub max_attempts: u32,
    #[arg(long, global = true, default_value_t = 1000, help = "Delay before the first retry in milliseconds")]
    pub base_delay_ms: u64,
    #[arg(long, global = true, default_value_t = 30, help = "Per-request timeout in seconds")]
    pub timeout_secs: u64,
    #[arg(short, long, global = true, help = "Log request flow to stderr, on top of any RUST_LOG directives")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a bearer token for the Authorization header
    Token,
    /// Print the API key of this consumer
    ApiKey,
    /// List accounts the consumer can access
    Accounts,
    Coaches {
        account_id: String,
    },
    Teams {
        account_id: String,
    },
    Athletes {
        account_id: String,
    },
    Measurements {
        account_id: String,
        athlete_id: i64,
        #[arg(long, help = "Only print the N most recent measurements")]
        latest: Option<usize>,
    },
    /// Print analysis results of one measurement
    Results {
        account_id: String,
        athlete_id: i64,
        measurement_id: i64,
        #[arg(long = "var", help = "Result variable to fetch (repeatable)")]
        variables: Vec<String>,
    },
}
