//! Ministry CLI
//!
//! Command-line client for a running Ministry API:
//! - Log in and inspect the session
//! - Browse prices and the Antiblat registry
//! - Propose, approve and reject price changes
//! - Check server status

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ministry-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the Ministry of Health staff portal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:3000", global = true)]
    pub url: String,

    /// Session token from `ministry-cli login`
    #[arg(long, env = "MINISTRY_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and print a session token
    Login {
        username: String,
        #[arg(short, long, env = "MINISTRY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the current session user
    Whoami,

    /// Show the price list
    Prices {
        /// Category id (basic, cards, additional)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List price change requests
    Requests,

    /// Propose new prices, given as SERVICE_ID=PRICE pairs
    Propose {
        #[arg(required = true)]
        changes: Vec<String>,
    },

    /// Approve a price change request
    Approve { request_id: u64 },

    /// Reject a price change request
    Reject {
        request_id: u64,
        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Show the Antiblat registry
    Antiblat {
        /// ls or lv (default: both)
        #[arg(long)]
        hospital: Option<String>,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

struct Client {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl Client {
    fn new(cli: &Cli) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: cli.url.trim_end_matches('/').to_string(),
            token: cli.token.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base, path));
        match &self.token {
            Some(token) => builder.header(reqwest::header::COOKIE, format!("auth_token={}", token)),
            None => builder,
        }
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        read_json(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}

/// Body of a successful response, or the server's error message
async fn read_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    if !status.is_success() {
        let message = body["error"].as_str().unwrap_or("unknown error");
        bail!("{} ({})", message, status);
    }
    Ok(body)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new(&cli);

    match &cli.command {
        Commands::Login { username, password } => {
            let user = client
                .post(
                    "/api/auth",
                    &json!({"username": username, "password": password}),
                )
                .await
                .context("Login failed")?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!(
                    "Logged in as {} ({})",
                    user["username"].as_str().unwrap_or("-"),
                    user["role"].as_str().unwrap_or("-")
                );
                println!();
                println!("export MINISTRY_TOKEN={}", user["token"].as_str().unwrap_or(""));
            }
        }

        Commands::Whoami => {
            require_token(&cli)?;
            let user = client.get("/api/auth").await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("ID:       {}", user["id"]);
                println!("Username: {}", user["username"].as_str().unwrap_or("-"));
                println!("Role:     {}", user["role"].as_str().unwrap_or("-"));
                if let Some(hospital) = user["hospital"].as_str() {
                    println!("Hospital: {}", hospital);
                }
                if let Some(assigned) = user["assignedHospital"].as_str() {
                    println!("Assigned: {}", assigned);
                }
            }
        }

        Commands::Prices { category } => {
            let path = match category {
                Some(category) => format!("/api/prices?category={}", category),
                None => "/api/prices".to_string(),
            };
            let data = client.get(&path).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else if data.is_array() {
                for category in data.as_array().into_iter().flatten() {
                    println!("{}", category["name"].as_str().unwrap_or("-"));
                    print_services(&category["services"]);
                    println!();
                }
            } else {
                print_services(&data["services"]);
            }
        }

        Commands::Requests => {
            let data = client.get("/api/prices?requests=true").await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&data)?);
                return Ok(());
            }

            let requests = data.as_array().cloned().unwrap_or_default();
            if requests.is_empty() {
                println!("No price change requests.");
                return Ok(());
            }

            println!(
                "{:<5} {:<40} {:>12} {:>12} {:<10} {}",
                "ID", "Service", "Old", "New", "Status", "Requested by"
            );
            println!("{}", "-".repeat(100));
            for request in requests {
                println!(
                    "{:<5} {:<40} {:>12} {:>12} {:<10} {}",
                    request["id"],
                    truncate(request["serviceName"].as_str().unwrap_or("-"), 40),
                    request["oldPrice"],
                    request["newPrice"],
                    request["status"].as_str().unwrap_or("-"),
                    request["requestedByName"].as_str().unwrap_or("-")
                );
            }
        }

        Commands::Propose { changes } => {
            require_token(&cli)?;
            let changes = parse_changes(changes)?;
            let created = client
                .post("/api/prices", &json!({"type": "request", "changes": changes}))
                .await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&created)?);
            } else {
                for request in created.as_array().into_iter().flatten() {
                    println!(
                        "Request #{}: {} {} -> {}",
                        request["id"],
                        request["serviceName"].as_str().unwrap_or("-"),
                        request["oldPrice"],
                        request["newPrice"]
                    );
                }
            }
        }

        Commands::Approve { request_id } => {
            require_token(&cli)?;
            let reviewed = client
                .post(
                    "/api/prices",
                    &json!({"type": "approve", "requestId": request_id}),
                )
                .await?;
            println!(
                "Request #{} approved: {} now costs {}",
                request_id,
                reviewed["serviceName"].as_str().unwrap_or("-"),
                reviewed["newPrice"]
            );
        }

        Commands::Reject { request_id, reason } => {
            require_token(&cli)?;
            let reviewed = client
                .post(
                    "/api/prices",
                    &json!({"type": "reject", "requestId": request_id, "reason": reason}),
                )
                .await?;
            println!(
                "Request #{} rejected: {}",
                request_id,
                reviewed["rejectionReason"].as_str().unwrap_or("-")
            );
        }

        Commands::Antiblat { hospital } => {
            let path = match hospital {
                Some(hospital) => format!("/api/antiblat?hospital={}", hospital),
                None => "/api/antiblat".to_string(),
            };
            let data = client.get(&path).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else if data.is_array() {
                print_antiblat(&data);
            } else {
                for key in ["ls", "lv"] {
                    println!("[{}]", key);
                    print_antiblat(&data[key]);
                    println!();
                }
            }
        }

        Commands::Status => {
            let health = match client.get("/health").await {
                Ok(health) => health,
                Err(e) => {
                    eprintln!("Cannot reach Ministry API at {}", client.base);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the server is running:");
                    eprintln!("  cargo run --bin ministry");
                    std::process::exit(1);
                }
            };

            println!(
                "Ministry v{}",
                health["version"].as_str().unwrap_or(env!("CARGO_PKG_VERSION"))
            );
            println!();
            println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
            println!("Accounts: {}", health["accounts"]);
            println!("Pending price requests: {}", health["pending_price_requests"]);
            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!("Uptime: {}", format_duration(uptime));
            }
        }

        Commands::Config { output } => {
            let config = ministry::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn require_token(cli: &Cli) -> Result<()> {
    if cli.token.is_none() {
        bail!("Not logged in: run `ministry-cli login` and export MINISTRY_TOKEN");
    }
    Ok(())
}

/// Parse `ID=PRICE` pairs into the request's `changes` map
fn parse_changes(pairs: &[String]) -> Result<BTreeMap<String, i64>> {
    pairs
        .iter()
        .map(|pair| {
            let (id, price) = pair
                .split_once('=')
                .with_context(|| format!("Expected SERVICE_ID=PRICE, got {:?}", pair))?;
            let id: u64 = id
                .trim()
                .parse()
                .with_context(|| format!("Invalid service id: {:?}", id))?;
            let price: i64 = price
                .trim()
                .parse()
                .with_context(|| format!("Invalid price: {:?}", price))?;
            Ok((id.to_string(), price))
        })
        .collect()
}

fn print_services(services: &Value) {
    for service in services.as_array().into_iter().flatten() {
        println!(
            "  {:>3}  {:<60} {:>10}",
            service["id"],
            truncate(service["name"].as_str().unwrap_or("-"), 60),
            service["price"]
        );
    }
}

fn print_antiblat(entries: &Value) {
    let entries = entries.as_array().cloned().unwrap_or_default();
    if entries.is_empty() {
        println!("  (empty)");
        return;
    }
    for entry in entries {
        println!(
            "  {:>3}  {:<24} rank {:<2} {:<8} {}",
            entry["id"],
            entry["nickname"].as_str().unwrap_or("-"),
            entry["rank"],
            entry["reason"].as_str().unwrap_or("-"),
            entry["createdAt"].as_str().unwrap_or("-")
        );
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_changes() {
        let changes =
            parse_changes(&["1=65000".to_string(), " 10 = 410000".to_string()]).unwrap();
        assert_eq!(changes.get("1"), Some(&65000));
        assert_eq!(changes.get("10"), Some(&410000));

        assert!(parse_changes(&["1:65000".to_string()]).is_err());
        assert!(parse_changes(&["x=1".to_string()]).is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Лечение", 10), "Лечение");
        assert_eq!(truncate("Медицинская карта", 6), "Медиц…");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(3_700), "1h 1m");
        assert_eq!(format_duration(90_000), "1d 1h");
    }
}
