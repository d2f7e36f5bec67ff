use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the WorldMap Gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// Assemble a new map configuration, optionally around layers
    NewMap {
        /// Layer typename to include; repeat for several layers
        #[arg(short, long)]
        layer: Vec<String>,
    },
    /// Fetch the viewer configuration of a saved map
    Map { id: i64 },
    /// Relay a request through the forwarding proxy
    Proxy { target: String },
    /// Register a remote service endpoint
    AddEndpoint {
        endpoint: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/status", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::NewMap { layer } => {
            let params: Vec<(&str, &str)> =
                layer.iter().map(|name| ("layer", name.as_str())).collect();
            let res = client
                .get(format!("{}/maps/new", cli.url))
                .query(&params)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Map { id } => {
            let res = client
                .get(format!("{}/maps/{}", cli.url, id))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Proxy { target } => {
            let res = client
                .get(format!("{}/proxy/", cli.url))
                .query(&[("url", target.as_str())])
                .send()
                .await?;
            println!("Status: {}", res.status());
            println!("{}", res.text().await?);
        }
        Commands::AddEndpoint {
            endpoint,
            description,
        } => {
            let res = client
                .post(format!("{}/endpoints", cli.url))
                .json(&json!({ "url": endpoint, "description": description }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
