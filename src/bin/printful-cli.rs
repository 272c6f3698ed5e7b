use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use printful_proxy::payloads::{
    design_upload, multi_item_order, simple_order, webhook_subscription, OrderSpec,
};
use printful_proxy::upstream::UpstreamCall;

#[derive(Parser)]
#[command(name = "printful-cli")]
#[command(about = "Command line client for the Printful API proxy", long_about = None)]
struct Cli {
    /// Base URL of a running gateway
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Gateway health
    Health,
    /// Gateway description and endpoint list
    Info,
    /// List catalog products
    Products {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// List orders
    Orders {
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Create an order from a JSON file holding `customer` and `products`
    CreateOrder {
        file: PathBuf,
        /// Submit for fulfillment instead of leaving a draft
        #[arg(long)]
        confirm: bool,
    },
    /// Add a design to the file library
    UploadDesign {
        url: String,
        #[arg(long)]
        filename: Option<String>,
    },
    /// Subscribe a URL to webhook events
    Webhook {
        url: String,
        #[arg(required = true)]
        types: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let api = format!("{}/api", cli.url.trim_end_matches('/'));

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{api}/health")).send().await?;
            print_response(res).await?;
        }
        Commands::Info => {
            let res = client.get(&api).send().await?;
            print_response(res).await?;
        }
        Commands::Products { limit, offset } => {
            let mut query = Vec::new();
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            if let Some(offset) = offset {
                query.push(("offset", offset.to_string()));
            }
            let res = client
                .get(format!("{api}/products"))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Orders { status, limit } => {
            let mut query = vec![("limit", limit.to_string())];
            if let Some(status) = status {
                query.push(("status", status));
            }
            let res = client
                .get(format!("{api}/orders"))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::CreateOrder { file, confirm } => {
            let spec: OrderSpec = serde_json::from_str(&tokio::fs::read_to_string(&file).await?)?;
            let order = match spec.products.as_slice() {
                [single] => simple_order(&spec.customer, single, single.quantity)?,
                products => multi_item_order(&spec.customer, products)?,
            };
            send(&client, &api, order.to_call(confirm)?).await?;
        }
        Commands::UploadDesign { url, filename } => {
            send(&client, &api, design_upload(url, filename).to_call()?).await?;
        }
        Commands::Webhook { url, types } => {
            send(&client, &api, webhook_subscription(url, types)?.to_call()?).await?;
        }
    }

    Ok(())
}

/// Gateway paths mirror upstream paths under `/api`.
async fn send(
    client: &reqwest::Client,
    api: &str,
    call: UpstreamCall,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut request = client
        .request(call.method.clone(), format!("{api}{}", call.path))
        .header(CONTENT_TYPE, "application/json");
    if let Some(body) = call.body {
        request = request.body(body);
    }
    print_response(request.send().await?).await
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
