use anyhow::{bail, Context, Result};
use futures::future::join_all;
use serde_json::json;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tinycache_client::TinyCacheClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tinycache_example=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(arg) = std::env::args().nth(1) else {
        bail!("usage: tinycache-example <host:port>");
    };
    let addr = parse_server_addr(&arg)?;
    let client = TinyCacheClient::connect(&format!("http://{}", addr))?;

    tracing::info!("🧪 tinycache walkthrough");
    tracing::info!("   Server: {}", addr);
    println!();

    basic_operations(&client).await?;
    pattern_listing(&client).await?;
    expiration(&client).await?;
    parallel_set_get(&client).await?;

    println!();
    tracing::info!("✅ Done");

    Ok(())
}

/// Accepts `host:port` only; a scheme or path is rejected.
fn parse_server_addr(arg: &str) -> Result<String> {
    let Some((host, port)) = arg.rsplit_once(':') else {
        bail!("Expected host:port, got {:?}", arg);
    };
    if host.is_empty() || host.contains('/') {
        bail!("Expected host:port, got {:?}", arg);
    }
    port.parse::<u16>()
        .with_context(|| format!("Expected a numeric port in {:?}", arg))?;

    // Literal IPs are normalised; hostnames pass through as given
    Ok(match arg.parse::<SocketAddr>() {
        Ok(addr) => addr.to_string(),
        Err(_) => arg.to_string(),
    })
}

async fn basic_operations(client: &TinyCacheClient) -> Result<()> {
    tracing::info!("SET / GET / DEL");

    client.set("greeting", "hello world", Duration::ZERO).await?;
    client
        .set("user:1", &json!({"name": "alice", "roles": ["admin"]}), Duration::ZERO)
        .await?;

    let greeting: Option<String> = client.get_as("greeting").await?;
    tracing::info!("   GET greeting -> {:?}", greeting);

    let user = client.get("user:1").await?;
    tracing::info!("   GET user:1 -> {}", user.unwrap_or_default());

    let deleted = client.delete(&["greeting", "never-set"]).await?;
    tracing::info!("   DEL greeting never-set -> {}", deleted);

    let after = client.get("greeting").await?;
    tracing::info!("   GET greeting -> {:?}", after);

    Ok(())
}

async fn pattern_listing(client: &TinyCacheClient) -> Result<()> {
    tracing::info!("KEYS");

    for key in ["hello", "hallo", "hxllo", "hllo", "heeeello"] {
        client.set(key, key, Duration::ZERO).await?;
    }

    for pattern in ["h?llo", "h*llo", "h[ae]llo", "h[^e]llo", "h[a-b]llo"] {
        let mut keys = client.keys(pattern).await?;
        keys.sort();
        tracing::info!("   KEYS {:<10} -> {:?}", pattern, keys);
    }

    if let Err(e) = client.keys("h[a").await {
        tracing::info!("   KEYS h[a       -> rejected: {}", e);
    }

    Ok(())
}

async fn expiration(client: &TinyCacheClient) -> Result<()> {
    tracing::info!("TTL");

    client.set("short-lived", "soon gone", Duration::from_millis(500)).await?;
    tracing::info!("   GET short-lived -> {:?}", client.get("short-lived").await?);

    tokio::time::sleep(Duration::from_millis(700)).await;
    let value = client.get("short-lived").await?;
    tracing::info!("   GET short-lived after 700ms -> {:?}", value);

    if value.is_some() {
        bail!("short-lived key should have expired");
    }
    Ok(())
}

async fn parallel_set_get(client: &TinyCacheClient) -> Result<()> {
    let num_operations = 200;
    tracing::info!("Parallel SET/GET ({} keys)", num_operations);

    let start = Instant::now();
    join_all((0..num_operations).map(|i| async move {
        client
            .set(&format!("parallel:{}", i), &i, Duration::from_secs(60))
            .await
    }))
    .await
    .into_iter()
    .collect::<Result<Vec<_>, _>>()?;
    let set_elapsed = start.elapsed();

    let start = Instant::now();
    let values = join_all((0..num_operations).map(|i| async move {
        client.get_as::<i64>(&format!("parallel:{}", i)).await
    }))
    .await
    .into_iter()
    .collect::<Result<Vec<_>, _>>()?;
    let get_elapsed = start.elapsed();

    let mismatches = values
        .iter()
        .enumerate()
        .filter(|(i, value)| **value != Some(*i as i64))
        .count();

    let listed = client.keys("parallel:*").await?.len();
    let deleted = client
        .delete(&(0..num_operations).map(|i| format!("parallel:{}", i)).collect::<Vec<_>>())
        .await?;

    tracing::info!("   SET in {:?}, GET in {:?}", set_elapsed, get_elapsed);
    tracing::info!("   KEYS parallel:* -> {} key(s), DEL -> {}", listed, deleted);

    if mismatches > 0 {
        bail!("{} value(s) did not round-trip", mismatches);
    }
    Ok(())
}
