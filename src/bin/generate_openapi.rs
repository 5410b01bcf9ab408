use anyhow::Context;
use solana_dashboard_proxy::ApiDoc;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let output_path = std::env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());

    let openapi_spec = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize OpenAPI spec")?;
    std::fs::write(&output_path, openapi_spec)
        .with_context(|| format!("Failed to write OpenAPI spec to {}", output_path))?;

    println!("OpenAPI spec written to {}", output_path);
    Ok(())
}
