//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI 3.0 document for the study assistant REST API.
//! Usage: `openapi [output path]` (defaults to `openapi.json`).

use api_lib::web::rest::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let document = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&output, document)?;
    println!("OpenAPI document written to {}", output.display());
    Ok(())
}
