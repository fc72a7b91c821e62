//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the library's JSON endpoints to disk.
//!
//! Usage: `openapi [OUTPUT]` (defaults to `openapi.json`).

use api_lib::web::rest::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn write_document(output: &PathBuf) -> Result<usize, Box<dyn std::error::Error>> {
    let json = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(output, &json)?;
    Ok(ApiDoc::openapi().paths.paths.len())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let paths = write_document(&output)?;
    println!("✅ Wrote {} API paths to {}", paths, output.display());
    Ok(())
}
