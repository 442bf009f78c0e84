//! `redirector validate` — check a redirect document for errors.
//!
//! Parses the document and runs the lint checks, reporting results in
//! either human-readable text or machine-readable JSON format.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::error::RedirectorError;
use crate::redirect::document::{parse_document, DocumentFormat};
use crate::redirect::validation;

pub fn execute(args: &ValidateArgs) -> Result<(), RedirectorError> {
    let path = &args.file;

    if !path.exists() {
        return Err(RedirectorError::SourceFileNotFound { path: path.clone() });
    }

    let payload = std::fs::read(path)?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let format = DocumentFormat::from_extension(ext)?;
    let entries = parse_document(format, &payload, &path.display().to_string())?;

    if let Err(errors) = validation::validate(&entries) {
        match args.format {
            ValidateFormat::Text => {
                eprintln!("\u{2717} {} has {} errors\n", path.display(), errors.len());
                for error in &errors {
                    eprintln!("{error}");
                }
            }
            ValidateFormat::Json => {
                let json_errors: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "entry": e.entry,
                            "field": e.field,
                            "message": e.message,
                            "suggestion": e.suggestion,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "errors": json_errors,
                    })
                );
            }
        }
        return Err(RedirectorError::Validation { errors });
    }

    match args.format {
        ValidateFormat::Text => {
            println!(
                "\u{2713} {}",
                validation::format_validation_report(&path.display().to_string(), &entries)
            );
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "redirects": entries.len(),
                })
            );
        }
    }

    Ok(())
}
