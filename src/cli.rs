// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::core::{ConfigManager, FsOps, ServiceClient};
use crate::import::presenter::{
    render_confidence_summary, render_contact, render_import_result, render_processing_results,
};
use crate::import::validation::validate_csv_upload;
use crate::import::{
    generate_template, parse_csv, BatchImporter, ConfidenceSummary, ConfidenceTier,
    FieldMappingSet, ImportSession, TargetField, TEMPLATE_FILE_NAME,
};
use crate::utils::{format_size, parse_column_override};
use crate::web::start_web_server;
use crate::workspace::WorkspaceContext;

#[derive(Parser)]
#[command(name = "tapestry-import")]
#[command(about = "Import designer contacts into a Tapestry workspace")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP import gateway
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Write the CSV import template
    Template {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Show headers, the first rows and the suggested column mapping
    Preview { csv_file: PathBuf },
    /// Import designers from a CSV file
    ImportCsv {
        csv_file: PathBuf,
        #[arg(long)]
        workspace: String,
        /// Override a suggested mapping, e.g. --map "Job Title=title" or --map Notes=none
        #[arg(long = "map", value_parser = parse_column_override)]
        overrides: Vec<(String, Option<TargetField>)>,
    },
    /// Extract contacts from PDFs and import them
    ImportPdf {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        workspace: String,
        /// Discard contacts below this confidence tier (high, medium, low)
        #[arg(long)]
        min_confidence: Option<ConfidenceTier>,
        /// Extract and review only, submit nothing
        #[arg(long)]
        dry_run: bool,
    },
}

pub async fn handle_command(cli: Cli, mut config: ConfigManager) -> Result<()> {
    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.environment.port = port;
            }
            start_web_server(&config).await
        }
        Command::Template { out } => write_template(out).await,
        Command::Preview { csv_file } => preview(csv_file).await,
        Command::ImportCsv {
            csv_file,
            workspace,
            overrides,
        } => import_csv(&config, csv_file, &workspace, overrides).await,
        Command::ImportPdf {
            files,
            workspace,
            min_confidence,
            dry_run,
        } => import_pdf(&config, files, &workspace, min_confidence, dry_run).await,
    }
}

async fn write_template(out: PathBuf) -> Result<()> {
    let template = generate_template()?;
    let path = out.join(TEMPLATE_FILE_NAME);
    FsOps::write_file_safe(&path, &template).await?;
    println!("✓ Template written to {}", path.display());
    Ok(())
}

async fn preview(csv_file: PathBuf) -> Result<()> {
    let upload = FsOps::read_upload(&csv_file).await?;
    validate_csv_upload(&upload)?;

    let parsed = parse_csv(&String::from_utf8_lossy(&upload.bytes))
        .with_context(|| format!("Failed to parse {}", csv_file.display()))?;
    let mappings = FieldMappingSet::auto_map(&parsed.headers);

    println!(
        "{} ({}, {} row(s))",
        upload.name,
        format_size(upload.size()),
        parsed.row_count()
    );
    println!("Columns: {}", parsed.headers.join(", "));

    println!();
    for (index, row) in parsed.preview().iter().enumerate() {
        let values: Vec<&str> = row.values().collect();
        println!("  {:>2}. {}", index + 1, values.join(" | "));
    }
    if parsed.row_count() > parsed.preview().len() {
        println!("  ... {} more", parsed.row_count() - parsed.preview().len());
    }

    println!();
    print_mappings(&mappings);
    Ok(())
}

fn print_mappings(mappings: &FieldMappingSet) {
    println!("Suggested mapping:");
    for mapping in mappings.mappings() {
        match mapping.target_field {
            Some(field) => {
                let marker = if field.is_required() { "*" } else { "" };
                println!("  {} -> {}{}", mapping.source_column, field.label(), marker);
            }
            None => println!("  {} -> (not imported)", mapping.source_column),
        }
    }

    let missing = mappings.missing_required_fields();
    if missing.is_empty() {
        println!("✓ All required fields are mapped");
    } else {
        let labels: Vec<_> = missing.iter().map(|f| f.label()).collect();
        println!("✗ Missing required fields: {}", labels.join(", "));
    }
}

async fn import_csv(
    config: &ConfigManager,
    csv_file: PathBuf,
    workspace: &str,
    overrides: Vec<(String, Option<TargetField>)>,
) -> Result<()> {
    let workspace = WorkspaceContext::new(workspace)?;
    let upload = FsOps::read_upload(&csv_file).await?;
    validate_csv_upload(&upload)?;

    let parsed = parse_csv(&String::from_utf8_lossy(&upload.bytes))
        .with_context(|| format!("Failed to parse {}", csv_file.display()))?;
    let mut mappings = FieldMappingSet::auto_map(&parsed.headers);
    for (column, target) in overrides {
        if !parsed.headers.contains(&column) {
            warn!("Ignoring mapping for unknown column '{}'", column);
            continue;
        }
        mappings.set(&column, target);
    }
    print_mappings(&mappings);

    let client = ServiceClient::new(
        &config.service.api_base_url,
        config.service.timeout,
        workspace,
    )?;
    let result = BatchImporter::new(&client)
        .submit_csv(&upload, &mappings)
        .await?;

    print!("{}", render_import_result(&result));
    if result.invalidates_directory() {
        info!("Designer directory for {} has new entries", client.workspace());
    }
    Ok(())
}

async fn import_pdf(
    config: &ConfigManager,
    files: Vec<PathBuf>,
    workspace: &str,
    min_confidence: Option<ConfidenceTier>,
    dry_run: bool,
) -> Result<()> {
    let workspace = WorkspaceContext::new(workspace)?;
    let uploads = FsOps::read_uploads(&files).await?;

    let client = ServiceClient::new(
        &config.service.api_base_url,
        config.service.timeout,
        workspace,
    )?;
    let importer = BatchImporter::new(&client);

    let mut session = ImportSession::new();
    let outcome = importer
        .process_files(&uploads, |progress| {
            eprintln!(
                "[{:>3}%] {} ({}/{})",
                progress.percent(),
                progress.current_file,
                progress.completed,
                progress.total
            );
        })
        .await?;
    session.absorb(outcome);

    print!("{}", render_processing_results(session.results()));

    if let Some(tier) = min_confidence {
        let discarded = session.retain_min_tier(tier);
        if discarded > 0 {
            println!(
                "Discarded {} contact(s) below {} confidence",
                discarded,
                tier.label()
            );
        }
    }

    println!();
    for contact in session.contacts() {
        println!("  {}", render_contact(contact));
    }
    println!(
        "{}",
        render_confidence_summary(&ConfidenceSummary::from_contacts(session.contacts()))
    );

    if dry_run {
        println!("Dry run: nothing was imported");
        return Ok(());
    }
    if session.is_empty() {
        println!("No contacts to import");
        return Ok(());
    }

    let result = importer.submit_contacts(session.contacts()).await?;
    print!("{}", render_import_result(&result));
    if result.invalidates_directory() {
        info!("Designer directory for {} has new entries", client.workspace());
    }
    session.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_pdf_args() {
        let cli = Cli::try_parse_from([
            "tapestry-import",
            "import-pdf",
            "a.pdf",
            "b.pdf",
            "--workspace",
            "acme",
            "--min-confidence",
            "medium",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Command::ImportPdf {
                files,
                workspace,
                min_confidence,
                dry_run,
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(workspace, "acme");
                assert_eq!(min_confidence, Some(ConfidenceTier::Medium));
                assert!(dry_run);
            }
            _ => panic!("expected import-pdf"),
        }
    }

    #[test]
    fn test_parse_import_csv_overrides() {
        let cli = Cli::try_parse_from([
            "tapestry-import",
            "import-csv",
            "people.csv",
            "--workspace",
            "acme",
            "--map",
            "Job Title=title",
            "--map",
            "Notes=none",
        ])
        .unwrap();

        match cli.command {
            Command::ImportCsv { overrides, .. } => assert_eq!(
                overrides,
                vec![
                    ("Job Title".to_string(), Some(TargetField::Title)),
                    ("Notes".to_string(), None),
                ]
            ),
            _ => panic!("expected import-csv"),
        }
    }

    #[test]
    fn test_import_pdf_requires_files() {
        assert!(Cli::try_parse_from(["tapestry-import", "import-pdf", "--workspace", "acme"]).is_err());
    }

    #[tokio::test]
    async fn test_template_command_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path().to_path_buf()).await.unwrap();

        let written = tokio::fs::read_to_string(dir.path().join(TEMPLATE_FILE_NAME))
            .await
            .unwrap();
        assert!(written.starts_with("name,title,email,level"));
    }
}
