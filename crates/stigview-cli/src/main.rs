//! stigview CLI - STIG checklist conversion, POAM export and version diffing
//!
//! Reads XCCDF benchmarks and CKL checklists, writes CKL checklists and
//! POAM reports, and compares two releases of a STIG. Defaults for asset
//! identity, POAM scope and the CCI table come from stigview.toml.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod config;
mod error;
mod logging;
mod output;

use config::{AssetArgs, PoamFormat, StigviewConfig};
use error::{CliError, Result};
use logging::LogFormat;
use stigview::{RuleFilter, Severity, Status};

/// stigview - DISA STIG checklist tool
#[derive(Parser)]
#[command(name = "stigview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to stigview.toml configuration file
    #[arg(short, long, default_value = "stigview.toml", global = true)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (overrides LOG_FORMAT)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show review progress of an XCCDF or CKL file
    Summary {
        /// Checklist file (.ckl) or XCCDF benchmark (.xml)
        file: PathBuf,

        /// Only list rules of this severity: high, medium, low or "CAT I".."CAT III"
        #[arg(long, value_parser = parse_severity)]
        severity: Option<Severity>,

        /// Only list rules with this status: not_reviewed, not_a_finding, open, not_applicable
        #[arg(long, value_parser = parse_status)]
        status: Option<Status>,

        /// Only list rules containing this text
        #[arg(long)]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert an XCCDF or CKL file to a CKL checklist
    ExportCkl {
        /// Checklist file (.ckl) or XCCDF benchmark (.xml)
        file: PathBuf,

        /// Output file (default: derived from the STIG title)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        asset: AssetArgs,
    },

    /// Export a Plan of Action and Milestones
    Poam {
        /// Checklist file (.ckl) or XCCDF benchmark (.xml)
        file: PathBuf,

        /// Output format (default from config, else csv)
        #[arg(short, long, value_enum)]
        format: Option<PoamFormat>,

        /// Also list findings that have not been reviewed
        #[arg(long)]
        include_non_reviewed: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        asset: AssetArgs,
    },

    /// Compare two versions of a STIG
    Diff {
        /// Baseline (older) file
        a: PathBuf,

        /// Comparison (newer) file
        b: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert every STIG in a DISA library bundle to JSON
    Library {
        /// Library bundle ZIP
        bundle: PathBuf,

        /// Output directory for <id>.json files
        #[arg(short, long, default_value = "stigs")]
        output: PathBuf,
    },

    /// Look up the SP 800-53 controls for CCI identifiers
    Cci {
        /// CCI identifiers, e.g. CCI-000366
        #[arg(required = true)]
        ids: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let format = cli.log_format.unwrap_or_else(LogFormat::from_env);
    if let Err(e) = logging::init(format, cli.verbose) {
        output::error(&e.to_string());
        return ExitCode::FAILURE;
    }

    let result = StigviewConfig::load(&cli.config).and_then(|config| run(cli.command, &config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &StigviewConfig) -> Result<()> {
    match command {
        Commands::Summary {
            file,
            severity,
            status,
            search,
            json,
        } => {
            let filter = RuleFilter {
                severity,
                status,
                search,
            };
            cmd_summary(&file, &filter, json)
        }

        Commands::ExportCkl {
            file,
            output,
            asset,
        } => cmd_export_ckl(config, &file, output, &asset),

        Commands::Poam {
            file,
            format,
            include_non_reviewed,
            output,
            asset,
        } => cmd_poam(config, &file, format, include_non_reviewed, output, &asset),

        Commands::Diff { a, b, json } => cmd_diff(&a, &b, json),

        Commands::Library { bundle, output } => cmd_library(&bundle, &output),

        Commands::Cci { ids, json } => cmd_cci(config, &ids, json),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_summary(file: &Path, filter: &RuleFilter, json: bool) -> Result<()> {
    let stig = stigview::load_checklist(file)?;
    let stats = stigview::ChecklistStats::from_stig(&stig);
    let filtering = *filter != RuleFilter::default();

    if json {
        let mut report = serde_json::json!({
            "title": stig.title,
            "version": stig.version,
            "releaseInfo": stig.release_info,
            "stats": stats,
        });
        if filtering {
            report["rules"] = serde_json::to_value(filter.apply(&stig))?;
        }
        output::print_json(&report)?;
        return Ok(());
    }

    output::print_stats(&stig.title, &stats);
    if !stig.release_info.is_empty() {
        println!("{}", stig.release_info);
    }
    if filtering {
        output::print_rules(&filter.apply(&stig));
    }

    Ok(())
}

fn cmd_export_ckl(
    config: &StigviewConfig,
    file: &Path,
    output: Option<PathBuf>,
    asset: &AssetArgs,
) -> Result<()> {
    let stig = stigview::load_checklist(file)?;
    let asset = asset.resolve(&config.asset);
    let path = output.unwrap_or_else(|| PathBuf::from(stigview::ckl_file_name(&stig)));

    let xml = stigview::export_ckl(&stig, &asset);
    std::fs::write(&path, xml).map_err(|e| CliError::write(&path, e))?;

    output::success(&format!(
        "Wrote {} rules to {}",
        stig.rules.len(),
        path.display()
    ));
    Ok(())
}

fn cmd_poam(
    config: &StigviewConfig,
    file: &Path,
    format: Option<PoamFormat>,
    include_non_reviewed: bool,
    output: Option<PathBuf>,
    asset: &AssetArgs,
) -> Result<()> {
    let stig = stigview::load_checklist(file)?;
    let asset = asset.resolve(&config.asset);
    let cci_map = config.cci_map()?;
    let include_non_reviewed = include_non_reviewed || config.poam.include_non_reviewed;
    let format = format.unwrap_or(config.poam.format);

    let content = match format {
        PoamFormat::Csv => {
            stigview::export_poam_csv(&stig, &asset, &cci_map, include_non_reviewed)
        }
        PoamFormat::Json => serde_json::to_string_pretty(&stigview::export_poam_json(
            &stig,
            &asset,
            &cci_map,
            include_non_reviewed,
        ))?,
    };

    match output {
        Some(path) => {
            std::fs::write(&path, content).map_err(|e| CliError::write(&path, e))?;
            output::success(&format!("Wrote POAM to {}", path.display()));
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn cmd_diff(a: &Path, b: &Path, json: bool) -> Result<()> {
    let stig_a = stigview::load_checklist(a)?;
    let stig_b = stigview::load_checklist(b)?;
    let diff = stigview::diff_stigs(&stig_a, &stig_b);

    if json {
        output::print_json(&diff)?;
    } else {
        output::header(&format!("{} → {}", a.display(), b.display()));
        output::print_diff(&diff);
    }
    Ok(())
}

fn cmd_library(bundle: &Path, output_dir: &Path) -> Result<()> {
    let bytes = std::fs::read(bundle).map_err(|e| CliError::BundleRead {
        path: bundle.to_path_buf(),
        source: e,
    })?;

    output::info(&format!("Processing {}...", bundle.display()));
    let (entries, failures) = stigview::extract_all_from_library(&bytes);

    std::fs::create_dir_all(output_dir).map_err(|e| CliError::OutputDirCreation {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    for entry in &entries {
        let path = output_dir.join(format!("{}.json", entry.id));
        std::fs::write(&path, entry.stig.to_json()?).map_err(|e| CliError::write(&path, e))?;
        tracing::debug!(id = %entry.id, category = entry.category, "Wrote library entry");
    }

    output::success(&format!(
        "Converted {} STIGs into {}",
        entries.len(),
        output_dir.display()
    ));

    if failures.is_empty() {
        Ok(())
    } else {
        output::print_failures(&failures);
        Err(CliError::BundleFailures {
            count: failures.len(),
        })
    }
}

fn cmd_cci(config: &StigviewConfig, ids: &[String], json: bool) -> Result<()> {
    let map = config.cci_map()?;

    if json {
        let mut found = serde_json::Map::new();
        for id in ids {
            let value = match map.get(id) {
                Some(mapping) => serde_json::to_value(mapping)?,
                None => serde_json::Value::Null,
            };
            found.insert(id.clone(), value);
        }
        output::print_json(&found)?;
        return Ok(());
    }

    for id in ids {
        match map.get(id) {
            Some(mapping) => println!("{}  {}  {}", id, mapping.control, mapping.title),
            None => output::warning(&format!("{}  unmapped", id)),
        }
    }
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_severity(value: &str) -> std::result::Result<Severity, String> {
    let lowered = value.to_ascii_lowercase();
    let severity = match lowered.as_str() {
        "high" | "cat1" | "cat i" | "i" => Severity::CatI,
        "medium" | "cat2" | "cat ii" | "ii" => Severity::CatII,
        "low" | "cat3" | "cat iii" | "iii" => Severity::CatIII,
        _ => return Err(format!("unknown severity: {}", value)),
    };
    Ok(severity)
}

fn parse_status(value: &str) -> std::result::Result<Status, String> {
    Status::ALL
        .into_iter()
        .find(|s| s.as_str() == value || s.as_ckl() == value)
        .ok_or_else(|| format!("unknown status: {}", value))
}
