use clap::Parser;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;
use zip2pdf::{
    Cli, Config, DirectoryScanner, FailureKind, OutputFormatter, OutputMode, PdfRenderer,
    RunOutcome, RunPaths, RunReport, UserFriendlyError, WkhtmltopdfRenderer, Zip2Pdf, Zip2PdfError,
};

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(&cli);

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let zip2pdf = match Zip2Pdf::from_cli(&cli) {
        Ok(zip2pdf) => zip2pdf,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    let paths = match Cli::resolve_paths(zip2pdf.config()) {
        Ok(paths) => paths,
        Err(e) => {
            zip2pdf.handle_error(&e);
            return 1;
        }
    };

    if cli.dry_run {
        return handle_dry_run(zip2pdf.config(), &paths, zip2pdf.output_formatter());
    }

    match zip2pdf.convert(&paths).await {
        Ok(report) => {
            zip2pdf.output_formatter().print_run_summary(&report);

            if let Some(ref report_path) = cli.report {
                let saved = match report_path.extension().and_then(|e| e.to_str()) {
                    Some("txt") => report.save_text(report_path),
                    _ => report.save_json(report_path),
                };
                if let Err(e) = saved {
                    zip2pdf.handle_error(&e);
                    return 1;
                }
            }

            report_exit_code(&report)
        }
        Err(e) => {
            zip2pdf.handle_error(&e);
            error_exit_code(&e)
        }
    }
}

fn setup_logging(cli: &Cli) {
    let filter = if cli.quiet {
        "zip2pdf=error"
    } else {
        match cli.verbose {
            0 => "zip2pdf=warn",
            1 => "zip2pdf=info",
            _ => "zip2pdf=debug",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();
}

fn report_exit_code(report: &RunReport) -> i32 {
    match report.outcome {
        RunOutcome::Completed if report.has_item_errors() => 2, // Completed with item errors
        RunOutcome::Completed => 0,
        RunOutcome::Failed { kind, .. } => match kind {
            FailureKind::InvalidPath => 3,
            FailureKind::Cancelled => 130, // Interrupted (SIGINT)
            FailureKind::Other => 1,
        },
    }
}

fn error_exit_code(error: &Zip2PdfError) -> i32 {
    match error {
        Zip2PdfError::Cancelled => 130,
        Zip2PdfError::InvalidPath { .. } => 3,
        Zip2PdfError::RendererNotConfigured | Zip2PdfError::RendererNotFound { .. } => 4,
        _ => 1, // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "zip2pdf.toml".to_string());

    match Zip2Pdf::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  zip2pdf --config {}", config_path);
            println!("\nEdit the file to point renderer.binary at your wkhtmltopdf install.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(config: &Config, paths: &RunPaths, formatter: &OutputFormatter) -> i32 {
    formatter.info("DRY RUN MODE - No files will be extracted, converted or renamed");
    formatter.print_separator();

    let archives = match DirectoryScanner::list_entries(&paths.source) {
        Ok(listing) => listing,
        Err(e) => {
            formatter.print_user_friendly_error(&e);
            return error_exit_code(&e);
        }
    };
    formatter.success(&format!(
        "Source directory {} holds {} entries",
        paths.source.display(),
        archives.len()
    ));

    let renderer = WkhtmltopdfRenderer::from_config(&config.renderer);
    if let Err(e) = renderer.check() {
        formatter.print_user_friendly_error(&e);
        return error_exit_code(&e);
    }
    formatter.success(&format!(
        "Renderer found: {}",
        renderer
            .binary()
            .map(|b| b.display().to_string())
            .unwrap_or_default()
    ));

    formatter.info("Configuration that would be used:");
    println!("  HTML directory: {}", paths.html.display());
    println!("  PDF directory: {}", paths.pdf.display());
    println!("  Member suffix: {}", config.extraction.member_suffix);
    println!("  Renderer arguments: {}", config.renderer.extra_args.join(" "));
    match config.renderer_timeout() {
        Some(timeout) => println!("  Renderer timeout: {} seconds", timeout.as_secs()),
        None => println!("  Renderer timeout: none"),
    }
    println!("  Party table id: {}", config.naming.table_id);
    println!(
        "  Name window: characters {}..{}, {} tokens",
        config.naming.window_offset,
        config.naming.window_offset + config.naming.window_length,
        config.naming.token_count
    );

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform the conversion");

    0
}

fn print_startup_error(error: &Zip2PdfError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
