//! ymerge CLI
//!
//! Entry point for the `ymerge` command-line tool.

use clap::Parser;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use ymerge::build_info;
use ymerge::pipeline::{self, error_line, summary_line, PipelineError};
use ymerge::settings::{set_path, EffectiveSettings};

#[derive(Parser)]
#[command(name = "ymerge")]
#[command(about = "Merge two YAML files with configurable strategies", version)]
struct Cli {
    /// Path to settings file (default: config.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Strategy for merging lists
    #[arg(long, value_parser = ["replace", "append", "intelligent"])]
    list_merge_strategy: Option<String>,

    /// How to handle keys present only in v2
    #[arg(long, value_parser = ["ignore", "remove"])]
    handle_deletions: Option<String>,

    /// Path to source YAML file (v1)
    #[arg(long, value_name = "PATH")]
    file_v1_path: Option<PathBuf>,

    /// Path to base YAML file (v2)
    #[arg(long, value_name = "PATH")]
    file_v2_path: Option<PathBuf>,

    /// Path for merged output file
    #[arg(long, value_name = "PATH")]
    output_final_path: Option<PathBuf>,

    /// Path for difference report
    #[arg(long, value_name = "PATH")]
    diff_report_path: Option<PathBuf>,

    /// Include unchanged keys in difference report
    #[arg(long)]
    show_unchanged_keys: bool,

    /// Format for difference report
    #[arg(long, value_parser = ["text", "json"])]
    diff_format: Option<String>,

    /// Dry-run the output with kubectl
    #[arg(long)]
    validate_kubectl: bool,

    /// Render the chart with the output as values and dry-run it with kubectl
    #[arg(long)]
    validate_helm: bool,

    /// Helm chart used by --validate-helm
    #[arg(long, value_name = "PATH")]
    chart_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Show detailed version and build information
    #[arg(long)]
    verbose_version: bool,
}

impl Cli {
    /// Settings layer holding only the flags that were given
    fn overrides(&self) -> Value {
        let mut overrides = json!({});

        let strings = [
            ("general_settings.list_merge_strategy", &self.list_merge_strategy),
            ("general_settings.handle_deletions", &self.handle_deletions),
            ("diff_report_settings.diff_format", &self.diff_format),
        ];
        for (path, value) in strings {
            if let Some(value) = value {
                set_path(&mut overrides, path, json!(value));
            }
        }

        let paths = [
            ("input_output.file_v1_path", &self.file_v1_path),
            ("input_output.file_v2_path", &self.file_v2_path),
            ("input_output.output_final_path", &self.output_final_path),
            ("input_output.diff_report_path", &self.diff_report_path),
            ("validation.chart_path", &self.chart_path),
        ];
        for (path, value) in paths {
            if let Some(value) = value {
                set_path(&mut overrides, path, path_value(value));
            }
        }

        let flags = [
            ("diff_report_settings.show_unchanged_keys", self.show_unchanged_keys),
            ("validation.kubectl", self.validate_kubectl),
            ("validation.helm", self.validate_helm),
        ];
        for (path, set) in flags {
            if set {
                set_path(&mut overrides, path, Value::Bool(true));
            }
        }

        overrides
    }
}

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().to_string())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose_version {
        print!("{}", build_info::verbose_version());
        process::exit(0);
    }

    init_tracing(cli.verbose);

    let effective = match EffectiveSettings::build(cli.config.as_deref(), Some(cli.overrides())) {
        Ok(effective) => effective,
        Err(e) => fail(PipelineError::from(e)),
    };
    if let Ok(json) = effective.to_json() {
        debug!(settings = %json, "effective settings");
    }

    match pipeline::run(&effective.settings) {
        Ok(outcome) => {
            println!("YAML merge completed successfully!");
            println!("{}", summary_line(&outcome.summary));
            process::exit(0);
        }
        Err(e) => fail(e),
    }
}

fn fail(err: PipelineError) -> ! {
    debug!(category = err.category(), exit_code = err.exit_code().as_i32(), "run failed");
    eprintln!("{}", error_line(&err));
    process::exit(err.exit_code().as_i32());
}
