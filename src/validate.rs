//! Post-merge validation of the written output
//!
//! The output is always re-parsed. Kubernetes and Helm dry runs are opt-in
//! and shell out to `kubectl` and `helm`.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;

use thiserror::Error;
use tracing::{info, warn};

use crate::codec;
use crate::settings::ValidationSettings;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{} is not a well-formed document: {message}", .path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{check} validation failed for {}: {detail}", .path.display())]
    Failed {
        check: &'static str,
        path: PathBuf,
        detail: String,
    },
}

/// A validation step that ran and passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    WellFormed,
    Kubectl,
    Helm,
}

/// Runs external validators
#[derive(Debug, Clone)]
pub struct Validator {
    kubectl: String,
    helm: String,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            kubectl: "kubectl".to_string(),
            helm: "helm".to_string(),
        }
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use alternative executables for kubectl and helm
    pub fn with_programs(kubectl: impl Into<String>, helm: impl Into<String>) -> Self {
        Self {
            kubectl: kubectl.into(),
            helm: helm.into(),
        }
    }

    /// Run every enabled check against `output`, returning those that passed
    pub fn run(
        &self,
        settings: &ValidationSettings,
        output: &Path,
    ) -> Result<Vec<Check>, ValidationError> {
        let mut passed = Vec::new();

        check_well_formed(output)?;
        passed.push(Check::WellFormed);

        if settings.kubectl {
            self.kubectl_dry_run(output)?;
            passed.push(Check::Kubectl);
        }

        if settings.helm {
            match &settings.chart_path {
                Some(chart) => {
                    self.helm_dry_run(chart, output)?;
                    passed.push(Check::Helm);
                }
                None => warn!("helm validation requested without chart_path, skipping"),
            }
        }

        Ok(passed)
    }

    /// `kubectl apply --dry-run=client -f <output>`
    pub fn kubectl_dry_run(&self, output: &Path) -> Result<(), ValidationError> {
        let result = Command::new(&self.kubectl)
            .args(["apply", "--dry-run=client", "-f"])
            .arg(output)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ValidationError::Spawn {
                program: self.kubectl.clone(),
                source,
            })?;

        expect_success("kubectl", output, &result)?;
        info!(path = %output.display(), "kubernetes schema validation passed");
        Ok(())
    }

    /// `helm template <chart> --values <output>` piped into a kubectl dry run
    pub fn helm_dry_run(&self, chart: &Path, output: &Path) -> Result<(), ValidationError> {
        info!(chart = %chart.display(), "running helm template validation");

        let mut helm = Command::new(&self.helm)
            .arg("template")
            .arg(chart)
            .arg("--values")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ValidationError::Spawn {
                program: self.helm.clone(),
                source,
            })?;

        let rendered = match helm.stdout.take() {
            Some(stdout) => Stdio::from(stdout),
            None => Stdio::null(),
        };

        // Drain helm's stderr so a chatty helm cannot block on a full pipe
        let stderr = helm.stderr.take();
        let stderr_handle = thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_end(&mut buf);
            }
            buf
        });

        let kubectl = match Command::new(&self.kubectl)
            .args(["apply", "--dry-run=client", "-f", "-"])
            .stdin(rendered)
            .output()
        {
            Ok(output) => output,
            Err(source) => {
                let _ = helm.kill();
                let _ = helm.wait();
                return Err(ValidationError::Spawn {
                    program: self.kubectl.clone(),
                    source,
                });
            }
        };

        let status = helm.wait().map_err(|source| ValidationError::Spawn {
            program: self.helm.clone(),
            source,
        })?;
        let helm = Output {
            status,
            stdout: Vec::new(),
            stderr: stderr_handle.join().unwrap_or_default(),
        };

        expect_success("helm", output, &helm)?;
        expect_success("helm/kubectl", output, &kubectl)?;
        info!("helm/kubernetes manifest validation passed");
        Ok(())
    }
}

/// Re-parse a written document
pub fn check_well_formed(path: &Path) -> Result<(), ValidationError> {
    codec::load_tree(path).map_err(|e| ValidationError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    info!(path = %path.display(), "output is well-formed");
    Ok(())
}

fn expect_success(check: &'static str, path: &Path, output: &Output) -> Result<(), ValidationError> {
    if output.status.success() {
        return Ok(());
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = [stdout.trim(), stderr.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Err(ValidationError::Failed {
        check,
        path: path.to_path_buf(),
        detail: if detail.is_empty() {
            format!("exited with {}", output.status)
        } else {
            detail
        },
    })
}
