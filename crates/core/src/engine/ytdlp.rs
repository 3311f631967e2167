//! yt-dlp based engine implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use super::config::EngineConfig;
use super::error::EngineError;
use super::traits::ExtractionEngine;
use super::types::{MaterializeRequest, MaterializedOutput, StreamDescriptor};

/// Engine backed by the `yt-dlp` command line tool.
pub struct YtDlpEngine {
    config: EngineConfig,
}

impl YtDlpEngine {
    /// Creates a new engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Creates an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Builds yt-dlp arguments for listing streams.
    fn build_catalogue_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        // Everything after `--` is a URL, never an option
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Builds yt-dlp arguments for fetching one file.
    fn build_materialize_args(&self, request: &MaterializeRequest) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            request.directive.clone(),
            "--merge-output-format".to_string(),
            self.config.merge_output_format.clone(),
            "-o".to_string(),
            request.output_template.to_string_lossy().to_string(),
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            // --print implies --simulate unless told otherwise
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push("--".to_string());
        args.push(request.url.clone());
        args
    }

    /// Parses `--dump-single-json` output into stream descriptors.
    fn parse_catalogue(output: &str) -> Result<Vec<StreamDescriptor>, EngineError> {
        #[derive(Deserialize)]
        struct InfoOutput {
            #[serde(default)]
            formats: Vec<RawFormat>,
        }

        #[derive(Deserialize)]
        struct RawFormat {
            format_id: String,
            vcodec: Option<String>,
            acodec: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
            tbr: Option<f64>,
            abr: Option<f64>,
            vbr: Option<f64>,
            fps: Option<f64>,
        }

        let info: InfoOutput =
            serde_json::from_str(output).map_err(|e| EngineError::ParseError {
                reason: format!("Failed to parse yt-dlp output: {}", e),
            })?;

        let descriptors = info
            .formats
            .into_iter()
            .map(|f| {
                // An absent vcodec means "unknown", not "no video"
                let has_video = match f.vcodec.as_deref() {
                    Some("none") => false,
                    Some(_) => true,
                    None => f.height.is_some(),
                };
                let has_audio = matches!(f.acodec.as_deref(), Some(codec) if codec != "none");
                let fallback_bitrate = if has_video { f.vbr } else { f.abr };

                StreamDescriptor {
                    stream_id: f.format_id,
                    has_video,
                    has_audio,
                    width: f.width,
                    height: f.height,
                    bitrate: f.tbr,
                    fallback_bitrate,
                    frame_rate: f.fps,
                }
            })
            .collect();

        Ok(descriptors)
    }

    /// Extracts the final file path printed by `--print after_move:filepath`.
    fn parse_reported_path(stdout: &str) -> Option<PathBuf> {
        stdout
            .lines()
            .map(str::trim)
            .rev()
            .find(|line| !line.is_empty())
            .map(PathBuf::from)
    }

    /// Runs yt-dlp with a deadline, killing it when the deadline passes.
    async fn run(&self, args: &[String], timeout_secs: u64) -> Result<Output, EngineError> {
        let child = Command::new(&self.config.ytdlp_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EngineError::BinaryNotFound {
                        path: self.config.ytdlp_path.clone(),
                    }
                } else {
                    EngineError::Io(e)
                }
            })?;

        match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(EngineError::Timeout { timeout_secs }),
        }
    }

    fn stderr_text(output: &Output) -> Option<String> {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() {
            None
        } else {
            Some(stderr)
        }
    }
}

#[async_trait]
impl ExtractionEngine for YtDlpEngine {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn catalogue(&self, url: &str) -> Result<Vec<StreamDescriptor>, EngineError> {
        let args = self.build_catalogue_args(url);
        debug!(url = %url, "Listing streams");

        let output = self.run(&args, self.config.catalogue_timeout_secs).await?;
        if !output.status.success() {
            return Err(EngineError::catalogue_failed(
                format!("yt-dlp exited with code: {:?}", output.status.code()),
                Self::stderr_text(&output),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let descriptors = Self::parse_catalogue(&stdout)?;
        debug!(url = %url, streams = descriptors.len(), "Streams listed");
        Ok(descriptors)
    }

    async fn materialize(
        &self,
        request: MaterializeRequest,
    ) -> Result<MaterializedOutput, EngineError> {
        let start = Instant::now();

        if let Some(parent) = request.output_template.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args = self.build_materialize_args(&request);
        info!(url = %request.url, directive = %request.directive, "Starting yt-dlp download");

        let output = self.run(&args, self.config.download_timeout_secs).await?;
        if !output.status.success() {
            return Err(EngineError::materialize_failed(
                format!("yt-dlp exited with code: {:?}", output.status.code()),
                Self::stderr_text(&output),
            ));
        }

        let reported_path = Self::parse_reported_path(&String::from_utf8_lossy(&output.stdout));
        info!(
            url = %request.url,
            elapsed_ms = start.elapsed().as_millis() as u64,
            path = ?reported_path,
            "yt-dlp download finished"
        );

        Ok(MaterializedOutput { reported_path })
    }

    async fn validate(&self) -> Result<(), EngineError> {
        let result = Command::new(&self.config.ytdlp_path)
            .arg("--version")
            .output()
            .await;

        match result {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(EngineError::catalogue_failed(
                "yt-dlp --version failed",
                Self::stderr_text(&output),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EngineError::BinaryNotFound {
                    path: self.config.ytdlp_path.clone(),
                })
            }
            Err(e) => Err(EngineError::Io(e)),
        }
    }
}
