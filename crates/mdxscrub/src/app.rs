use anyhow::{anyhow, Result};
use std::path::PathBuf;

use mdxcore::document;
use mdxcore::{Blocklist, Classifier, Finding, SanitizeOptions, SanitizeReport, Sanitizer, SyntaxNode};

use crate::cli::CliArgs;
use crate::config::Config;
use crate::file_manager::FileManager;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sanitized(SanitizeReport),
    Checked(Option<Finding>),
    ConfigWritten(PathBuf),
}

impl Outcome {
    /// Process exit code: 1 when `--check` flagged the expression.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Checked(Some(_)) => 1,
            _ => 0,
        }
    }
}

pub struct App {
    pub config: Config,
    pub file_manager: FileManager,
    blocklist: Blocklist,
}

impl App {
    pub async fn new() -> Result<Self> {
        let config = Config::load().await?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        let blocklist = config.blocklist.build();
        if !config.blocklist.is_empty() {
            log::info!("Blocklist extended to {} names", blocklist.len());
        }
        Self {
            config,
            file_manager: FileManager::new(),
            blocklist,
        }
    }

    /// Effective options: configuration first, then command-line flags.
    pub fn options(&self, args: &CliArgs) -> SanitizeOptions {
        let mut options = self.config.options;
        args.apply(&mut options);
        options
    }

    pub async fn run(&mut self, args: &CliArgs) -> Result<Outcome> {
        if args.init_config {
            let path = self.config.save().await?;
            return Ok(Outcome::ConfigWritten(path));
        }

        let input = self.file_manager.read_input(args.input_path()).await?;

        if args.check {
            let finding = self.check_json(&input)?;
            let verdict = match &finding {
                Some(finding) => format!("dangerous: {}", finding),
                None => "safe".to_string(),
            };
            self.file_manager
                .write_output(args.output.as_deref(), &verdict)
                .await?;
            return Ok(Outcome::Checked(finding));
        }

        let (output, report) = self.sanitize_json(&input, args)?;
        log::info!(
            "{}: removed {} expressions, {} attributes, {} emptied parents",
            self.file_manager.input_name(),
            report.expressions_removed,
            report.attributes_removed,
            report.parents_pruned
        );
        if report.kept_without_analysis > 0 {
            log::warn!(
                "{} expressions were kept without a syntax tree",
                report.kept_without_analysis
            );
        }

        self.file_manager
            .write_output(args.output.as_deref(), &output)
            .await?;
        Ok(Outcome::Sanitized(report))
    }

    /// Sanitizes a JSON document tree and renders the result.
    pub fn sanitize_json(&self, json: &str, args: &CliArgs) -> Result<(String, SanitizeReport)> {
        let mut tree = document::from_json_str(json)?;
        let sanitizer = Sanitizer::new(&self.blocklist, self.options(args));
        let report = sanitizer.sanitize(&mut tree);

        let output = if args.outline {
            tree.outline()
        } else {
            document::to_json_string(&tree, self.config.output.pretty && !args.compact)?
        };
        Ok((output, report))
    }

    /// Classifies one ESTree program given as JSON.
    pub fn check_json(&self, json: &str) -> Result<Option<Finding>> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| anyhow!("failed to decode syntax tree: {}", e))?;
        let tree = SyntaxNode::from_json(&value)
            .ok_or_else(|| anyhow!("input is not an ESTree node (missing `type`)"))?;
        Ok(Classifier::new(&self.blocklist).find(&tree))
    }
}
