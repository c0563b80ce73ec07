use clap::Parser;
use mdxcore::{AttributeScope, MissingTreePolicy, Mode, SanitizeOptions};
use std::path::{Path, PathBuf};

/// Removes expression content from MDX syntax trees.
///
/// Reads an MDX syntax tree (mdast JSON with data.estree) from INPUT or stdin,
/// removes expression content and writes the tree back as JSON.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "mdxscrub")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Input file; `-` or nothing reads stdin.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Write to FILE instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Remove only expressions that reach blocked capabilities.
    #[arg(short = 'd', long)]
    pub only_dangerous: bool,

    /// Leave JSX attributes untouched.
    #[arg(short = 'a', long)]
    pub skip_attributes: bool,

    /// Remove expressions that carry no syntax tree.
    #[arg(long)]
    pub fail_closed: bool,

    /// Keep nodes whose children were all removed.
    #[arg(long)]
    pub keep_empty_parents: bool,

    /// Write compact JSON.
    #[arg(long)]
    pub compact: bool,

    /// Print an outline of the result instead of JSON.
    #[arg(long, conflicts_with = "check")]
    pub outline: bool,

    /// Classify a single ESTree program instead of a document.
    #[arg(long)]
    pub check: bool,

    /// Write the default configuration file and exit.
    #[arg(long)]
    pub init_config: bool,
}

impl CliArgs {
    /// The input file, or `None` for stdin.
    pub fn input_path(&self) -> Option<&Path> {
        self.input
            .as_deref()
            .filter(|path| path.as_os_str() != "-")
    }

    /// Overrides configured options with the flags given on the command line.
    pub fn apply(&self, options: &mut SanitizeOptions) {
        if self.only_dangerous {
            options.mode = Mode::RemoveDangerousOnly;
        }
        if self.skip_attributes {
            options.attributes = AttributeScope::ExcludeAttributes;
        }
        if self.fail_closed {
            options.missing_tree = MissingTreePolicy::Remove;
        }
        if self.keep_empty_parents {
            options.prune_empty_parents = false;
        }
    }
}
