use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Args;

use crate::config::Grouping;
use crate::domain::revision::RevisionPair;
use crate::error::{AppError, AppResult};
use crate::workflow::check::parser_for;
use crate::workflow::report::{self, ReportFormat};

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Saved apidiff output; read from stdin when omitted.
    #[arg(long)]
    pub input: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
    pub format: ReportFormat,
    #[arg(long)]
    pub group_by_package: bool,
    /// Labels for the text and json headers.
    #[arg(long, default_value = "old")]
    pub old: String,
    #[arg(long, default_value = "new")]
    pub new: String,
}

pub fn run(args: RenderArgs) -> AppResult<String> {
    let raw = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let grouping = if args.group_by_package {
        Grouping::PackageHeadings
    } else {
        Grouping::Single
    };
    let changes = parser_for(grouping).parse(&raw);
    let revisions = RevisionPair::new(args.old, args.new);

    report::render(args.format, &changes, &revisions)
        .map_err(|err| AppError::Configuration(format!("failed to render report: {err}")))
}
