use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info};

use file_validator::loader::{
    ContainerLevel, Document, DocumentLoader, FileType, load_hierarchy, load_schema,
};
use file_validator::output::{self, QcState, tag_update};
use file_validator::validation::Adapter;

/// Arguments for the `file-validator validate` subcommand.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// JSON Schema (draft-07) to validate against
    #[arg(short, long)]
    pub schema: PathBuf,

    /// File to validate (.json, .yaml/.yml or .csv)
    #[arg(short, long, conflicts_with = "metadata", required_unless_present = "metadata")]
    pub input: Option<PathBuf>,

    /// Container hierarchy dump to validate as flattened metadata
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Override file type detection
    #[arg(long, value_enum)]
    pub file_type: Option<FileType>,

    /// Mimetype used when the input has no extension
    #[arg(long)]
    pub mimetype: Option<String>,

    /// Include parent containers when validating metadata
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub add_parents: bool,

    /// Deepest container level shown in the reported fw:// location
    #[arg(long, value_enum, requires = "metadata")]
    pub level: Option<ContainerLevel>,

    /// Directory to write the error report to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Prefix of the PASS/FAIL tag
    #[arg(long, env = "FILE_VALIDATOR_TAG", default_value = output::DEFAULT_TAG)]
    pub tag: String,

    /// Existing tags on the validated source, used to compute the tag update
    #[arg(long = "existing-tag")]
    pub existing_tags: Vec<String>,
}

pub fn validate_command(args: ValidateArgs) -> Result<()> {
    let (path, file_type) = match (&args.input, &args.metadata) {
        (_, Some(metadata)) => (metadata.clone(), FileType::Metadata),
        (Some(input), None) => {
            let file_type = match args.file_type {
                Some(file_type) => file_type,
                None => FileType::identify(input, args.mimetype.as_deref())?,
            };
            (input.clone(), file_type)
        }
        (None, None) => bail!("Either --input or --metadata is required"),
    };
    debug!("Validating {path:?} as {file_type}");

    let schema = load_schema(&args.schema)?;
    let adapter = Adapter::for_file_type(file_type, schema)
        .with_context(|| format!("Invalid validation schema: {:?}", args.schema))?;

    let (document, location) = match file_type {
        FileType::Metadata => {
            let hierarchy = load_hierarchy(&path)?;
            let location = hierarchy.lookup_path(args.level);
            let record = hierarchy.to_record(args.add_parents)?;
            (Document::Record(Value::Object(record)), Some(location))
        }
        _ => (DocumentLoader::new(file_type).load(&path)?, None),
    };
    let result = adapter
        .validate(&document)
        .with_context(|| format!("Cannot validate {path:?}"))?;

    if let Some(output_dir) = &args.output_dir {
        let report = output::save_errors(&result, output_dir)
            .with_context(|| format!("Failed to write error report to {output_dir:?}"))?;
        println!("Error report: {}", report.display());
    }

    let state = QcState::of(&result);
    let tags = tag_update(&args.existing_tags, &args.tag, state);
    info!("Tags after validation: {}", tags.join(", "));

    if let Some(location) = &location {
        info!("Validated container {location}");
        println!("Container: {}", location.bold());
    }

    for error in result.errors() {
        println!(
            "  {} [{}] {}",
            error.location.to_string().bold(),
            error.code,
            error.message
        );
    }

    let summary = output::summary(&result);
    match state {
        QcState::Pass => {
            println!("{} {}", "✓".green(), summary.green());
            Ok(())
        }
        QcState::Fail => {
            println!("{} {}", "✗".red(), summary.red());
            bail!("Validation failed for {path:?}")
        }
    }
}
