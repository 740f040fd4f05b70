//! cardgen CLI - batch spreadsheet record generation

use anyhow::{bail, Context, Result};
use cardgen_core::{
    detect_mapping, CellRef, DatasetReader, EditorSession, FieldMapping, GenerateConfig,
    Generator, MappingStore, DEFAULT_ROW_COUNT,
};
use cardgen_xlsx::{first_merged_conflict, XlsxBackend, XlsxDataset, XlsxTemplate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cardgen")]
#[command(
    author,
    version,
    about = "Generate one spreadsheet record per dataset row from a template"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Auto-detect a field mapping from the template layout
    Detect {
        /// Dataset workbook (Sheet1 with a header row)
        #[arg(short, long)]
        dataset: PathBuf,

        /// Template workbook to scan for header labels
        #[arg(short, long)]
        template: PathBuf,

        /// Persist the draft mapping to the dataset's mapping store
        #[arg(short, long)]
        save: bool,
    },

    /// Inspect or edit the stored mapping for a dataset
    Mapping {
        /// Dataset workbook the mapping belongs to
        #[arg(short, long)]
        dataset: PathBuf,

        #[command(subcommand)]
        action: MappingAction,
    },

    /// Generate one record file per dataset row
    Generate {
        /// Dataset workbook (Sheet1 with a header row)
        #[arg(short, long)]
        dataset: PathBuf,

        /// Template workbook, copied once per row
        #[arg(short, long)]
        template: PathBuf,

        /// Output directory for the generated records
        #[arg(short, long)]
        out: PathBuf,

        /// Number of rows to process, top to bottom
        #[arg(short, long, default_value_t = DEFAULT_ROW_COUNT)]
        count: usize,

        /// Confirm the stored mapping (generation refuses to run without it)
        #[arg(long)]
        accept_mapping: bool,
    },
}

#[derive(Subcommand)]
enum MappingAction {
    /// Print the stored mapping
    Show,

    /// Add or update entries, given as CELL=FIELD (e.g. "C3=姓名", "D5=")
    Set {
        #[arg(required = true)]
        entries: Vec<String>,
    },

    /// Remove entries by cell reference
    Remove {
        #[arg(required = true)]
        cells: Vec<String>,
    },

    /// Remove all entries
    Clear,

    /// Re-validate and re-save the stored mapping unchanged
    Confirm,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            dataset,
            template,
            save,
        } => detect(&dataset, &template, save),
        Commands::Mapping { dataset, action } => mapping(&dataset, action),
        Commands::Generate {
            dataset,
            template,
            out,
            count,
            accept_mapping,
        } => generate(&dataset, &template, &out, count, accept_mapping),
    }
}

fn detect(dataset_path: &PathBuf, template_path: &PathBuf, save: bool) -> Result<()> {
    let dataset = XlsxDataset::open(dataset_path)
        .with_context(|| format!("Failed to open dataset '{}'", dataset_path.display()))?;
    let template = XlsxTemplate::open(template_path)
        .with_context(|| format!("Failed to open template '{}'", template_path.display()))?;

    let draft = detect_mapping(dataset.headers(), &template)?;

    println!("Detected {} mapping entr(ies):", draft.len());
    print_mapping(&draft);

    if save {
        let store = MappingStore::for_dataset(dataset_path)?;
        store.save(&draft)?;
        println!("Saved to '{}'", store.path().display());
    } else {
        println!("(draft only; re-run with --save to persist)");
    }

    Ok(())
}

fn mapping(dataset_path: &PathBuf, action: MappingAction) -> Result<()> {
    let store = MappingStore::for_dataset(dataset_path)?;

    match action {
        MappingAction::Show => {
            let mapping = store.load().context(
                "Cannot load the mapping for this dataset; \
                 create one with 'detect --save' or 'mapping set'",
            )?;
            print_mapping(&mapping);
        }
        MappingAction::Set { entries } => {
            let mut session = open_session(&store)?;
            for entry in &entries {
                let (cell, field) = FieldMapping::parse_entry(entry)
                    .with_context(|| format!("Bad entry '{}'", entry))?;
                if session.rows().iter().any(|(c, _)| *c == cell) {
                    session.edit_field(cell, &field)?;
                } else {
                    session.add_row(&cell.to_string(), &field)?;
                }
            }
            let mapping = session.commit(&store)?;
            print_mapping(&mapping);
            println!("Saved to '{}'", store.path().display());
        }
        MappingAction::Remove { cells } => {
            let mut session = open_session(&store)?;
            for cell_text in &cells {
                let cell = CellRef::parse(cell_text.trim())
                    .with_context(|| format!("Bad cell reference '{}'", cell_text))?;
                if !session.delete_row(cell) {
                    bail!("No mapping entry for {}", cell);
                }
            }
            let mapping = session.commit(&store)?;
            print_mapping(&mapping);
        }
        MappingAction::Clear => {
            let mut session = open_session(&store)?;
            for (cell, _) in session.rows().to_vec() {
                session.delete_row(cell);
            }
            session.commit(&store)?;
            println!("Mapping cleared");
        }
        MappingAction::Confirm => {
            let mut session = open_session(&store)?;
            let mapping = session.commit(&store)?;
            print_mapping(&mapping);
            println!("Mapping confirmed and re-saved");
        }
    }

    Ok(())
}

fn generate(
    dataset_path: &PathBuf,
    template_path: &PathBuf,
    out: &PathBuf,
    count: usize,
    accept_mapping: bool,
) -> Result<()> {
    let store = MappingStore::for_dataset(dataset_path)?;
    let stored = store.load().context(
        "Cannot load the mapping for this dataset; \
         create one with 'detect --save' or 'mapping set' first",
    )?;

    println!("Mapping for '{}':", dataset_path.display());
    print_mapping(&stored);

    if !accept_mapping {
        bail!(
            "Generation requires a confirmed mapping; review the mapping above \
             (edit it with 'cardgen mapping') and re-run with --accept-mapping"
        );
    }

    // Preflight: a mapping target inside a merged block (but not its first
    // cell) would abort mid-batch, so report it before any file is written.
    let template = XlsxTemplate::open(template_path)
        .with_context(|| format!("Failed to open template '{}'", template_path.display()))?;
    let targets: Vec<CellRef> = stored.iter().map(|(c, _)| c).collect();
    if let Some((cell, region)) = first_merged_conflict(&template, &targets) {
        bail!(
            "Mapped cell {} is inside merged region {} but is not its first cell; \
             check that mapped cells are the first cell of any merged block",
            cell,
            region
        );
    }

    let mut dataset = XlsxDataset::open(dataset_path)
        .with_context(|| format!("Failed to open dataset '{}'", dataset_path.display()))?;

    // --accept-mapping is the operator's confirmation action
    let mut session = EditorSession::open(&store)?;
    session.commit(&store)?;

    let config = GenerateConfig::new(dataset_path, template_path, out).with_count(count);
    let report = Generator::new(config)
        .generate(&mut dataset, &XlsxBackend, &store, &session)
        .context("Generation failed")?;

    println!(
        "Generated {} record(s) in '{}'",
        report.generated,
        out.display()
    );
    Ok(())
}

/// Open an edit session, starting empty when nothing is stored yet
fn open_session(store: &MappingStore) -> Result<EditorSession> {
    EditorSession::open(store)
        .with_context(|| format!("Failed to load mapping from '{}'", store.path().display()))
}

fn print_mapping(mapping: &FieldMapping) {
    if mapping.is_empty() {
        println!("  (empty)");
        return;
    }
    for (cell, field) in mapping.iter() {
        let field = if field.is_empty() { "<blank>" } else { field };
        println!("  {:>8}  {}", cell.to_string(), field);
    }
}
