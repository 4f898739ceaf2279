use crate::config::AppConfig;
use crate::db::Db;
use crate::dialogs::{invoice_open_options, FileDialog, FixedSaveDialog, PathListDialog};
use crate::excel;
use crate::ocr::Recognizer;
use crate::services::batch;
use crate::store::{load_settings, CredentialStore};
use crate::transport::HttpTransport;
use crate::types::{
    Credentials, FileItem, FileStatus, NormalizedRecord, SourceFile, TemplateSignature,
};
use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recognise invoices with Baidu OCR and export them to Excel
#[derive(Parser)]
#[command(name = "invoice-ocr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recognise invoice files (jpg, jpeg, png, bmp, pdf, ofd)
    Recognize(RecognizeArgs),

    /// Recognise a base64-encoded image read from stdin (e.g. a screen capture)
    RecognizeImage(RecognizeImageArgs),

    /// Export previously recognised records (JSON) to Excel
    Export(ExportArgs),

    /// Show or change the stored API keys and templates
    Settings(SettingsArgs),
}

#[derive(Args, Clone, Default)]
pub struct TemplateArgs {
    /// Use the stored custom template with this name
    #[arg(long, conflicts_with = "template_sign")]
    pub template: Option<String>,

    /// Use this custom template signature directly
    #[arg(long)]
    pub template_sign: Option<String>,
}

#[derive(Args)]
pub struct RecognizeArgs {
    /// Files to recognise
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub template: TemplateArgs,

    /// Export successful results to Excel (optionally to PATH; default: Downloads)
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    pub export: Option<Option<PathBuf>>,

    /// Build the workbook but do not write it (same as cancelling the save prompt)
    #[arg(long, requires = "export")]
    pub no_save: bool,

    /// Print items as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct RecognizeImageArgs {
    /// Display name for the captured image
    #[arg(long, default_value = "screenshot.png")]
    pub name: String,

    #[command(flatten)]
    pub template: TemplateArgs,
}

#[derive(Args)]
pub struct ExportArgs {
    /// JSON file written by `recognize --json` (or a plain array of records)
    pub input: PathBuf,

    /// Destination .xlsx (default: Downloads)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Build the workbook but do not write it
    #[arg(long, conflicts_with = "output")]
    pub no_save: bool,
}

#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: SettingsAction,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the stored settings (secrets masked)
    Show,

    /// Replace the stored settings
    Set {
        #[arg(long)]
        api_key: String,

        #[arg(long)]
        secret_key: String,

        /// Custom template as NAME=SIGN (repeatable)
        #[arg(long = "template", value_name = "NAME=SIGN")]
        templates: Vec<String>,
    },

    /// Print the data directory
    Dir {
        /// Open it in the file manager
        #[arg(long)]
        open: bool,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load();
    match cli.command {
        Commands::Recognize(args) => recognize(&config, args),
        Commands::RecognizeImage(args) => recognize_image(&config, args),
        Commands::Export(args) => export(args),
        Commands::Settings(args) => settings(&config, args),
    }
}

fn open_store(config: &AppConfig) -> anyhow::Result<Arc<Db>> {
    let path = config.settings_db_path();
    let db = Db::open(&path).with_context(|| format!("opening {}", path.display()))?;
    Ok(Arc::new(db))
}

fn build_recognizer(
    config: &AppConfig,
    store: Arc<Db>,
) -> anyhow::Result<Arc<Recognizer<HttpTransport, Db>>> {
    let transport = HttpTransport::new(config.timeout)?;
    Ok(Arc::new(Recognizer::new(
        config.api_base.clone(),
        Arc::new(transport),
        store,
    )))
}

/// `--template NAME` is looked up in the stored settings; `--template-sign` is used as is.
fn resolve_template(
    store: &dyn CredentialStore,
    args: &TemplateArgs,
) -> anyhow::Result<Option<String>> {
    if let Some(sign) = &args.template_sign {
        return Ok(Some(sign.clone()));
    }
    let Some(name) = &args.template else {
        return Ok(None);
    };
    let settings = load_settings(store)?;
    settings
        .template_by_name(name)
        .map(|t| Some(t.template_sign.clone()))
        .ok_or_else(|| anyhow!("No stored template named '{}'", name))
}

fn recognize(config: &AppConfig, args: RecognizeArgs) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let template_sign = resolve_template(store.as_ref(), &args.template)?;
    let recognizer = build_recognizer(config, store)?;

    let picked = PathListDialog::new(args.files).choose_files(&invoice_open_options());
    if picked.is_empty() {
        bail!("No supported files selected");
    }
    let mut items: Vec<FileItem> = picked
        .into_iter()
        .map(|p| FileItem::new(SourceFile::from_path(p.name, p.path)))
        .collect();

    // The blocking HTTP client must be dropped outside the runtime, so the
    // recognizer outlives `block_on`.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting worker runtime")?;
    let summary =
        runtime.block_on(batch::scan_items(recognizer.clone(), &mut items, template_sign));
    drop(runtime);
    drop(recognizer);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        print_items(&items);
        eprintln!("{} succeeded, {} failed", summary.succeeded, summary.failed);
    }

    if let Some(target) = args.export {
        let dialog = match (args.no_save, target) {
            (true, _) => FixedSaveDialog::Cancel,
            (false, Some(path)) => FixedSaveDialog::Path(path),
            (false, None) => FixedSaveDialog::AcceptDefault,
        };
        let records = batch::collected_records(&items);
        let bytes = excel::export_records(&records, &dialog)?;
        eprintln!("Workbook: {} row(s), {} bytes", records.len(), bytes.len());
    }
    Ok(())
}

fn recognize_image(config: &AppConfig, args: RecognizeImageArgs) -> anyhow::Result<()> {
    let mut image_data = String::new();
    std::io::stdin()
        .read_to_string(&mut image_data)
        .context("reading image data from stdin")?;
    let image_data = image_data.trim().to_string();
    if image_data.is_empty() {
        bail!("No image data on stdin");
    }

    let store = open_store(config)?;
    let template_sign = resolve_template(store.as_ref(), &args.template)?;
    let recognizer = build_recognizer(config, store)?;

    let source = SourceFile::from_image_data(args.name, image_data);
    let record = recognizer.recognize(&source, None, template_sign.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn load_records(input: &Path) -> anyhow::Result<Vec<NormalizedRecord>> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    if let Ok(items) = serde_json::from_str::<Vec<FileItem>>(&text) {
        return Ok(batch::collected_records(&items));
    }
    serde_json::from_str::<Vec<NormalizedRecord>>(&text).with_context(|| {
        format!(
            "{} is neither a list of file items nor of records",
            input.display()
        )
    })
}

fn export(args: ExportArgs) -> anyhow::Result<()> {
    let records = load_records(&args.input)?;
    let dialog = match (args.no_save, args.output) {
        (true, _) => FixedSaveDialog::Cancel,
        (false, Some(path)) => FixedSaveDialog::Path(path),
        (false, None) => FixedSaveDialog::AcceptDefault,
    };
    let bytes = excel::export_records(&records, &dialog)?;
    eprintln!("Workbook: {} row(s), {} bytes", records.len(), bytes.len());
    Ok(())
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.is_empty() {
        "(not set)".to_string()
    } else {
        format!("{}****", visible)
    }
}

/// Parse `NAME=SIGN`; the name may not be empty.
fn parse_template(raw: &str) -> anyhow::Result<TemplateSignature> {
    let (name, sign) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Template '{}' must look like NAME=SIGN", raw))?;
    let (name, sign) = (name.trim(), sign.trim());
    if name.is_empty() || sign.is_empty() {
        bail!("Template '{}' must look like NAME=SIGN", raw);
    }
    Ok(TemplateSignature {
        template_name: name.to_string(),
        template_sign: sign.to_string(),
    })
}

fn settings(config: &AppConfig, args: SettingsArgs) -> anyhow::Result<()> {
    match args.action {
        SettingsAction::Show => {
            let store = open_store(config)?;
            let settings = load_settings(store.as_ref())?;
            println!("API Key:    {}", mask(&settings.api_key));
            println!("Secret Key: {}", mask(&settings.secret_key));
            if settings.templates.is_empty() {
                println!("Templates:  (none)");
            } else {
                println!("Templates:");
                for t in &settings.templates {
                    println!("  {} = {}", t.template_name, t.template_sign);
                }
            }
        }
        SettingsAction::Set {
            api_key,
            secret_key,
            templates,
        } => {
            let templates = templates
                .iter()
                .map(|raw| parse_template(raw))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let credentials = Credentials {
                api_key: api_key.trim().to_string(),
                secret_key: secret_key.trim().to_string(),
                templates,
            };
            let store = open_store(config)?;
            store.set(&credentials)?;
            println!("Settings saved to {}", config.settings_db_path().display());
        }
        SettingsAction::Dir { open } => {
            println!("{}", config.data_dir.display());
            if open {
                std::fs::create_dir_all(&config.data_dir)?;
                opener::open(&config.data_dir).map_err(|e| anyhow!(e.to_string()))?;
            }
        }
    }
    Ok(())
}

fn print_items(items: &[FileItem]) {
    for (idx, item) in items.iter().enumerate() {
        let status = match item.status {
            FileStatus::Pending => "pending",
            FileStatus::Processing => "processing",
            FileStatus::Success => "success",
            FileStatus::Error => "error",
        };
        match (&item.record, &item.error) {
            (Some(r), _) => println!(
                "{:>3}  {:<7}  {}  {} | {} | {} | {} | {}",
                idx + 1,
                status,
                item.source.name,
                r.invoice_type,
                r.code,
                r.number,
                r.amount,
                r.date
            ),
            (None, Some(e)) => {
                println!("{:>3}  {:<7}  {}  {}", idx + 1, status, item.source.name, e)
            }
            (None, None) => println!("{:>3}  {:<7}  {}", idx + 1, status, item.source.name),
        }
    }
}
