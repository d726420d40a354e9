use clap::{Parser, Subcommand, ValueEnum};
use folio::resource::{DirectoryDownloads, FilesystemBlobStore, FilesystemResourceProvider};
use folio::surface::RenderableDocument;
use folio::transport::{self, EmailAttachment};
use folio::{
    invoice_document, InvoiceData, PipelineBuilder, PipelineError, ProducerContext,
    USER_FACING_FAILURE,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(version, about = "Produces invoice PDFs from order records", long_about = None)]
struct Args {
    /// Production settings (JSON, camelCase keys)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Seller profile (JSON) printed on every invoice
    #[arg(short, long, global = true)]
    seller: Option<PathBuf>,

    /// Directory of extra fonts for the capture backend
    #[arg(long, global = true)]
    fonts: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Produce the invoice for one order record
    Invoice {
        /// Order record (JSON)
        data: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Mode::Native)]
        mode: Mode,

        /// Download directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Also upsert the PDF into this blob store directory
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Capture an arbitrary surface description into a PDF
    Render {
        /// Surface description (JSON node tree)
        document: PathBuf,

        /// Asset root for image sources [default: the document's directory]
        #[arg(long)]
        assets: Option<PathBuf>,

        #[arg(short, long, default_value = "out.pdf")]
        out: PathBuf,
    },
    /// Print the email attachment for an order as JSON
    Attachment { data: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    /// Text and tables drawn straight into the PDF
    Native,
    /// Minimal hand-assembled PDF
    Raw,
    /// Captured invoice surface embedded as an image
    Raster,
    /// Standalone HTML instead of a PDF
    Html,
}

impl Mode {
    fn context(self) -> Option<ProducerContext> {
        match self {
            Mode::Native => Some(ProducerContext::Checkout),
            Mode::Raw => Some(ProducerContext::Headless),
            Mode::Raster => Some(ProducerContext::Interactive),
            Mode::Html => None,
        }
    }
}

fn load_invoice(path: &Path) -> Result<InvoiceData, PipelineError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn builder(args: &Args) -> Result<PipelineBuilder, PipelineError> {
    let mut builder = PipelineBuilder::new().with_system_fonts(true);
    if let Some(path) = &args.config {
        builder = builder.with_config_file(path)?;
    }
    if let Some(path) = &args.seller {
        builder = builder.with_seller_file(path)?;
    }
    if let Some(dir) = &args.fonts {
        builder = builder.with_font_dir(dir);
    }
    Ok(builder)
}

async fn run(args: Args) -> Result<(), PipelineError> {
    match &args.command {
        Command::Invoice {
            data,
            mode,
            out,
            store,
        } => {
            let invoice = load_invoice(data)?.sanitized();
            let pipeline = builder(&args)?.build()?;
            let downloads = DirectoryDownloads::new(out);

            let Some(context) = mode.context() else {
                let document = invoice_document(&invoice, pipeline.seller());
                let location = transport::download_as_html_fallback(
                    &downloads,
                    &document,
                    &invoice.order_ref.pdf_filename(),
                )?;
                println!("{}", location);
                return Ok(());
            };

            let produced = pipeline.produce_invoice(context, &invoice).await?;
            if let Some(report) = &produced.report {
                log::info!(
                    "{} attempt(s), {:?} spent backing off",
                    report.attempts.len(),
                    report.total_backoff()
                );
            }
            let location =
                transport::download(&downloads, &produced.pdf, &invoice.order_ref.pdf_filename())?;
            if let Some(root) = store {
                let blobs = FilesystemBlobStore::new(root)?;
                transport::store_invoice(&blobs, &invoice.order_ref, &produced.pdf)?;
            }
            println!("{}", location);
        }
        Command::Render {
            document,
            assets,
            out,
        } => {
            let json = fs::read_to_string(document)?;
            let surface = RenderableDocument::from_json(&json)?;
            surface.set_attached(true)?;
            let resources = match assets {
                Some(root) => FilesystemResourceProvider::new(root),
                None => FilesystemResourceProvider::for_document(document),
            };
            let pipeline = builder(&args)?.with_resources(Arc::new(resources)).build()?;
            let label = document.display().to_string();
            let (result, _report) = pipeline.produce_document(&surface, &label).await;
            fs::write(out, result?.as_bytes())?;
            println!("{}", out.display());
        }
        Command::Attachment { data } => {
            let invoice = load_invoice(data)?;
            let seller = match &args.seller {
                Some(path) => folio::pipeline::load_seller(path)?,
                None => Default::default(),
            };
            let attachment = EmailAttachment::for_invoice(&invoice, &seller)?;
            println!("{}", serde_json::to_string_pretty(&attachment)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        log::error!("{}", e);
        if e.is_terminal() {
            eprintln!("{}", USER_FACING_FAILURE);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}
