use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use cheatsheet_pdf::{Error, Outline, PageSize, Style};

#[derive(Parser)]
#[command(name = "cheatsheet-pdf")]
#[command(version, about = "Fit cheat sheet outlines onto paginated PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an outline JSON file to PDF
    Render {
        /// Outline JSON (may be wrapped in a Markdown code fence)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output PDF (defaults to the input name with a .pdf extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Print the outline after ingest and trimming, without rendering
    Normalize {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Render several outlines in sequence, one PDF each
    Pack {
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Directory receiving <slug>.pdf per outline
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        #[command(flatten)]
        style: StyleArgs,
    },
}

#[derive(clap::Args)]
struct StyleArgs {
    /// Style JSON; unspecified fields keep their defaults
    #[arg(long, value_name = "FILE")]
    style: Option<PathBuf>,

    /// Add a table of contents after the cover
    #[arg(long)]
    toc: bool,

    #[arg(long, value_enum)]
    page_size: Option<PageSizeArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PageSizeArg {
    Letter,
    A4,
}

impl StyleArgs {
    fn resolve(&self) -> Result<Style, Error> {
        let mut style = match &self.style {
            Some(path) => Style::from_json_file(path)?,
            None => Style::default(),
        };
        if self.toc {
            style.table_of_contents = true;
        }
        match self.page_size {
            Some(PageSizeArg::Letter) => style.page_size = PageSize::Letter,
            Some(PageSizeArg::A4) => style.page_size = PageSize::A4,
            None => {}
        }
        Ok(style)
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            input,
            output,
            style,
        } => render(&input, output, &style),
        Commands::Normalize { input } => normalize(&input),
        Commands::Pack {
            inputs,
            output,
            style,
        } => pack(&inputs, &output, &style),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn render(input: &Path, output: Option<PathBuf>, style: &StyleArgs) -> Result<(), Error> {
    let style = style.resolve()?;
    let output = output.unwrap_or_else(|| input.with_extension("pdf"));
    let metadata = cheatsheet_pdf::convert_outline_file(input, &output, &style)?;
    println!("{}", serde_json::to_string(&metadata)?);
    Ok(())
}

fn read_outline(path: &Path) -> Result<Outline, Error> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display())))
    })?;
    cheatsheet_pdf::parse_outline_json(&json)
}

fn normalize(input: &Path) -> Result<(), Error> {
    let outline = cheatsheet_pdf::normalize(&read_outline(input)?);
    println!("{}", serde_json::to_string_pretty(&outline)?);
    Ok(())
}

fn pack(inputs: &[PathBuf], dir: &Path, style: &StyleArgs) -> Result<(), Error> {
    let style = style.resolve()?;
    let mut outlines = Vec::with_capacity(inputs.len());
    let mut unreadable = Vec::new();
    for path in inputs {
        match read_outline(path) {
            Ok(outline) => outlines.push(outline),
            Err(e) => unreadable.push((path, e)),
        }
    }

    let mut report = cheatsheet_pdf::generate_pack(&outlines, &style);
    for (path, e) in &unreadable {
        report.record_unreadable(&path.display().to_string(), e);
    }
    std::fs::create_dir_all(dir)?;

    let mut used = std::collections::HashSet::new();
    let mut written = Vec::new();
    for sheet in &report.sheets {
        let mut name = slug(&sheet.title);
        let base = name.clone();
        let mut n = 2;
        while !used.insert(name.clone()) {
            name = format!("{base}-{n}");
            n += 1;
        }
        let path = dir.join(format!("{name}.pdf"));
        std::fs::write(&path, &sheet.document.bytes)?;
        written.push(serde_json::json!({
            "title": sheet.title,
            "path": path.display().to_string(),
            "pageCount": sheet.document.page_count,
            "byteSize": sheet.document.byte_size,
        }));
    }

    let summary = serde_json::json!({
        "total": report.total,
        "completed": report.completed,
        "sheets": written,
        "warnings": report.warnings,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if report.is_empty() {
        return Err(Error::Render("no cheat sheets were produced".into()));
    }
    Ok(())
}

fn slug(title: &str) -> String {
    let mut out = String::new();
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let out = out.trim_end_matches('-');
    if out.is_empty() {
        "cheat-sheet".into()
    } else {
        out.to_string()
    }
}
