use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use benchplot::aggregate;
use benchplot::config::{self, Overrides};
use benchplot::discover;
use benchplot::display;
use benchplot::errors::BenchplotError;
use benchplot::render;
use benchplot::viewer;

#[derive(Parser)]
#[command(
    name = "benchplot",
    version,
    about = "Plot benchmark timings across languages, programs and input sizes"
)]
struct Cli {
    /// TOML config file (default: ./benchplot.toml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Languages to load, comma-separated
    #[arg(long, value_delimiter = ',')]
    lang: Option<Vec<String>>,

    /// Program variants to load, comma-separated
    #[arg(long, value_delimiter = ',')]
    prog: Option<Vec<String>>,

    /// Input sizes to load, comma-separated
    #[arg(long, value_delimiter = ',')]
    size: Option<Vec<String>>,

    /// Collision tags to load, comma-separated
    #[arg(long, value_delimiter = ',')]
    col: Option<Vec<String>>,

    /// Load exactly these result files instead of enumerating the config lists
    #[arg(long = "file")]
    files: Vec<PathBuf>,

    /// Directory that relative result paths are resolved against
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Image file to write (.svg or .png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Column for the horizontal axis
    #[arg(short = 'x', long = "x-col")]
    x_col: Option<String>,

    /// Column for the vertical axis
    #[arg(short = 'y', long = "y-col")]
    y_col: Option<String>,

    /// Rows of the table to print (0 prints all)
    #[arg(long, default_value_t = 10)]
    rows: usize,

    #[arg(long)]
    json: bool,

    /// Write the image but do not open a viewer
    #[arg(long)]
    no_show: bool,

    /// Only print the table
    #[arg(long)]
    no_plot: bool,
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let mut config = config::load_config(cli.config.as_deref(), &cwd)?;
    config.apply(Overrides {
        languages: cli.lang,
        programs: cli.prog,
        sizes: cli.size,
        collisions: cli.col,
        x: cli.x_col,
        y: cli.y_col,
        output: cli.output,
    });

    let descriptors = if cli.files.is_empty() {
        discover::enumerate_descriptors(&config)?
    } else {
        cli.files
            .iter()
            .map(|p| discover::descriptor_from_path(p))
            .collect::<Result<Vec<_>>>()?
    };

    if descriptors.is_empty() {
        return Err(BenchplotError::NoDescriptors.into());
    }

    let table = aggregate::load_all(&descriptors, &cli.dir)?;

    let output = if cli.json {
        let mut json = display::format_json(&table);
        json.push('\n');
        json
    } else {
        display::format_table(&table, cli.rows)
    };
    print!("{}", output);

    if cli.no_plot {
        return Ok(());
    }

    let image = render::render(&table, &config.plot)?;
    if cli.no_show {
        info!(path = %image.display(), "skipping viewer");
        return Ok(());
    }

    viewer::show(&image, config.plot.viewer.as_deref())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{}", err);
        process::exit(1);
    }
}
