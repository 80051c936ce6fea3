use clap::{Parser, Subcommand};
use picbatch::cancel::CancelToken;
use picbatch::format::OutputFormat;
use picbatch::imaging::RustCodec;
use picbatch::policy::PolicyMode;
use picbatch::{batch, config, output};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "picbatch")]
#[command(about = "Batch image converter with width and quality/size policies")]
#[command(long_about = "\
Batch image converter with width and quality/size policies

Converts a set of source images into a destination folder. Images wider than
the width bound are downscaled; each image is then re-encoded either at a
fixed quality floor (quality mode) or at the highest quality that stays under
a file-size ceiling (size mode, binary search). Files that already satisfy
the policy are copied byte-for-byte with their modification time preserved.

Inputs may be files or folders; folders are expanded one level deep and
filtered to recognized image extensions
(jpg, jpeg, png, tiff, tif, webp, bmp, avif, gif, ico).

Per-file failures are logged and the run continues. Ctrl-C stops the run at
the next file boundary or between quality probes.

Defaults are read from picbatch.toml in the working directory; command-line
flags override file values. Run 'picbatch gen-config' to generate a
documented picbatch.toml.")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Source files or folders (folders expand one level deep)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Destination folder (created if missing)
    #[arg(long)]
    dest: PathBuf,

    /// Downscale wider images to this width
    #[arg(long)]
    max_width: Option<u32>,

    /// Quality floor (1-100) for quality-priority runs
    #[arg(long)]
    min_quality: Option<u32>,

    /// File-size ceiling in KB for size-priority runs
    #[arg(long)]
    max_size_kb: Option<u32>,

    /// Which constraint wins for lossy formats
    #[arg(long, value_enum)]
    mode: Option<PolicyMode>,

    /// Output format ('keep' re-encodes each file in its own format)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Empty the destination folder (top-level files) before the run
    #[arg(long, overrides_with = "no_clear_dest")]
    clear_dest: bool,

    /// Keep existing destination files even if the config says otherwise
    #[arg(long, overrides_with = "clear_dest")]
    no_clear_dest: bool,

    /// Directory containing picbatch.toml
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Convert images into the destination folder
    Run(RunArgs),
    /// Print a stock picbatch.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args)?,
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(())
}

fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app_config = config::load_config(&args.config_dir)?;

    let mut policy = app_config.to_policy();
    if let Some(v) = args.max_width {
        policy.max_width = v;
    }
    if let Some(v) = args.min_quality {
        policy.min_quality = v;
    }
    if let Some(v) = args.max_size_kb {
        policy.max_size_kb = v;
    }
    if let Some(v) = args.mode {
        policy.mode = v;
    }
    if let Some(v) = args.format {
        policy.output_format = v;
    }
    policy.validate()?;

    let clear = if args.no_clear_dest {
        false
    } else {
        args.clear_dest || app_config.run.clear_dest
    };
    if clear {
        let removed = batch::clear_destination(&args.dest)?;
        if removed > 0 {
            println!("출력 폴더 비움: {removed}개 파일 삭제");
        }
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.request())?;

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_batch_event(&event);
        }
    });

    let codec = RustCodec::new();
    let result = batch::run_batch(&codec, &args.inputs, &args.dest, &policy, &cancel, Some(tx));
    printer.join().unwrap();
    result?;
    Ok(())
}
