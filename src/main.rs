use std::{
    fs,
    io::BufReader,
    path::PathBuf,
    time::Instant,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use sigilscan::{inflate_stream, match_sigils, AbsOp, LineOpExtractor, Matrix, SigilDict};

#[derive(Parser, Debug)]
#[command(about = "Recognize schematic text drawn as raw line strokes", version)]
struct Cli {
    /// Path to the sigil dictionary
    #[arg(long, default_value = "sigils.json")]
    dict: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recognize sigils and print the match list as JSON
    Match(JobArgs),

    /// Recognize sigils and report the match count and wall time
    Bench(JobArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// JSON file of absolute drawing ops (`[[x, y], "m"]` pairs)
    #[arg(long, conflicts_with = "content")]
    ops: Option<PathBuf>,

    /// Decoded page content stream to extract line ops from
    #[arg(long, required_unless_present = "ops")]
    content: Option<PathBuf>,

    /// The content stream is FlateDecode compressed
    #[arg(long, requires = "content")]
    deflate: bool,

    /// The page's /Rotate entry
    #[arg(long, default_value_t = 0, requires = "content")]
    rotation: i32,

    /// Page box width
    #[arg(long, default_value_t = 612.0, requires = "content")]
    page_width: f32,

    /// Page box height
    #[arg(long, default_value_t = 792.0, requires = "content")]
    page_height: f32,

    /// Keep stray single-stroke matches instead of alignment-filtering them
    #[arg(long)]
    skip_alignment: bool,

    /// Write the match list here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

/// One recognized character, as consumed by the overlay writer
#[derive(Serialize)]
struct Placement {
    char: char,
    position: (f32, f32),
    scale: f32,
    angle: f32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let dict_file = fs::File::open(&cli.dict)
        .with_context(|| format!("opening sigil dictionary {}", cli.dict.display()))?;
    let dict = SigilDict::from_reader(BufReader::new(dict_file))
        .context("loading sigil dictionary")?;

    match cli.command {
        Command::Match(args) => {
            let abs_ops = load_ops(&args)?;
            let matches = match_sigils(&dict, &abs_ops, args.skip_alignment);

            log::info!("matched {} sigils", matches.len());

            let placements: Vec<Placement> = matches
                .iter()
                .map(|m| Placement {
                    char: m.sig.char,
                    position: (m.origin.x, m.origin.y),
                    scale: m.sf,
                    angle: m.sig.angle,
                })
                .collect();

            let json = serde_json::to_string_pretty(&placements)?;

            match &args.output {
                Some(path) => fs::write(path, json)
                    .with_context(|| format!("writing matches to {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::Bench(args) => {
            let abs_ops = load_ops(&args)?;

            let start = Instant::now();
            let matches = match_sigils(&dict, &abs_ops, args.skip_alignment);

            println!(
                "matched {} sigils in {:.3} seconds",
                matches.len(),
                start.elapsed().as_secs_f64()
            );
        }
    }

    Ok(())
}

fn load_ops(args: &JobArgs) -> anyhow::Result<Vec<AbsOp>> {
    if let Some(path) = &args.ops {
        let file = fs::File::open(path)
            .with_context(|| format!("opening ops file {}", path.display()))?;
        let abs_ops = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing ops file {}", path.display()))?;

        return Ok(abs_ops);
    }

    let path = args.content.as_ref().expect("clap requires ops or content");
    let mut buffer = fs::read(path)
        .with_context(|| format!("reading content stream {}", path.display()))?;

    if args.deflate {
        buffer = inflate_stream(&buffer).context("inflating content stream")?;
    }

    let ctm = Matrix::for_page_rotation(args.rotation, args.page_width, args.page_height)?;

    Ok(LineOpExtractor::new(&buffer, ctm).extract()?)
}
