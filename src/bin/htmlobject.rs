use std::{io::Write,
          path::{Path, PathBuf}};

use anyhow::{Result, anyhow};
use clap::Parser as ClapParser;
use htmlobject::{easy_fs::{filepaths_in_dir, load_template, read_to_string, write_string},
                 info, warn,
                 warn::set_verbose,
                 CompileOptions, Compiler, ParseOptions, TemplateNode, TemplateRegistry,
                 parse};


#[derive(clap::Parser, Debug)]
/// Convert between JSON template objects and HTML.
struct Args {
    /// Print progress information to stderr
    #[clap(short, long)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Compile a JSON template file, or every *.json file in a
    /// directory, to HTML
    Compile {
        /// File or directory to read
        input: PathBuf,

        /// Where to write: a file for file input (default: stdout), a
        /// directory for directory input (default: the input
        /// directory)
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Give up on templates nested deeper than this
        #[clap(long, default_value = "512")]
        max_depth: usize,
    },

    /// Parse an HTML file, or every *.html file in a directory, into
    /// JSON template objects
    Parse {
        /// File or directory to read
        input: PathBuf,

        /// Where to write, as for `compile`
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Fail on markup errors instead of warning about them
        #[clap(long)]
        strict: bool,

        /// Write JSON on a single line
        #[clap(long)]
        compact: bool,

        /// Give up on elements nested deeper than this
        #[clap(long, default_value = "512")]
        max_depth: usize,
    },
}

/// Where each converted file goes.
enum Target<'t> {
    Stdout,
    File(&'t Path),
}

fn emit(target: Target, s: &str) -> Result<()> {
    match target {
        Target::Stdout => {
            let mut outp = std::io::stdout().lock();
            outp.write_all(s.as_bytes())?;
            outp.flush()?;
            Ok(())
        }
        Target::File(path) => write_string(path, s),
    }
}

/// Run `convert` on `input`, or on every file with extension
/// `in_ext` if `input` is a directory.
fn for_inputs(
    input: &Path,
    output: Option<&Path>,
    in_ext: &str,
    out_ext: &str,
    convert: impl Fn(&Path) -> Result<String>,
) -> Result<()> {
    if input.is_dir() {
        let outdir = output.unwrap_or(input);
        let paths = filepaths_in_dir(input, in_ext)?;
        if paths.is_empty() {
            warn!("no *.{in_ext} files in {:?}", input);
        }
        for path in paths {
            let stem = path.file_stem().ok_or_else(
                || anyhow!("path without file name: {:?}", path))?;
            let outpath = outdir.join(format!("{}.{out_ext}", stem.to_string_lossy()));
            info!("{:?} -> {:?}", path, outpath);
            emit(Target::File(&outpath), &convert(&path)?)?;
        }
        Ok(())
    } else {
        let s = convert(input)?;
        match output {
            Some(path) => {
                info!("{:?} -> {:?}", input, path);
                emit(Target::File(path), &s)
            }
            None => emit(Target::Stdout, &s),
        }
    }
}

fn compile_file(compiler: &Compiler, path: &Path) -> Result<String> {
    let node = load_template(path)?;
    node.for_each_template_ref(&mut |r| {
        warn!("{:?}: no template {:?} available, it compiles to the empty string",
              path, r.name.as_str())
    });
    compiler.compile(node)
}

fn parse_file(options: &ParseOptions, compact: bool, path: &Path) -> Result<String> {
    let node: TemplateNode = parse(&read_to_string(path)?, options)?;
    let mut s = if compact {
        serde_json::to_string(&node)?
    } else {
        serde_json::to_string_pretty(&node)?
    };
    s.push('\n');
    Ok(s)
}

fn main() -> Result<()> {
    let args = Args::parse();
    set_verbose(args.verbose);

    match &args.command {
        Command::Compile { input, output, max_depth } => {
            let registry = TemplateRegistry::new();
            let compiler = Compiler::with_options(
                &registry,
                CompileOptions { max_depth: *max_depth });
            for_inputs(input, output.as_deref(), "json", "html",
                       |path| compile_file(&compiler, path))
        }
        Command::Parse { input, output, strict, compact, max_depth } => {
            let options = ParseOptions { strict: *strict, max_depth: *max_depth };
            for_inputs(input, output.as_deref(), "html", "json",
                       |path| parse_file(&options, *compact, path))
        }
    }
}
