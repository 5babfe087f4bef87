use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use oscirender::utils::init_logger_with_level;
use oscirender::{Pipeline, PipelineConfig};

#[derive(Parser)]
#[command(name = "oscirender", version, about = "Render vector shapes as oscilloscope audio")]
struct Cli {
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct Setup {
    /// Project to load (.osci, text or binary)
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Shape files to open; the last one becomes current
    #[arg(short, long)]
    file: Vec<PathBuf>,

    /// Parameter overrides, e.g. `--set frequency=220`
    #[arg(long = "set", value_name = "ID=VALUE")]
    set: Vec<String>,

    /// Effects to enable by id, e.g. `--enable bulge`
    #[arg(long)]
    enable: Vec<String>,

    #[arg(long, default_value_t = 44100.0)]
    sample_rate: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Render to a WAV file
    #[cfg(feature = "bounce")]
    Render {
        #[command(flatten)]
        setup: Setup,
        #[arg(short, long, default_value_t = 5.0)]
        seconds: f64,
        #[arg(short, long, default_value = "out.wav")]
        out: PathBuf,
    },
    /// Play through the default output device until Enter is pressed
    #[cfg(feature = "native")]
    Play {
        #[command(flatten)]
        setup: Setup,
    },
    /// Print the effect order and host parameters
    Info {
        #[command(flatten)]
        setup: Setup,
    },
    /// Save the configured pipeline as a project
    Save {
        #[command(flatten)]
        setup: Setup,
        out: PathBuf,
        /// Write plain XML instead of the binary encoding
        #[arg(long)]
        xml: bool,
    },
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn build_pipeline(setup: &Setup) -> anyhow::Result<Pipeline> {
    let pipeline = Pipeline::new(PipelineConfig {
        sample_rate: setup.sample_rate,
        ..PipelineConfig::default()
    });

    if let Some(project) = &setup.project {
        pipeline
            .load_project(&read(project)?)
            .with_context(|| format!("failed to load project {}", project.display()))?;
    }

    for file in &setup.file {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pipeline.add_file(&name, read(file)?);
    }

    for assignment in &setup.set {
        let Some((id, value)) = assignment.split_once('=') else {
            bail!("expected ID=VALUE, got '{}'", assignment);
        };
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("invalid value in '{}'", assignment))?;
        pipeline.set_effect_value(id.trim(), value)?;
    }

    for id in &setup.enable {
        pipeline.set_effect_enabled(id, true)?;
    }

    Ok(pipeline)
}

fn print_info(pipeline: &Pipeline) {
    println!("effect order: {}", pipeline.toggleable_order().join(" -> "));
    println!("current file: {:?}", pipeline.current_file_name());
    println!("host parameters:");
    for (index, parameter) in pipeline.parameters().iter().enumerate() {
        println!("  {:3} {:28} {:.4}", index, parameter.id(), parameter.normalized());
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    init_logger_with_level(level);

    match cli.command {
        #[cfg(feature = "bounce")]
        Command::Render { setup, seconds, out } => {
            let pipeline = build_pipeline(&setup)?;
            oscirender::bounce::bounce_to_wav(&pipeline, &out, seconds)?;
        }
        #[cfg(feature = "native")]
        Command::Play { setup } => {
            use oscirender::platform::{AudioOutput, CpalOutput};
            use std::sync::Arc;

            let pipeline = Arc::new(build_pipeline(&setup)?);
            let mut output = CpalOutput::new();
            output.initialize(setup.sample_rate)?;
            output.create_stream(pipeline.clone())?;
            output.start()?;

            println!("Playing '{}'. Press Enter to stop.", pipeline.current_file_name());
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            output.stop()?;
        }
        Command::Info { setup } => {
            let pipeline = build_pipeline(&setup)?;
            print_info(&pipeline);
        }
        Command::Save { setup, out, xml } => {
            let pipeline = build_pipeline(&setup)?;
            let data = pipeline.get_state_information()?;
            let data = if xml {
                let root = oscirender::persistence::decode(&data)?;
                oscirender::persistence::to_xml_string(&root)?.into_bytes()
            } else {
                data
            };
            std::fs::write(&out, data).with_context(|| format!("failed to write {}", out.display()))?;
            log::info!("saved project to {}", out.display());
        }
    }

    Ok(())
}
