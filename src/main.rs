use std::str::FromStr;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use log::{LevelFilter, debug, info};

use umlsketch::editor::{Canvas, Tool};
use umlsketch::geometry::Point;
use umlsketch::{CanvasConfig, ExportError, document};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect, render and generate code from class diagrams", long_about = None)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Canvas configuration file (TOML)
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a diagram file as JSON
    Show {
        #[arg(value_name = "DIAGRAM")]
        diagram: Utf8PathBuf,
    },
    /// Write one source skeleton per node
    Codegen {
        #[arg(value_name = "DIAGRAM")]
        diagram: Utf8PathBuf,
        /// Output directory (created if missing)
        #[arg(long, value_name = "DIR")]
        out: Utf8PathBuf,
    },
    /// Render a diagram to SVG, PNG or JPEG (by extension)
    Render {
        #[arg(value_name = "DIAGRAM")]
        diagram: Utf8PathBuf,
        #[arg(value_name = "OUTPUT")]
        output: Utf8PathBuf,
    },
    /// Build a small sample diagram and save it
    Demo {
        #[arg(value_name = "OUTPUT")]
        output: Utf8PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    debug!(cli:?; "Parsed arguments");

    let config = match &cli.config {
        Some(path) => {
            CanvasConfig::load(path).with_context(|| format!("Failed to load config {}", path))?
        }
        None => CanvasConfig::default(),
    };

    match cli.command {
        Command::Show { diagram } => {
            let loaded = document::load_diagram(&diagram)
                .with_context(|| format!("Failed to open {}", diagram))?;
            println!("{}", serde_json::to_string_pretty(&loaded)?);
        }
        Command::Codegen { diagram, out } => {
            std::fs::create_dir_all(&out).with_context(|| format!("Create {}", out))?;
            let mut canvas = Canvas::headless(config);
            canvas
                .load(diagram.as_std_path())
                .with_context(|| format!("Failed to open {}", diagram))?;
            let report = canvas.export_sources(out.as_std_path());
            for path in &report.written {
                println!("{}", path.display());
            }
            if !report.is_complete() {
                for (name, err) in &report.failed {
                    eprintln!("{:?}: {}", name, err);
                }
                return Err(ExportError::Partial {
                    failed: report.failed.len(),
                    total: report.failed.len() + report.written.len(),
                }
                .into());
            }
        }
        Command::Render { diagram, output } => {
            let mut canvas = Canvas::headless(config);
            canvas
                .load(diagram.as_std_path())
                .with_context(|| format!("Failed to open {}", diagram))?;
            canvas
                .export_image(output.as_std_path())
                .with_context(|| format!("Failed to render {}", output))?;
        }
        Command::Demo { output } => {
            let mut canvas = build_demo(config)?;
            canvas
                .save(output.as_std_path())
                .with_context(|| format!("Failed to save {}", output))?;
            info!(path = output.as_str(); "Demo diagram written");
        }
    }
    Ok(())
}

/// A class implementing an interface, built through the same gestures a user
/// would make.
fn build_demo(config: CanvasConfig) -> Result<Canvas> {
    let mut canvas = Canvas::headless(config);

    canvas.select_tool(Tool::Class);
    canvas
        .click(Point::new(150, 250))
        .context("Demo class could not be placed")?;
    canvas.select_tool(Tool::Interface);
    canvas
        .click(Point::new(400, 250))
        .context("Demo interface could not be placed")?;

    // top connection points: class (190,250), interface (440,250)
    canvas.select_tool(Tool::Inheritance);
    canvas.press(Point::new(190, 250));
    canvas.release(Point::new(440, 250))?;
    canvas.select_tool(Tool::Inheritance);

    for (at, name) in [(Point::new(200, 260), "Circle"), (Point::new(450, 260), "Shape")] {
        canvas.double_click(at).context("Demo node name row not found")?;
        canvas.set_edit_text(name);
        canvas.key_enter();
    }

    canvas.press(Point::new(200, 290));
    canvas.add_attribute(Some("private"), "radius: double")?;
    canvas.add_operation(Some("public"), "area(): double")?;
    canvas.press(Point::new(450, 290));
    canvas.add_operation(Some("public"), "area(): double")?;
    canvas.press(Point::new(0, 0));
    Ok(canvas)
}
