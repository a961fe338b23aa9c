//! Headless batch editor.
//!
//! Usage: `retouch <input> <output> [--script script.json] [--config config.json]`
//!
//! Loads `input`, applies the edit script (if any) through the editor and
//! writes the resulting image as PNG. An output directory gets the default
//! export file name.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};

    use clap::Parser;

    use retouch::constants::EXPORT_FILE_NAME;
    use retouch::crop::default_target;
    use retouch::script::{parse_script, run_script};
    use retouch::{ConfigError, Editor, EditorConfig, EditorError, SceneModel};

    #[derive(Debug, thiserror::Error)]
    pub enum CliError {
        #[error(transparent)]
        Config(#[from] ConfigError),

        #[error(transparent)]
        Editor(#[from] EditorError),

        #[error("failed to access {path:?}: {source}")]
        Io {
            path: PathBuf,
            source: std::io::Error,
        },

        #[error("could not load image {0:?}")]
        NoImage(PathBuf),
    }

    /// Headless batch editor: applies a JSON edit script to an image.
    #[derive(Parser, Debug)]
    #[command(name = "retouch", version)]
    struct Args {
        /// Image to edit.
        input: PathBuf,

        /// Output PNG file, or a directory to write `edited-image.png` into.
        output: PathBuf,

        /// JSON edit script (an array of operations).
        #[arg(short, long, value_name = "SCRIPT.json")]
        script: Option<PathBuf>,

        /// Editor configuration. Defaults to the per-user config file if present.
        #[arg(short, long, value_name = "CONFIG.json")]
        config: Option<PathBuf>,
    }

    fn read(path: &Path) -> Result<String, CliError> {
        std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn run() -> Result<(), CliError> {
        let args = Args::parse();

        let config = match &args.config {
            Some(path) => EditorConfig::load_from_path(path)?,
            None => EditorConfig::load_from_default_path().unwrap_or_default(),
        };

        env_logger::Builder::new()
            .filter_level(config.log_level.to_level_filter())
            .parse_default_env()
            .init();

        let mut editor = Editor::new(&config);
        editor.load_image(args.input.to_string_lossy());
        editor.pump();
        if editor.scene().objects().is_empty() {
            return Err(CliError::NoImage(args.input));
        }

        if let Some(path) = &args.script {
            let ops = parse_script(&read(path)?)?;
            let applied = run_script(&mut editor, &ops);
            log::info!("Applied {} of {} operations", applied, ops.len());
        }

        let target = default_target(editor.scene()).ok_or(CliError::NoImage(args.input))?;
        let png = editor.export_image(target)?;
        let output = if args.output.is_dir() {
            args.output.join(EXPORT_FILE_NAME)
        } else {
            args.output
        };
        std::fs::write(&output, png).map_err(|source| CliError::Io {
            path: output.clone(),
            source,
        })?;
        log::info!("Wrote {:?}", output);
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = cli::run() {
        eprintln!("retouch: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
