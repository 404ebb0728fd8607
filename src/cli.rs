use bcexport::host::ExportSelection;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bcexport")]
#[command(
    about = "Generate buffer compression files for sequence cameras",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Which cameras of the scene to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CameraSelection {
    Current,
    Selected,
    All,
}

impl From<CameraSelection> for ExportSelection {
    fn from(value: CameraSelection) -> Self {
        match value {
            CameraSelection::Current => ExportSelection::CurrentCamera,
            CameraSelection::Selected => ExportSelection::SelectedCameras,
            CameraSelection::All => ExportSelection::AllCameras,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export buffer compression files for the chosen cameras
    Export {
        /// Scene description (JSON)
        scene: PathBuf,

        /// Cameras to export (interactive mode asks when omitted)
        #[arg(long, value_enum)]
        cameras: Option<CameraSelection>,

        /// Show progress and errors in dialogs instead of on the console
        #[arg(long)]
        interactive: bool,

        /// Don't write imported buffer compression files back to the scene
        #[arg(long)]
        no_save: bool,
    },

    /// Show the jobs and step budget of an export without running it
    Plan {
        scene: PathBuf,

        #[arg(long, value_enum, default_value = "current")]
        cameras: CameraSelection,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show makeBCFile commands without executing (dry run)
    DryRun {
        scene: PathBuf,

        #[arg(long, value_enum, default_value = "current")]
        cameras: CameraSelection,
    },

    /// Check that the compression tool is installed and executable
    CheckTool {
        /// Installation root (defaults to the config's install_path)
        #[arg(long)]
        install_path: Option<PathBuf>,
    },

    /// Open an empty window driven by a UI timer until q is pressed
    SmokeTest {
        /// Timer interval in milliseconds
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
    },

    /// Show config status and location, or create default config if missing
    InitConfig,
}

impl Cli {
    /// Whether this command runs a full-screen UI, leaving no room for log
    /// output on stderr
    pub fn owns_terminal(&self) -> bool {
        matches!(
            self.command,
            Commands::Export {
                interactive: true,
                ..
            } | Commands::SmokeTest { .. }
        )
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
