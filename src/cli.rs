use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "connectome-ctl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Orchestrate neuroimaging processing steps over FSL and MRtrix")]
#[command(
    long_about = "A command-line tool that drives neuroimaging processing pipelines \
(reorientation, masking, b=0 extraction, registration, TBSS staging) by shelling out \
to pre-installed FSL and MRtrix toolchains, with JSON run logs for every step."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the FSL environment init script
    #[arg(long, global = true, value_name = "FILE")]
    pub fsl_init: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reorient an image to the approximate MNI152 orientation
    Reorient {
        /// The image to reorient
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// The reoriented output image root
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Apply a binary mask to an image
    Mask {
        /// The image to mask
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// The mask image (voxels > 0 are kept)
        #[arg(value_name = "MASK")]
        mask: PathBuf,

        /// Root name of the masked output image
        #[arg(value_name = "OUTROOT")]
        outroot: PathBuf,
    },

    /// Extract b=0 volumes from a DWI series and compute their mean
    Bzero {
        /// The diffusion-weighted image
        #[arg(value_name = "DWI")]
        dwi: PathBuf,

        /// Output file for the extracted b=0 volumes
        #[arg(value_name = "B0S")]
        b0s: PathBuf,

        /// Output file for the mean b=0 volume
        #[arg(value_name = "MEAN_B0")]
        mean: PathBuf,

        /// Number of threads MRtrix may use (overrides config)
        #[arg(long, value_name = "N")]
        nb_threads: Option<u32>,
    },

    /// Register an image to a reference
    Register {
        /// The image to register
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// The reference image
        #[arg(value_name = "REFERENCE")]
        reference: PathBuf,

        /// Directory for transforms and warped images
        #[arg(short, long, value_name = "OUTPUT_DIR")]
        outdir: PathBuf,

        /// Degrees of freedom for the affine transform
        #[arg(long, default_value_t = 12)]
        dof: u32,

        /// FLIRT cost function
        #[arg(long, default_value = "corratio")]
        cost: String,

        /// Follow the affine step with non-linear FNIRT refinement
        #[arg(long)]
        non_linear: bool,
    },

    /// Run the FSL TBSS stages over a set of FA maps
    Tbss {
        /// FA maps to process (one per subject)
        #[arg(value_name = "FA_MAP", required = true, num_args = 1..)]
        fa_maps: Vec<PathBuf>,

        /// Working directory the TBSS stages run in
        #[arg(short, long, value_name = "WORK_DIR")]
        workdir: PathBuf,

        /// Skeletonisation threshold for tbss_4_prestats
        #[arg(long, default_value_t = 0.2)]
        threshold: f64,
    },

    /// Inspect the external toolchains the pipelines depend on
    Tools {
        #[command(subcommand)]
        command: ToolsCommand,
    },
}

#[derive(Subcommand)]
pub enum ToolsCommand {
    /// Report availability and versions of the required external tools
    Status {
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
