use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jobflow")]
#[command(about = "Job-seeker client: documents, applications and profile suggestions", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $JOBFLOW_CONFIG or config/jobflow.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a CV and cover letter for a job posting
    Generate(GenerateArgs),
    /// Apply to a job posting
    Apply(ApplyArgs),
    /// Get suggestions for improving a profile
    UpdateProfile(UpdateProfileArgs),
    /// Download one generated artifact by its identifier
    Download(DownloadArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub skills: String,
    #[arg(long)]
    pub experience: String,
    #[arg(long)]
    pub education: String,
    #[arg(long)]
    pub job_description: String,
    #[arg(long)]
    pub linkedin_profile_url: Option<String>,

    /// Download both generated documents after generation
    #[arg(long)]
    pub save: bool,

    /// Where to save documents (overrides [downloads] directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// URL of the job posting
    pub job_url: String,
}

#[derive(Args, Debug)]
pub struct UpdateProfileArgs {
    /// URL of the profile to review
    pub profile_url: String,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Identifier returned by `generate` (cv_path or cover_letter_path)
    pub filename: String,

    /// Local file name to save as
    #[arg(long = "as", default_value = jobflow::contracts::CV_DISPLAY_NAME)]
    pub save_as: String,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}
