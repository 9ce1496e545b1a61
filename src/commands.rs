use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::{ApplyArgs, Cli, Commands, DownloadArgs, GenerateArgs, UpdateProfileArgs};
use jobflow::Session;
use jobflow::config::Config;
use jobflow::contracts::{CandidateProfile, JobApplicationRequest, ProfileUpdateRequest};
use jobflow::notify::TracingSink;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(cli: Cli) -> Result<(), AnyError> {
    let mut config = Config::load_with(cli.config)?;
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url)?;
    }

    if let Commands::Config = cli.command {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let output_dir = match &cli.command {
        Commands::Generate(args) => args.output_dir.clone(),
        Commands::Download(args) => args.output_dir.clone(),
        _ => None,
    };
    if let Some(directory) = output_dir {
        config = config.with_download_directory(directory)?;
    }

    let session = Session::connect(config, Arc::new(TracingSink::new()))?;
    let cancel = interrupt_token();

    match cli.command {
        Commands::Generate(args) => generate(&session, args, cancel).await?,
        Commands::Apply(args) => apply(&session, args, cancel).await?,
        Commands::UpdateProfile(args) => update_profile(&session, args, cancel).await?,
        Commands::Download(args) => download(&session, args, cancel).await?,
        Commands::Config => {}
    }

    debug!(metrics = ?session.metrics().snapshot(), "Done");
    Ok(())
}

async fn generate(session: &Session, args: GenerateArgs, cancel: CancellationToken) -> Result<(), AnyError> {
    let profile = CandidateProfile::builder()
        .name(args.name)
        .email(args.email)
        .phone(args.phone)
        .skills(args.skills)
        .experience(args.experience)
        .education(args.education)
        .job_description(args.job_description)
        .maybe_linkedin_profile_url(args.linkedin_profile_url)
        .build();

    let documents = session
        .generate_documents()
        .submit_with_cancel(profile, cancel.clone())
        .await?;

    println!("CV ({}):\n{}\n", documents.cv_path, documents.cv_preview);
    println!(
        "Cover letter ({}):\n{}",
        documents.cover_letter_path, documents.cover_letter_preview
    );

    if args.save {
        let downloads = session.downloads();
        for artifact in documents.artifacts() {
            let path = downloads
                .download_with_cancel(&artifact, cancel.clone())
                .await?;
            println!("Saved {}", path.display());
        }
    }

    Ok(())
}

async fn apply(session: &Session, args: ApplyArgs, cancel: CancellationToken) -> Result<(), AnyError> {
    let result = session
        .apply_to_job()
        .submit_with_cancel(JobApplicationRequest::new(args.job_url), cancel)
        .await?;

    println!("{}", result.message);
    Ok(())
}

async fn update_profile(
    session: &Session,
    args: UpdateProfileArgs,
    cancel: CancellationToken,
) -> Result<(), AnyError> {
    let result = session
        .update_profile()
        .submit_with_cancel(ProfileUpdateRequest::new(args.profile_url), cancel)
        .await?;

    println!("{}\n\n{}", result.message, result.profile_suggestions);
    Ok(())
}

async fn download(session: &Session, args: DownloadArgs, cancel: CancellationToken) -> Result<(), AnyError> {
    let path = session
        .downloads()
        .download_as_with_cancel(&args.filename, &args.save_as, cancel)
        .await?;

    println!("Saved {}", path.display());
    Ok(())
}

/// Cancelled on Ctrl+C
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            trigger.cancel();
        }
    });

    token
}
