use std::env;
use std::path::PathBuf;

use clap::Parser;

use git_ship::branch::Channel;
use git_ship::cache::CredentialStore;
use git_ship::context::RepositoryContext;
use git_ship::git::Git2Backend;
use git_ship::host;
use git_ship::prompt::{Prompt, TermPrompt};
use git_ship::publish::CosBuilder;
use git_ship::ui;
use git_ship::workflow::{RefreshFlags, Workflow};

#[derive(clap::Parser)]
#[command(
    name = "git-ship",
    about = "Prepare, commit and publish a local project to a hosted git remote"
)]
struct Args {
    #[arg(short, long, help = "Project directory (defaults to the current directory)")]
    dir: Option<PathBuf>,

    #[arg(long, help = "Override the cache root directory")]
    cache_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Resolve credentials, ensure the remote repository exists and
    /// initialize local git state
    Prepare {
        #[arg(long, help = "Re-prompt for the hosting platform")]
        refresh_server: bool,

        #[arg(long, help = "Re-prompt for the access token")]
        refresh_token: bool,

        #[arg(long, help = "Re-prompt for the owning account")]
        refresh_owner: bool,
    },

    /// Commit pending changes and synchronize the versioned working branch
    Commit {
        #[arg(short, long, help = "Semantic version for the working branch")]
        version: Option<String>,

        #[arg(long, help = "Use the release channel instead of dev")]
        release: bool,
    },

    /// Hand the project off to the configured publish pipeline
    Publish {
        #[arg(long, help = "Re-prompt for the publish target")]
        refresh_publisher: bool,

        #[arg(long, help = "Build for production instead of preview")]
        prod: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Err(e) = run(args) {
        ui::display_error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: Args) -> git_ship::Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };

    let store = CredentialStore::open(args.cache_root)?;
    let prompt = TermPrompt::new();
    let mut ctx = RepositoryContext::new(&dir);

    let refresh = match &args.command {
        Command::Prepare {
            refresh_server,
            refresh_token,
            refresh_owner,
        } => RefreshFlags {
            server: *refresh_server,
            token: *refresh_token,
            owner: *refresh_owner,
            publisher: false,
        },
        Command::Publish { refresh_publisher, .. } => RefreshFlags {
            publisher: *refresh_publisher,
            ..Default::default()
        },
        Command::Commit { .. } => RefreshFlags::default(),
    };

    // The version is only meaningful for commit; ask before handing the
    // prompt to the workflow.
    if let Command::Commit { version, .. } = &args.command {
        ctx.version = match version {
            Some(version) => version.clone(),
            None => prompt.input("Project version", Some("0.1.0"))?,
        };
    }

    let mut workflow = Workflow::new(
        ctx,
        store,
        refresh,
        Box::new(Git2Backend::open(&dir)),
        Box::new(prompt),
        Box::new(host::client_for),
    );

    match args.command {
        Command::Prepare { .. } => workflow.prepare(),
        Command::Commit { release, .. } => {
            let channel = if release {
                Channel::Release
            } else {
                Channel::Dev
            };
            workflow.commit(channel)
        }
        Command::Publish { prod, .. } => {
            workflow
                .publish(prod, |ctx, target, production| {
                    Box::new(CosBuilder::new(ctx, target, production))
                })
                .map(|_| ())
        }
    }
}
