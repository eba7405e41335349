use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gitdash::models::{DashboardView, Section};
use gitdash::{Config, DashboardService, GitHubClient, SessionContext};

#[derive(Parser, Debug)]
#[command(name = "gitdash")]
#[command(version = "0.1.0")]
#[command(about = "Personal GitHub account dashboard")]
struct Args {
    /// GitHub account handle to load the dashboard for
    #[arg(short, long)]
    username: String,

    /// Output format (json, text)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a repository and refresh the repository list
    CreateRepo {
        name: String,

        /// Free-text description shown on the dashboard card
        #[arg(short, long)]
        description: String,

        /// Create as a private repository
        #[arg(long)]
        private: bool,
    },
    /// Delete an owned repository (refused unless the token owns it)
    DeleteRepo { name: String },
    /// Flip a repository between public and private
    SetVisibility {
        name: String,

        #[arg(long)]
        private: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gitdash=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    let ctx = SessionContext::new(args.username.clone(), config.github_token.clone())?;
    let client = GitHubClient::new(ctx.token(), config.base_url.clone())?;
    let service = DashboardService::new(client, ctx, config.concurrency_limit);

    match &args.command {
        Some(Command::CreateRepo {
            name,
            description,
            private,
        }) => match service.create_repository(name, description, *private).await {
            Ok(created) => println!("Repository {} created successfully", created.name),
            Err(err) => fail(&format!("Failed to create repository: {}", err)),
        },
        Some(Command::DeleteRepo { name }) => match service.delete_repository(name).await {
            Ok(()) => println!("Repository deleted successfully"),
            Err(err) => fail(&format!("Failed to delete repository: {}", err)),
        },
        Some(Command::SetVisibility { name, private }) => {
            match service.set_repository_visibility(name, *private).await {
                Ok(updated) => println!(
                    "Repository is now {}",
                    if updated.private { "private" } else { "public" }
                ),
                Err(err) => fail(&format!("Failed to update repository visibility: {}", err)),
            }
        }
        None => {
            let view = service.load().await?;
            output_dashboard(&view, &args)?;
        }
    }

    Ok(())
}

fn fail(notice: &str) -> ! {
    eprintln!("{}", notice);
    std::process::exit(1);
}

fn output_dashboard(view: &DashboardView, args: &Args) -> anyhow::Result<()> {
    let output = match args.format.as_str() {
        "json" => serde_json::to_string_pretty(view)?,
        _ => format_text(view),
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output)?;
        tracing::info!("Output written to: {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_text(view: &DashboardView) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n=== Dashboard: {} ===\n\n", view.profile.login));

    if let Some(ref name) = view.profile.name {
        output.push_str(&format!("Name: {}\n", name));
    }
    if let Some(ref bio) = view.profile.bio {
        output.push_str(&format!("Bio: {}\n", bio));
    }
    output.push_str(&format!(
        "Followers: {}  Following: {}\n",
        view.profile.followers, view.profile.following
    ));

    match &view.repositories {
        Section::Ready(repos) => {
            output.push_str(&format!("\nRepositories ({}):\n", repos.len()));
            for repo in repos {
                output.push_str(&format!(
                    "  {} {}  ★ {}  ⑂ {}\n",
                    repo.name,
                    if repo.private { "(private)" } else { "" },
                    repo.stargazers_count,
                    repo.forks_count
                ));
                if let Some(ref description) = repo.description {
                    output.push_str(&format!("    {}\n", description));
                }
                output.push_str(&format!("    Last commit: {}\n", repo.last_commit));
                if !repo.languages.is_empty() {
                    let shares: Vec<String> = repo
                        .languages
                        .iter()
                        .map(|s| format!("{} {:.1}%", s.language, s.percentage))
                        .collect();
                    output.push_str(&format!("    Languages: {}\n", shares.join(", ")));
                }
            }
        }
        section => push_section_notice(&mut output, "Repositories", section.error()),
    }

    match &view.languages {
        Section::Ready(distribution) => {
            output.push_str("\nLanguages (bytes across all repositories):\n");
            for (language, bytes) in distribution {
                output.push_str(&format!("  {}: {}\n", language, bytes));
            }
        }
        section => push_section_notice(&mut output, "Languages", section.error()),
    }

    match &view.followers {
        Section::Ready(followers) => output.push_str(&format!(
            "\nFollowers ({}): {}\n",
            followers.len(),
            logins(followers.iter().map(|f| f.login.as_str()))
        )),
        section => push_section_notice(&mut output, "Followers", section.error()),
    }
    match &view.following {
        Section::Ready(following) => output.push_str(&format!(
            "Following ({}): {}\n",
            following.len(),
            logins(following.iter().map(|f| f.login.as_str()))
        )),
        section => push_section_notice(&mut output, "Following", section.error()),
    }

    match &view.activity {
        Section::Ready(events) => {
            output.push_str("\nRecent activity:\n");
            for event in events {
                output.push_str(&format!(
                    "  {} on {} at {}\n",
                    event.kind,
                    event.repo.name,
                    event.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                ));
            }
        }
        section => push_section_notice(&mut output, "Activity", section.error()),
    }

    output
}

fn push_section_notice(output: &mut String, label: &str, error: Option<&str>) {
    match error {
        Some(message) => output.push_str(&format!("\n{}: unavailable ({})\n", label, message)),
        None => output.push_str(&format!("\n{}: still loading\n", label)),
    }
}

fn logins<'a>(entries: impl Iterator<Item = &'a str>) -> String {
    entries.collect::<Vec<_>>().join(", ")
}
