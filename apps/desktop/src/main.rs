use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{
    controller::{CategoryFilter, GenerationMode, MacroListItem, VersionPanel},
    load_settings, DirectoryArtifactSink, HttpMacroApi, Intent, MacroController, MacroSession,
};
use shared::domain::{MacroCategory, MacroId};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "macro-studio", about = "Browse, share, and generate spreadsheet macros")]
struct Args {
    /// Settings file; defaults to ./macro_studio.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[arg(long, global = true)]
    download_dir: Option<PathBuf>,
    /// Only list macros that are shared publicly.
    #[arg(long, global = true)]
    public_only: bool,
    /// Print JSON instead of a table.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// List macros, optionally restricted to one category.
    List {
        #[arg(long)]
        category: Option<MacroCategory>,
    },
    /// List templates usable with `generate --template`.
    Templates,
    Generate(GenerateArgs),
    /// Download a stored macro as macro.xlsx.
    Download { id: i64 },
    /// Change whether a macro is shared.
    Share {
        id: i64,
        #[arg(long, conflicts_with = "private")]
        public: bool,
        #[arg(long)]
        private: bool,
    },
    /// Show the version history of a macro.
    Versions { id: i64 },
}

/// Generate a new macro and save it as generated_macro.xlsx.
#[derive(ClapArgs, Debug)]
struct GenerateArgs {
    /// Describe the macro and let the AI engine write it.
    #[arg(long, requires = "description", conflicts_with = "template")]
    ai: bool,
    #[arg(long, conflicts_with = "template")]
    description: Option<String>,
    /// Base the macro on a stored template. Template macros are always
    /// categorised TEMPLATE.
    #[arg(long)]
    template: Option<i64>,
    #[arg(long)]
    category: Option<MacroCategory>,
}

type Session = MacroSession<HttpMacroApi, DirectoryArtifactSink>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref()).context("loading settings")?;
    settings
        .apply_overrides(args.server_url, args.download_dir, args.public_only)
        .context("applying command-line overrides")?;
    tracing::info!(server_url = %settings.server_url, "using backend");

    let api = HttpMacroApi::with_timeout(&settings.server_url, settings.request_timeout())
        .context("building http client")?;
    let sink = DirectoryArtifactSink::new(&settings.download_dir);
    let mut session = MacroSession::new(MacroController::new(settings.public_only), api, sink);

    match args.command {
        CliCommand::List { category } => {
            session.dispatch(Intent::Initialize).await;
            if let Some(category) = category {
                session
                    .dispatch(Intent::SelectCategoryTab(CategoryFilter::Only(category)))
                    .await;
            }
            finish(&mut session)?;
            print_list(&session.controller().rendered_list(), args.json)?;
        }
        CliCommand::Templates => {
            session.dispatch(Intent::Initialize).await;
            finish(&mut session)?;
            for template in session.controller().templates() {
                println!("{:>6}  {}", template.id.0, template.title);
            }
        }
        CliCommand::Generate(generate) => {
            session.dispatch(Intent::Initialize).await;
            let mode = generation_mode(&generate)?;
            session.dispatch(Intent::SetMode(mode)).await;
            if let Some(description) = generate.description {
                session.dispatch(Intent::EditDescription(description)).await;
            }
            if let Some(template) = generate.template {
                session
                    .dispatch(Intent::SelectTemplate(Some(MacroId(template))))
                    .await;
            }
            if let Some(category) = generate.category {
                session.dispatch(Intent::SelectCategory(Some(category))).await;
            }
            session.dispatch(Intent::Generate).await;
            finish(&mut session)?;
            print_download(&session);
        }
        CliCommand::Download { id } => {
            session.dispatch(Intent::Download(MacroId(id))).await;
            finish(&mut session)?;
            print_download(&session);
        }
        CliCommand::Share {
            id,
            public,
            private,
        } => {
            if public == private {
                bail!("pass exactly one of --public or --private");
            }
            session
                .dispatch(Intent::ToggleShare {
                    macro_id: MacroId(id),
                    is_public: public,
                })
                .await;
            finish(&mut session)?;
            println!(
                "macro {id} is now {}",
                if public { "public" } else { "private" }
            );
        }
        CliCommand::Versions { id } => {
            session.dispatch(Intent::ShowVersionHistory(MacroId(id))).await;
            finish(&mut session)?;
            match session.controller().version_panel() {
                VersionPanel::Shown { entries, .. } => {
                    for entry in entries {
                        println!("== {} ({})", entry.heading, entry.date_label);
                        println!("{}\n", entry.content);
                    }
                }
                VersionPanel::Hidden => bail!("could not load version history for macro {id}"),
            }
        }
    }

    Ok(())
}

/// Template mode locks the description and category, so flags that would be
/// dropped are rejected up front.
fn generation_mode(args: &GenerateArgs) -> Result<GenerationMode> {
    if args.ai || args.template.is_none() {
        return Ok(GenerationMode::Ai);
    }
    match args.category {
        Some(category) if category != MacroCategory::Template => bail!(
            "template macros are always categorised TEMPLATE; drop --category {category}"
        ),
        _ => Ok(GenerationMode::Template),
    }
}

/// Turns queued alerts into a non-zero exit.
fn finish(session: &mut Session) -> Result<()> {
    let alerts = session.controller_mut().take_alerts();
    if alerts.is_empty() {
        return Ok(());
    }
    let messages: Vec<_> = alerts.into_iter().map(|alert| alert.message).collect();
    bail!(messages.join("\n"))
}

fn print_download(session: &Session) {
    if let Some(path) = session.controller().last_download() {
        println!("saved {}", path.display());
    }
}

fn print_list(items: &[MacroListItem], json: bool) -> Result<()> {
    if json {
        let rows: Vec<_> = items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "id": item.id,
                    "date": item.date_label,
                    "category": item.category,
                    "title": item.title,
                    "summary": item.summary,
                    "is_public": item.is_public,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for item in items {
        println!(
            "{:>6}  {}  [{}]  {}{}",
            item.id.0,
            item.date_label,
            item.badge_label,
            item.title,
            if item.is_public { "" } else { "  (private)" }
        );
        if !item.summary.is_empty() {
            println!("        {}", item.summary);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_args(argv: &[&str]) -> Result<GenerateArgs, clap::Error> {
        let mut full = vec!["macro-studio", "generate"];
        full.extend_from_slice(argv);
        match Args::try_parse_from(full)?.command {
            CliCommand::Generate(args) => Ok(args),
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn ai_generation_takes_description_and_category() {
        let args = generate_args(&["--ai", "--description", "sum rows", "--category", "custom"])
            .expect("parse");
        assert_eq!(generation_mode(&args).expect("mode"), GenerationMode::Ai);
        assert_eq!(args.category, Some(MacroCategory::Custom));
    }

    #[test]
    fn template_generation_rejects_flags_it_would_drop() {
        assert!(generate_args(&["--template", "3", "--description", "ignored"]).is_err());

        let args = generate_args(&["--template", "3", "--category", "REPORTING"]).expect("parse");
        assert!(generation_mode(&args).is_err());

        let args = generate_args(&["--template", "3", "--category", "TEMPLATE"]).expect("parse");
        assert_eq!(generation_mode(&args).expect("mode"), GenerationMode::Template);
    }
}
