#[macro_use]
extern crate prettytable;

use anyhow::Result;
use clap::{Command, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Generator, Shell};
use clap_verbosity_flag::Verbosity;
use colored_json::to_colored_json_auto;
use console::style;
use gitlab_admin::gitlab::instance_variables::{
    CreateInstanceVariableOptions, InstanceVariable, UpdateInstanceVariableOptions, VariableType,
};
use gitlab_admin::gitlab::{self, InstanceVariables, SidekiqMetrics};
use gitlab_admin::settings::{Overrides, Settings};
use gitlab_admin::{ListOptions, RequestOption};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tracing_log::AsTrace;

mod table;

#[derive(Debug, Parser)]
#[command(name = "gitlab-admin", author, version, about, long_about = None)] // Read from `Cargo.toml`
struct Cli {
    // If provided, outputs the completion file for given shell
    #[arg(long = "generate", value_enum)]
    generator: Option<Shell>,
    /// YAML settings file, `~/.config/gitlab-admin/config.yaml` by default.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,
    #[arg(long, env = "GITLAB_HOST", value_hint = clap::ValueHint::Url)]
    host: Option<String>,
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Run requests as this user (needs an admin token).
    #[arg(long, global = true)]
    sudo: Option<String>,
    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,
    #[command(flatten)]
    verbose: Verbosity,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Instance level CI/CD variables.
    #[command(subcommand)]
    Variables(VariableCommands),

    /// Sidekiq queue, process and job metrics.
    #[command(subcommand)]
    Sidekiq(SidekiqCommands),
}

#[derive(Debug, Subcommand)]
enum VariableCommands {
    #[command()]
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
        /// Keep requesting pages until the last one.
        #[arg(short, long, conflicts_with = "page")]
        all: bool,
    },

    #[command()]
    Get { key: String },

    #[command()]
    Create {
        key: String,
        value: String,
        /// `env_var`, `file`, or another type the server accepts.
        #[arg(long)]
        variable_type: Option<VariableType>,
        #[arg(long)]
        protected: bool,
        #[arg(long)]
        masked: bool,
        #[arg(long)]
        raw: bool,
        #[arg(long)]
        description: Option<String>,
    },

    #[command()]
    Update {
        key: String,
        #[arg(long)]
        value: Option<String>,
        #[arg(long)]
        variable_type: Option<VariableType>,
        #[arg(long)]
        protected: Option<bool>,
        #[arg(long)]
        masked: Option<bool>,
        #[arg(long)]
        raw: Option<bool>,
        #[arg(long)]
        description: Option<String>,
    },

    #[command()]
    Delete { key: String },
}

#[derive(Debug, Subcommand)]
enum SidekiqCommands {
    Queues,
    Processes,
    Jobs,
    Compound,
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    #[cfg(windows)]
    let _enabled = colored_json::enable_ansi_support();

    println!("{}", serde_json::to_value(value).and_then(|v| to_colored_json_auto(&v))?);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbose.log_level_filter().as_trace())
        .with_writer(io::stderr)
        .init();

    if let Some(generator) = cli.generator {
        let mut cmd = Cli::command();
        eprintln!("Generating completion file for {generator:?}...");
        print_completions(generator, &mut cmd);

        return Ok(());
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let overrides = Overrides {
        host: cli.host,
        auth_token: cli.token,
    };
    let settings = Settings::load(cli.config.as_deref(), &overrides)?;
    let gitlab = gitlab::Client::new(&settings.gitlab)?;

    let options: Vec<RequestOption> = cli.sudo.into_iter().map(RequestOption::sudo).collect();

    match command {
        Commands::Variables(command) => run_variables(&gitlab, command, &options, cli.json).await,
        Commands::Sidekiq(command) => run_sidekiq(&gitlab, command, &options, cli.json).await,
    }
}

async fn run_variables(
    gitlab: &gitlab::Client<'_>,
    command: VariableCommands,
    options: &[RequestOption],
    json: bool,
) -> Result<()> {
    let service = gitlab.instance_variables();

    let variables: Vec<InstanceVariable> = match command {
        VariableCommands::List { page, per_page, all } => {
            let mut opt = ListOptions { page, per_page };
            let mut variables = Vec::new();

            loop {
                let page = service.list_variables(&opt, options).await?;
                let next_page = page.pagination.next_page;
                variables.extend(page.items);

                match next_page {
                    Some(next) if all => opt.page = Some(next),
                    _ => break,
                }
            }

            variables
        }

        VariableCommands::Get { key } => vec![service.get_variable(&key, options).await?],

        VariableCommands::Create {
            key,
            value,
            variable_type,
            protected,
            masked,
            raw,
            description,
        } => {
            let mut builder = CreateInstanceVariableOptions::builder();
            builder.key(key).value(value);

            if let Some(variable_type) = variable_type {
                builder.variable_type(variable_type);
            }
            if let Some(description) = description {
                builder.description(description);
            }
            if protected {
                builder.protected(true);
            }
            if masked {
                builder.masked(true);
            }
            if raw {
                builder.raw(true);
            }

            vec![service.create_variable(&builder.build()?, options).await?]
        }

        VariableCommands::Update {
            key,
            value,
            variable_type,
            protected,
            masked,
            raw,
            description,
        } => {
            let opt = UpdateInstanceVariableOptions {
                value,
                description,
                masked,
                protected,
                raw,
                variable_type,
            };

            vec![service.update_variable(&key, &opt, options).await?]
        }

        VariableCommands::Delete { key } => {
            service.remove_variable(&key, options).await?;

            println!("{}", style(format!("✔ {key} deleted")).green().italic());
            return Ok(());
        }
    };

    if json {
        print_json(&variables)
    } else {
        table::variables(&variables).printstd();
        Ok(())
    }
}

async fn run_sidekiq(
    gitlab: &gitlab::Client<'_>,
    command: SidekiqCommands,
    options: &[RequestOption],
    json: bool,
) -> Result<()> {
    let sidekiq = gitlab.sidekiq();

    match command {
        SidekiqCommands::Queues => {
            let metrics = sidekiq.get_queue_metrics(options).await?;

            if json {
                return print_json(&metrics);
            }
            table::queues(&metrics).printstd();
        }

        SidekiqCommands::Processes => {
            let metrics = sidekiq.get_process_metrics(options).await?;

            if json {
                return print_json(&metrics);
            }
            table::processes(&metrics).printstd();
        }

        SidekiqCommands::Jobs => {
            let stats = sidekiq.get_job_stats(options).await?;

            if json {
                return print_json(&stats);
            }
            table::jobs(&stats).printstd();
        }

        SidekiqCommands::Compound => {
            let compound = sidekiq.get_compound_metrics(options).await?;

            if json {
                return print_json(&compound);
            }
            println!("{}", style("Queues").bold());
            table::queues(&compound.queue_metrics).printstd();
            println!("{}", style("Processes").bold());
            table::processes(&compound.process_metrics).printstd();
            println!("{}", style("Jobs").bold());
            table::jobs(&compound.job_stats).printstd();
        }
    }

    Ok(())
}
