use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use feed::domain::ports::TracingEventPublisher;
use feed::gateways::local::ServiceSearchFetcher;
use feed::gateways::sim::{SimFeedClient, SimUsersClient};
use feed::model::UserDetails;
use feed::{FeedConfig, FeedService, FeedState, ServiceConfig};
use flowkit::{
    wait_for_shutdown, PipelineConfig, QueryRules, RetryPolicy, SearchPipeline, TaskScope,
};
use runtime::AppConfig;

/// Feedscope - debounced search and resilient fetch demo
#[derive(Parser)]
#[command(name = "feedscope")]
#[command(about = "Feedscope - debounced search and resilient fetch demo")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive demo
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_layered(cli.config.as_deref())?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let mut logging = config
        .logging
        .clone()
        .unwrap_or_else(runtime::default_logging_config);
    runtime::apply_verbosity(&mut logging, cli.verbose);
    runtime::init_logging_from_config(&logging, &config.home_dir());

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Check => check(&config),
        Commands::Run => run(config).await,
    }
}

fn check(config: &AppConfig) -> Result<()> {
    let feed_config: FeedConfig = config.module_config("feed")?;
    tracing::info!(?feed_config, "configuration OK");
    println!("configuration OK");
    Ok(())
}

fn build_service(feed_config: &FeedConfig) -> Arc<FeedService> {
    let users = Arc::new(SimUsersClient::new(
        feed_config.users.latency,
        feed_config.users.failure_probability,
    ));
    let posts = Arc::new(SimFeedClient::new(
        feed_config.sim.details_latency,
        feed_config.sim.posts_latency,
        feed_config.search_latency,
        feed_config.sim.fail_details,
        feed_config.sim.fail_posts,
    ));
    Arc::new(FeedService::new(
        users,
        posts,
        Arc::new(TracingEventPublisher),
        ServiceConfig {
            retry: RetryPolicy {
                max_retries: feed_config.users.max_retries,
                delay: feed_config.users.retry_delay,
            },
            return_fallback_on_exhaustion: feed_config.users.return_fallback_on_exhaustion,
        },
    ))
}

fn usernames(users: &[UserDetails]) -> String {
    users
        .iter()
        .map(|u| u.username.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

async fn run(config: AppConfig) -> Result<()> {
    let feed_config: FeedConfig = config.module_config("feed")?;
    let service = build_service(&feed_config);
    let state = Arc::new(FeedState::new());
    let scope = TaskScope::new();

    // Startup fan-in load: posts become the search corpus and first results.
    state.set_loading(true);
    let combined = service.load_combined().await;
    state.set_loading(false);
    let initial_posts = state.apply_combined(combined).unwrap_or_default();
    if initial_posts.is_empty() {
        println!("errors: {}", state.error_text());
    } else {
        println!("loaded {} posts", initial_posts.len());
    }

    let pipeline = SearchPipeline::spawn(
        &scope,
        PipelineConfig {
            quiet_window: feed_config.quiet_window,
            rules: QueryRules {
                min_len: feed_config.min_query_len,
                reject_embedded_space: feed_config.reject_embedded_space,
            },
        },
        Arc::new(ServiceSearchFetcher::new(service.clone())),
        initial_posts,
    );

    // Presentation task: prints result lists and search activity as they change.
    {
        let mut results = pipeline.results();
        let mut loading = pipeline.loading();
        scope.spawn("result-printer", move |cancel| async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = results.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let titles: Vec<String> =
                            results.borrow().iter().map(|p| p.title.clone()).collect();
                        println!("results ({}): {}", titles.len(), titles.join(" | "));
                    }
                    changed = loading.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if *loading.borrow() {
                            println!("searching...");
                        }
                    }
                }
            }
            Ok(())
        });
    }

    println!("type to search; ':users' fetches users; ':state' prints state; ':quit' exits");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutdown signal received");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    ":quit" => break,
                    ":state" => print_state(&state, &pipeline),
                    ":users" => {
                        let service = service.clone();
                        let state = state.clone();
                        scope.spawn("users-fetch", move |_cancel| async move {
                            state.set_button_loading(true);
                            let result = service.fetch_users().await;
                            state.set_button_loading(false);
                            match &result {
                                Ok(users) => println!("users: {}", usernames(users)),
                                Err(e) => println!("users fetch failed: {e}"),
                            }
                            state.apply_users(result);
                            Ok(())
                        });
                    }
                    query => pipeline.submit(query),
                }
            }
        }
    }

    scope
        .stop(Duration::from_secs(config.app.stop_timeout_sec))
        .await;
    Ok(())
}

fn print_state(state: &FeedState, pipeline: &SearchPipeline<feed::model::UserPost>) {
    println!(
        "loading: {}",
        *state.loading().borrow() || *pipeline.loading().borrow()
    );
    println!("button loading: {}", *state.button_loading().borrow());
    println!("details seen: {}", state.details_seen().len());
    match state.users() {
        Some(users) => println!("users: {}", usernames(&users)),
        None => println!("users: <none>"),
    }
    if let Some(e) = state.users_error() {
        println!("users error: {e}");
    }
    let errors = state.error_text();
    if !errors.is_empty() {
        println!("errors: {errors}");
    }
}
