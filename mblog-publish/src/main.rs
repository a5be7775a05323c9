//! mblog - Mini Blogs publisher CLI
//!
//! Publishes articles through the pinning gateway and records them on chain
//! through a JSON-RPC wallet.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use mblog_common::config::{self, load_toml_config};
use mblog_common::store::SqliteStore;
use mblog_common::{ArticleDraft, PublishedArticle};
use mblog_publish::chain::{
    ensure_network, JsonRpcClient, NetworkMonitor, NetworkStatus, RpcArticleContract, RpcWallet,
    WalletProvider,
};
use mblog_publish::config::{ClientConfig, ClientOverrides};
use mblog_publish::scorer::{self, ScoreInput};
use mblog_publish::{ArticleRepository, BlockchainSubmitter, GatewayUploader, Publisher, WalletSession};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// How often an HTTP wallet is asked for its chain
const CHAIN_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Parser)]
#[command(name = "mblog", version, about = "Publish articles to IPFS and mint them on chain")]
struct Cli {
    /// Config file (default: ~/.config/mblog/config.toml)
    #[arg(long, global = true, env = "MBLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Pinning gateway base URL
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Wallet JSON-RPC endpoint
    #[arg(long, global = true)]
    wallet_rpc_url: Option<String>,

    /// Article contract address
    #[arg(long, global = true)]
    contract_address: Option<String>,

    /// Local data folder
    #[arg(long, global = true)]
    data_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Connect the wallet and switch it to the target network
    Connect,
    /// Forget the connected wallet
    Disconnect,
    /// Show wallet, network and article state
    Status,
    /// Score an article without publishing it
    Score(ArticleArgs),
    /// Upload an article and its cover image
    Publish(ArticleArgs),
    /// Record the published article on chain
    Submit,
    /// Print the published article
    Show,
    /// Clear the published article to start a new one
    Reset,
    /// Switch the wallet to the target network
    Network {
        /// Keep running and report chain changes
        #[arg(long)]
        watch: bool,
    },
}

#[derive(Debug, ClapArgs)]
struct ArticleArgs {
    #[arg(long)]
    title: String,

    /// Article body
    #[arg(long, conflicts_with = "content_file")]
    content: Option<String>,

    /// Read the article body from a file
    #[arg(long)]
    content_file: Option<PathBuf>,

    /// Short summary (max 300 characters); derived from the body when omitted
    #[arg(long, default_value = "")]
    excerpt: String,

    #[arg(long)]
    category: String,

    /// Cover image file
    #[arg(long)]
    cover: Option<PathBuf>,
}

impl ArticleArgs {
    async fn into_draft(self) -> Result<ArticleDraft> {
        let content = match (&self.content, &self.content_file) {
            (Some(content), _) => content.clone(),
            (None, Some(path)) => read_text(path).await?,
            (None, None) => String::new(),
        };
        let cover_image = match &self.cover {
            Some(path) => Some(
                tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read cover image {}", path.display()))?,
            ),
            None => None,
        };

        Ok(ArticleDraft {
            title: self.title,
            excerpt: self.excerpt,
            content,
            category: self.category,
            cover_image,
        })
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = config::config_path(cli.config.as_deref());
    let toml_config = match load_toml_config(config_path.as_deref()) {
        Ok(toml_config) => toml_config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "mblog v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let overrides = ClientOverrides {
        backend_url: cli.backend_url.clone(),
        wallet_rpc_url: cli.wallet_rpc_url.clone(),
        contract_address: cli.contract_address.clone(),
        data_folder: cli.data_folder.clone(),
    };
    let client_config = ClientConfig::resolve(&overrides, &toml_config);

    match run(cli.command, client_config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: ClientConfig) -> Result<()> {
    let store = SqliteStore::open(&config.data_folder).await?;
    let repository = ArticleRepository::new(store.clone());

    let rpc = Arc::new(JsonRpcClient::new(&config.wallet_rpc_url)?);
    let rpc_wallet = Arc::new(RpcWallet::new(Arc::clone(&rpc)));
    let wallet: Arc<dyn WalletProvider> = rpc_wallet.clone();
    let session = WalletSession::restore(Arc::clone(&wallet), store).await?;

    match command {
        Command::Score(args) => {
            let draft = args.into_draft().await?;
            let score = scorer::score(&ScoreInput {
                title: &draft.title,
                content: &draft.content,
                category: &draft.category,
            });
            println!("Quality score: {}/100", score);
            println!("Estimated reward: {} tokens", scorer::tokens_for_score(score));
        }

        Command::Connect => {
            let address = session.connect().await?;
            println!("Connected: {}", address);
            report_network(ensure_network(wallet.as_ref(), &config.network).await?, &config);
        }

        Command::Disconnect => {
            session.disconnect().await?;
            println!("Disconnected");
        }

        Command::Status => {
            match session.address().await {
                Some(address) => {
                    println!("Wallet: {}", address);
                    match session.balance(config.network.currency_decimals).await {
                        Ok(balance) => {
                            println!("Balance: {} {}", balance, config.network.currency_symbol)
                        }
                        Err(e) => println!("Balance: unavailable ({})", e),
                    }
                }
                None => println!("Wallet: not connected"),
            }
            match wallet.chain_id().await {
                Ok(chain_id) if config.network.is_target_chain(&chain_id) => {
                    println!("Network: {} ({})", config.network.chain_name, chain_id)
                }
                Ok(chain_id) => println!(
                    "Network: {} (expected {} {})",
                    chain_id, config.network.chain_name, config.network.chain_id
                ),
                Err(e) => println!("Network: unavailable ({})", e),
            }
            match repository.load().await? {
                Some(article) => print_summary(&article),
                None => println!("Article: none published"),
            }
        }

        Command::Publish(args) => {
            let author = session.require_address().await?;
            let draft = args.into_draft().await?;
            let uploader = GatewayUploader::new(&config.backend_url)?;
            let publisher = Publisher::new(uploader, repository);

            let article = publisher.publish(&draft, &author).await?;
            print_summary(&article);
        }

        Command::Submit => {
            let author = session.require_address().await?;
            let article = repository
                .load()
                .await?
                .context("No published article. Run `mblog publish` first")?;
            if let Some(receipt) = &article.receipt {
                anyhow::bail!(
                    "Article already recorded in transaction {}",
                    receipt.transaction_hash
                );
            }
            let contract_address = config.contract_address.as_deref().context(
                "Contract address not configured. Set MBLOG_CONTRACT_ADDRESS or [client] contract_address",
            )?;

            ensure_network(wallet.as_ref(), &config.network).await?;
            let poller = rpc_wallet.watch_chain(CHAIN_POLL_INTERVAL);
            let monitor = NetworkMonitor::start(Arc::clone(&wallet), config.network.clone()).await?;

            let contract = RpcArticleContract::new(rpc, contract_address)
                .with_signature(&config.mint_signature)
                .with_poll_interval(config.receipt_poll);
            let submitter =
                BlockchainSubmitter::new(Arc::clone(&wallet), Arc::new(contract), config.network.clone())
                    .with_monitor(monitor);

            println!("Confirm the transaction in your wallet...");
            let submitted = submitter
                .submit(&article.content_id, article.quality_score as u32, &author)
                .await;
            poller.abort();
            let article = repository
                .attach_receipt(&article.content_id, submitted?)
                .await?;
            print_summary(&article);
        }

        Command::Show => match repository.load().await? {
            Some(article) => println!("{}", serde_json::to_string_pretty(&article)?),
            None => println!("No published article"),
        },

        Command::Reset => {
            repository.clear().await?;
            println!("Published article cleared");
        }

        Command::Network { watch } => {
            report_network(ensure_network(wallet.as_ref(), &config.network).await?, &config);
            if watch {
                let poller = rpc_wallet.watch_chain(CHAIN_POLL_INTERVAL);
                let monitor = NetworkMonitor::start(Arc::clone(&wallet), config.network.clone()).await?;
                let mut state = monitor.subscribe();
                println!("Watching for network changes (Ctrl-C to stop)");
                loop {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => break,
                        changed = state.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            let current = state.borrow_and_update().clone();
                            if current.on_target {
                                println!("Network: {} ({})", config.network.chain_name, current.chain_id)
                            } else {
                                println!("Network changed to {}: submission disabled", current.chain_id)
                            }
                        }
                    }
                }
                poller.abort();
            }
        }
    }

    Ok(())
}

fn report_network(status: NetworkStatus, config: &ClientConfig) {
    let name = &config.network.chain_name;
    match status {
        NetworkStatus::AlreadyConnected => println!("Network: {}", name),
        NetworkStatus::Switched => println!("Switched to {}", name),
        NetworkStatus::Added => println!("Added and switched to {}", name),
    }
}

fn print_summary(article: &PublishedArticle) {
    println!("Article: {}", article.title);
    println!("  Content ID: {}", article.content_id);
    println!("  URL: {}", article.gateway_url);
    if let Some(cover) = &article.cover_image {
        println!("  Cover: {}", cover);
    }
    println!(
        "  Quality score: {}/100 (~{} tokens)",
        article.quality_score,
        article.estimated_tokens()
    );
    match &article.receipt {
        Some(receipt) => {
            println!("  Transaction: {}", receipt.transaction_hash);
            if let Some(token_id) = &receipt.token_id {
                println!("  Token ID: {}", token_id);
            }
            println!("  Tokens earned: {}", receipt.tokens_earned);
            if let Some(url) = &receipt.explorer_url {
                println!("  Explorer: {}", url);
            }
        }
        None => println!("  On chain: not yet submitted"),
    }
}
