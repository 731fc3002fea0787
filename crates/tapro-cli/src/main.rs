use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tapro_core::models::{Category, PostKind};
use tapro_core::store::{ChatPoller, FeedSource, ListingStore, MessagesStore};
use tapro_core::sync::FetchOutcome;
use tapro_core::{ApiClient, CoreConfig, HttpTransport, SessionStore};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tapro")]
#[command(about = "Command-line client for the Tapro network")]
struct Cli {
    /// API base URL
    #[arg(long, env = "TAPRO_API_BASE")]
    api_base: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        email: String,
        password: String,
    },

    /// Create an account and store the session
    Register {
        email: String,
        password: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// founder or investor
        #[arg(long)]
        role: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Browse the discover feed
    Discover {
        /// startups, investors, or users
        #[arg(value_parser = parse_category, default_value = "startups")]
        category: Category,
        /// Number of pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },

    /// Browse your starred items
    Starred {
        #[arg(value_parser = parse_category, default_value = "startups")]
        category: Category,
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },

    /// Star an item
    Star {
        item_id: String,
        /// startup, investor, or user
        #[arg(value_parser = parse_category, default_value = "startups")]
        category: Category,
    },

    /// Remove a star
    Unstar {
        item_id: String,
        #[arg(value_parser = parse_category, default_value = "startups")]
        category: Category,
    },

    /// Follow a startup, investor, or user
    Follow {
        target_id: String,
        #[arg(value_parser = parse_category, default_value = "users")]
        category: Category,
    },

    /// Stop following
    Unfollow {
        target_id: String,
        #[arg(value_parser = parse_category, default_value = "users")]
        category: Category,
    },

    /// Read the explore feed
    Posts {
        /// thought, funding, announcement, or insight
        #[arg(long, value_parser = parse_post_kind)]
        kind: Option<PostKind>,
        /// Only posts by this author
        #[arg(long)]
        author: Option<String>,
    },

    /// Publish a post
    Post {
        content: String,
        #[arg(long, value_parser = parse_post_kind, default_value = "thought")]
        kind: PostKind,
        #[arg(long = "hashtag")]
        hashtags: Vec<String>,
    },

    /// Like (or unlike) a post
    Like {
        post_id: String,
    },

    /// Bookmark (or unbookmark) a post
    Bookmark {
        post_id: String,
    },

    /// Comment on a post
    Comment {
        post_id: String,
        text: String,
    },

    /// List your conversations
    Conversations {
        /// Filter by peer name or last message
        #[arg(long)]
        search: Option<String>,
    },

    /// Open (or create) a conversation with a user
    Open {
        participant_id: String,
    },

    /// Read a conversation
    Messages {
        conversation_id: String,
    },

    /// Send a direct message
    Send {
        conversation_id: String,
        text: String,
    },

    /// Follow a conversation live, printing messages as they arrive
    Watch {
        conversation_id: String,
    },
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value).ok_or_else(|| format!("unknown category `{value}`"))
}

fn parse_post_kind(value: &str) -> Result<PostKind, String> {
    PostKind::parse(value).ok_or_else(|| format!("unknown post type `{value}`"))
}

fn session_store() -> SessionStore {
    match std::env::var("TAPRO_SESSION_FILE") {
        Ok(path) => SessionStore::file(path),
        Err(_) => SessionStore::keyring(),
    }
}

fn emit(pretty: bool, value: &Value) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

async fn drain_feed(store: &ListingStore, pages: usize) -> Result<()> {
    for _ in 0..pages {
        match store.load_more().await? {
            FetchOutcome::Appended { .. } => {}
            FetchOutcome::Exhausted | FetchOutcome::Busy => break,
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.api_base {
        Some(base) => CoreConfig::new(base.clone()),
        None => CoreConfig::default(),
    };
    let transport = HttpTransport::new(config.api_base.clone(), config.request_timeout)
        .map_err(|e| anyhow!("http client setup failed: {e}"))?;
    let client = Arc::new(ApiClient::new(Arc::new(transport), config.clone()));

    let store = session_store();
    if let Some(session) = store.load().context("reading stored session")? {
        debug!(user = session.display_name(), "restored stored session");
        client.set_session(Some(session));
    }

    let result = run(&cli, &client).await;
    if let Err(err) = &result {
        error!(error = %err, "command failed");
    }

    // Refresh may have rotated the access token mid-command.
    match client.session() {
        Some(session) => store.save(&session).context("persisting session")?,
        None => store.clear().context("clearing session")?,
    }

    result
}

async fn run(cli: &Cli, client: &Arc<ApiClient>) -> Result<()> {
    match &cli.command {
        Commands::Login { email, password } => {
            let session = client.login(email, password).await?;
            let name = session.display_name().to_string();
            emit(cli.pretty, &json!({"loggedIn": true, "user": name}))
        }
        Commands::Register {
            email,
            password,
            name,
            role,
        } => {
            let mut details = json!({
                "email": email,
                "password": password,
                "fullName": name,
            });
            if let Some(role) = role {
                details["role"] = json!(role);
            }
            let session = client.register(details).await?;
            let name = session.display_name().to_string();
            emit(cli.pretty, &json!({"registered": true, "user": name}))
        }
        Commands::Logout => {
            client.logout().await;
            emit(cli.pretty, &json!({"loggedOut": true}))
        }
        Commands::Whoami => {
            let user = client.me().await?;
            emit(cli.pretty, &serde_json::to_value(user)?)
        }
        Commands::Discover { category, pages } => {
            browse(cli, client, FeedSource::Discover, *category, *pages).await
        }
        Commands::Starred { category, pages } => {
            browse(cli, client, FeedSource::Starred, *category, *pages).await
        }
        Commands::Star { item_id, category } => {
            client.star(item_id, category.wire_item_type()).await?;
            emit(cli.pretty, &json!({"starred": item_id}))
        }
        Commands::Unstar { item_id, category } => {
            client.unstar(item_id, category.wire_item_type()).await?;
            emit(cli.pretty, &json!({"unstarred": item_id}))
        }
        Commands::Follow {
            target_id,
            category,
        } => {
            client.follow(target_id, category.wire_item_type()).await?;
            emit(cli.pretty, &json!({"following": target_id}))
        }
        Commands::Unfollow {
            target_id,
            category,
        } => {
            client
                .unfollow(target_id, category.wire_item_type())
                .await?;
            emit(cli.pretty, &json!({"unfollowed": target_id}))
        }
        Commands::Posts { kind, author } => {
            let posts = client.posts(*kind, author.as_deref()).await?;
            emit(cli.pretty, &serde_json::to_value(posts)?)
        }
        Commands::Post {
            content,
            kind,
            hashtags,
        } => {
            let new_post = tapro_core::models::NewPost {
                content: content.clone(),
                kind: *kind,
                hashtags: hashtags.clone(),
                images: Vec::new(),
            };
            let post = client.create_post(&new_post).await?;
            emit(cli.pretty, &serde_json::to_value(post)?)
        }
        Commands::Like { post_id } => {
            client.like_post(post_id).await?;
            emit(cli.pretty, &json!({"toggledLike": post_id}))
        }
        Commands::Bookmark { post_id } => {
            client.bookmark_post(post_id).await?;
            emit(cli.pretty, &json!({"toggledBookmark": post_id}))
        }
        Commands::Comment { post_id, text } => {
            client.comment_post(post_id, text).await?;
            emit(cli.pretty, &json!({"commented": post_id}))
        }
        Commands::Conversations { search } => {
            let store = MessagesStore::new(Arc::clone(client));
            store.refresh_conversations().await?;
            if let Some(query) = search {
                store.set_search(query.clone());
            }
            emit(cli.pretty, &serde_json::to_value(store.conversations())?)
        }
        Commands::Open { participant_id } => {
            let conversation = client.open_conversation(participant_id).await?;
            emit(cli.pretty, &serde_json::to_value(conversation)?)
        }
        Commands::Messages { conversation_id } => {
            let messages = client.messages(conversation_id).await?;
            emit(cli.pretty, &serde_json::to_value(messages)?)
        }
        Commands::Send {
            conversation_id,
            text,
        } => {
            let store = MessagesStore::new(Arc::clone(client));
            let sent = store.send(conversation_id, text).await?;
            emit(cli.pretty, &serde_json::to_value(sent)?)
        }
        Commands::Watch { conversation_id } => watch(cli, client, conversation_id).await,
    }
}

async fn browse(
    cli: &Cli,
    client: &Arc<ApiClient>,
    source: FeedSource,
    category: Category,
    pages: usize,
) -> Result<()> {
    let store = ListingStore::new(Arc::clone(client), source);
    store.set_category(category);
    drain_feed(&store, pages).await?;
    emit(cli.pretty, &serde_json::to_value(store.items())?)
}

async fn watch(cli: &Cli, client: &Arc<ApiClient>, conversation_id: &str) -> Result<()> {
    let store = Arc::new(MessagesStore::new(Arc::clone(client)));
    let interval = client.config().chat_poll_interval;
    let (_poller, mut rx) = ChatPoller::spawn(Arc::clone(&store), conversation_id, interval);

    eprintln!("watching conversation {conversation_id}, ctrl-c to stop");
    loop {
        tokio::select! {
            message = rx.recv() => match message {
                Some(message) => emit(cli.pretty, &serde_json::to_value(message)?)?,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
