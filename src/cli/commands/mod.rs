//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod fetch;
mod login;
mod resolve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use voyager_scrape::client::api::{
    DEFAULT_COMMENTS_PAGE_SIZE, DEFAULT_POSTS_PAGE_SIZE, DEFAULT_POST_COMMENTS_COUNT,
    DEFAULT_POST_LIKES_COUNT,
};
use voyager_scrape::config::{load_settings_with_options, LoadOptions};
use voyager_scrape::parsers::search::MAX_SEARCH_COUNT;

use resolve::OfflineParser;

#[derive(Parser)]
#[command(name = "voyager")]
#[command(about = "Profile, company, post and search extraction over the LinkedIn Voyager API")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Cookie file (overrides config and VOYAGER_COOKIES_FILE)
    #[arg(long, global = true)]
    cookies: Option<PathBuf>,

    /// Maximum pages fetched by paginated commands
    #[arg(long, global = true)]
    max_pages: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with the browser and save the session cookies
    Login {
        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },

    /// Full profile (legacy profile view)
    Profile {
        /// Public identifier or profile URL
        identifier: String,
    },

    /// Profile summary with the about section
    MiniProfile {
        /// Public identifier or profile URL
        identifier: String,
    },

    /// About section text
    About {
        /// Public identifier or profile URL
        identifier: String,
    },

    /// Experience section, with company details
    Experiences {
        /// Public identifier or profile URL
        identifier: String,
    },

    /// Positions (legacy endpoint), most recent first
    Positions {
        /// Public identifier or profile URL
        identifier: String,
    },

    /// Contact details
    Contact {
        /// Public identifier or profile URL
        identifier: String,
    },

    /// Skill names
    Skills {
        /// Public identifier or profile URL
        identifier: String,
    },

    /// Education entries
    Education {
        /// Public identifier or profile URL
        identifier: String,
    },

    /// Certification entries
    Certifications {
        /// Public identifier or profile URL
        identifier: String,
    },

    /// Company page
    Company {
        /// Universal name (the company URL slug) or numeric id
        name: String,
    },

    /// A single post
    Post {
        /// Post URL (https://www.linkedin.com/posts/...)
        url: String,
        /// Comments included with the post
        #[arg(long, default_value_t = DEFAULT_POST_COMMENTS_COUNT)]
        comments: u32,
        /// Likes included with the post
        #[arg(long, default_value_t = DEFAULT_POST_LIKES_COUNT)]
        likes: u32,
    },

    /// Every comment on a post
    Comments {
        /// Post URL containing activity-<id>
        url: String,
        /// Comments per request
        #[arg(long, default_value_t = DEFAULT_COMMENTS_PAGE_SIZE)]
        page_size: u32,
    },

    /// A member's posts
    Posts {
        /// Public identifier or profile URL
        identifier: String,
        /// Posts per request
        #[arg(long, default_value_t = DEFAULT_POSTS_PAGE_SIZE)]
        page_size: u32,
    },

    /// Raw search results
    Search {
        /// Keywords
        query: Option<String>,
        /// Result offset
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Results per page (at most 25)
        #[arg(long, default_value_t = MAX_SEARCH_COUNT)]
        limit: u32,
        /// Rest.li filter list
        #[arg(long, default_value = "List()")]
        filters: String,
        /// Search origin
        #[arg(long, default_value = "GLOBAL_SEARCH_HEADER")]
        origin: String,
    },

    /// People search
    People(fetch::PeopleArgs),

    /// Run the extraction pipeline on a saved JSON response (no network)
    Resolve {
        /// Saved response file
        file: PathBuf,
        /// Root URN list path inside `data`
        #[arg(long, default_value = "*elements")]
        root: String,
        /// Projection entries, `output=path` (repeatable)
        #[arg(long = "field", value_name = "OUTPUT=PATH")]
        fields: Vec<String>,
        /// Run a domain parser instead of the generic extraction
        #[arg(long, value_enum)]
        parser: Option<OfflineParser>,
        /// Profile identifier, for parsers that need one
        #[arg(long)]
        identifier: Option<String>,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    };
    let (mut settings, _config) = load_settings_with_options(options).await;

    if let Some(cookies) = cli.cookies {
        settings.cookies_file = cookies;
    }
    if let Some(max_pages) = cli.max_pages {
        settings.max_pages = max_pages;
    }

    match cli.command {
        Commands::Login { headed } => {
            if headed {
                settings.browser.headless = false;
            }
            login::cmd_login(&settings).await
        }
        Commands::Profile { identifier } => fetch::cmd_profile(&settings, &identifier).await,
        Commands::MiniProfile { identifier } => {
            fetch::cmd_mini_profile(&settings, &identifier).await
        }
        Commands::About { identifier } => fetch::cmd_about(&settings, &identifier).await,
        Commands::Experiences { identifier } => {
            fetch::cmd_experiences(&settings, &identifier).await
        }
        Commands::Positions { identifier } => fetch::cmd_positions(&settings, &identifier).await,
        Commands::Contact { identifier } => fetch::cmd_contact(&settings, &identifier).await,
        Commands::Skills { identifier } => fetch::cmd_skills(&settings, &identifier).await,
        Commands::Education { identifier } => fetch::cmd_education(&settings, &identifier).await,
        Commands::Certifications { identifier } => {
            fetch::cmd_certifications(&settings, &identifier).await
        }
        Commands::Company { name } => fetch::cmd_company(&settings, &name).await,
        Commands::Post {
            url,
            comments,
            likes,
        } => fetch::cmd_post(&settings, &url, comments, likes).await,
        Commands::Comments { url, page_size } => {
            fetch::cmd_comments(&settings, &url, page_size).await
        }
        Commands::Posts {
            identifier,
            page_size,
        } => fetch::cmd_posts(&settings, &identifier, page_size).await,
        Commands::Search {
            query,
            offset,
            limit,
            filters,
            origin,
        } => fetch::cmd_search(&settings, query, offset, limit, filters, origin).await,
        Commands::People(args) => fetch::cmd_people(&settings, args).await,
        Commands::Resolve {
            file,
            root,
            fields,
            parser,
            identifier,
        } => resolve::cmd_resolve(&file, &root, &fields, parser, identifier.as_deref()),
    }
}
