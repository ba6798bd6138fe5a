//! Commands backed by the live API.

use clap::Args;
use console::style;

use voyager_scrape::config::Settings;
use voyager_scrape::parsers::search::{PeopleSearchParams, SearchParams, MAX_SEARCH_COUNT};

use crate::cli::helpers::{build_api, print_json, with_spinner};

/// People search filters.
#[derive(Args)]
pub struct PeopleArgs {
    /// Keywords
    query: Option<String>,
    /// Network depth: F (1st), S (2nd), O (3rd+). Repeatable.
    #[arg(long = "network")]
    network_depths: Vec<String>,
    /// Connections of this profile URN id
    #[arg(long)]
    connection_of: Option<String>,
    /// Geo URN ids. Repeatable.
    #[arg(long = "region")]
    regions: Vec<String>,
    /// Industry ids. Repeatable.
    #[arg(long = "industry")]
    industries: Vec<String>,
    /// Current company ids. Repeatable.
    #[arg(long)]
    current_company: Vec<String>,
    /// Past company ids. Repeatable.
    #[arg(long = "past-company")]
    past_companies: Vec<String>,
    /// Profile language codes. Repeatable.
    #[arg(long = "profile-language")]
    profile_languages: Vec<String>,
    /// School ids. Repeatable.
    #[arg(long = "school-id")]
    schools: Vec<String>,
    /// Service category ids. Repeatable.
    #[arg(long = "service-category")]
    service_categories: Vec<String>,
    /// First name keyword
    #[arg(long)]
    first_name: Option<String>,
    /// Last name keyword
    #[arg(long)]
    last_name: Option<String>,
    /// Title keyword
    #[arg(long)]
    title: Option<String>,
    /// Company keyword
    #[arg(long)]
    company: Option<String>,
    /// School keyword
    #[arg(long)]
    school: Option<String>,
    /// Skip out-of-network profiles
    #[arg(long)]
    exclude_private: bool,
    /// Result offset
    #[arg(long, default_value_t = 0)]
    offset: u32,
    /// Results per page (at most 25)
    #[arg(long, default_value_t = MAX_SEARCH_COUNT)]
    limit: u32,
}

impl From<PeopleArgs> for PeopleSearchParams {
    fn from(args: PeopleArgs) -> Self {
        Self {
            query: args.query,
            connection_of: args.connection_of,
            network_depths: args.network_depths,
            regions: args.regions,
            industries: args.industries,
            current_company: args.current_company,
            past_companies: args.past_companies,
            profile_languages: args.profile_languages,
            schools: args.schools,
            service_categories: args.service_categories,
            keyword_first_name: args.first_name,
            keyword_last_name: args.last_name,
            keyword_title: args.title,
            keyword_company: args.company,
            keyword_school: args.school,
            include_private_profiles: !args.exclude_private,
            offset: args.offset,
            limit: args.limit,
            ..Default::default()
        }
    }
}

pub async fn cmd_profile(settings: &Settings, identifier: &str) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let profile = with_spinner("Fetching profile...", api.profile(identifier)).await?;
    print_json(&profile)
}

pub async fn cmd_mini_profile(settings: &Settings, identifier: &str) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let profile = with_spinner("Fetching profile...", api.mini_profile(identifier)).await?;
    print_json(&profile)
}

pub async fn cmd_about(settings: &Settings, identifier: &str) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    match with_spinner("Fetching about...", api.about(identifier)).await? {
        Some(about) => println!("{}", about),
        None => eprintln!("{} No about section", style("!").yellow()),
    }
    Ok(())
}

pub async fn cmd_experiences(settings: &Settings, identifier: &str) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let experiences =
        with_spinner("Fetching experiences...", api.experiences(identifier)).await?;
    print_json(&experiences)
}

pub async fn cmd_positions(settings: &Settings, identifier: &str) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let positions = with_spinner("Fetching positions...", api.positions(identifier)).await?;
    print_json(&positions)
}

pub async fn cmd_contact(settings: &Settings, identifier: &str) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let contact = with_spinner("Fetching contact info...", api.contact_info(identifier)).await?;
    print_json(&contact)
}

pub async fn cmd_skills(settings: &Settings, identifier: &str) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let skills = with_spinner("Fetching skills...", api.skills(identifier)).await?;
    print_json(&skills)
}

pub async fn cmd_education(settings: &Settings, identifier: &str) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let education = with_spinner("Fetching education...", api.education(identifier)).await?;
    print_json(&education)
}

pub async fn cmd_certifications(settings: &Settings, identifier: &str) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let certifications =
        with_spinner("Fetching certifications...", api.certifications(identifier)).await?;
    print_json(&certifications)
}

pub async fn cmd_company(settings: &Settings, name: &str) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let company = with_spinner("Fetching company...", api.company(name)).await?;
    print_json(&company)
}

pub async fn cmd_post(
    settings: &Settings,
    url: &str,
    comments: u32,
    likes: u32,
) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    match with_spinner("Fetching post...", api.post(url, comments, likes)).await? {
        Some(post) => print_json(&post),
        None => {
            eprintln!("{} Post not found in response", style("✗").red());
            Ok(())
        }
    }
}

pub async fn cmd_comments(settings: &Settings, url: &str, page_size: u32) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let comments = with_spinner("Fetching comments...", api.comments(url, page_size)).await?;
    eprintln!("{} {} comments", style("✓").green(), comments.len());
    print_json(&comments)
}

pub async fn cmd_posts(
    settings: &Settings,
    identifier: &str,
    page_size: u32,
) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let posts = with_spinner("Fetching posts...", api.user_posts(identifier, page_size)).await?;
    eprintln!("{} {} posts", style("✓").green(), posts.len());
    print_json(&posts)
}

pub async fn cmd_search(
    settings: &Settings,
    query: Option<String>,
    offset: u32,
    limit: u32,
    filters: String,
    origin: String,
) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let params = SearchParams {
        query,
        filters,
        origin,
        offset,
        limit,
    };
    let results = with_spinner("Searching...", api.search(&params)).await?;
    print_json(&results)
}

pub async fn cmd_people(settings: &Settings, args: PeopleArgs) -> anyhow::Result<()> {
    let api = build_api(settings)?;
    let params = PeopleSearchParams::from(args);
    let results = with_spinner("Searching people...", api.search_people(&params)).await?;
    eprintln!(
        "{} {} people (total {})",
        style("✓").green(),
        results.results.len(),
        results.paging.total
    );
    print_json(&results)
}
