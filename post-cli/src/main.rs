mod logging;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use post_client::query::MAX_LIMIT;
use post_client::{
    ClientConfig, CreatePostDraft, DataUriPreview, DetailView, FilePageSize, ListQuery, ListView,
    PostsHttp, PostsSync, QueryStore, UploadFile,
};

const STORE_FILE: &str = ".post_store";

#[derive(Parser, Debug)]
struct Cli {
    /// API base URL, overriding POSTS_API_URL.
    #[clap(short, long)]
    server: Option<String>,

    /// Emit logs as JSON.
    #[clap(long)]
    json_logs: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List posts. Page size is remembered between runs.
    List {
        #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,
        #[clap(long)]
        search: Option<String>,
        /// Posts per page, 1 to 50.
        #[clap(long, value_parser = clap::value_parser!(u32).range(1..=MAX_LIMIT as i64))]
        limit: Option<u32>,
    },
    /// Show one post.
    Show { id: String },
    /// Publish a post. Up to five images; the first one becomes the cover.
    Create {
        #[clap(long)]
        title: String,
        #[clap(long)]
        author: String,
        #[clap(long)]
        excerpt: String,
        #[clap(long)]
        content: String,
        /// Comma separated.
        #[clap(long, default_value = "")]
        tags: String,
        #[clap(long = "image")]
        images: Vec<PathBuf>,
    },
    /// Forget the remembered page size.
    Reset,
}

async fn read_images(paths: &[PathBuf]) -> Result<Vec<UploadFile>, Box<dyn std::error::Error>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = mime_guess::from_path(path).first_or_octet_stream().to_string();
        files.push(UploadFile::new(name, content_type, bytes));
    }
    Ok(files)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    logging::init_logging(args.json_logs);

    let mut config = ClientConfig::from_env()?;
    if let Some(server) = args.server {
        config = config.with_api_url(server);
    }
    let sync = PostsSync::new(PostsHttp::connect(&config)?);
    let mut store = QueryStore::new(FilePageSize::new(STORE_FILE));

    match args.command {
        Command::List {
            page,
            search,
            limit,
        } => {
            if let Some(search) = search {
                store.set_search_query(search);
            }
            if let Some(limit) = limit {
                store.set_limit(limit);
            }
            if let Some(page) = page {
                store.set_current_page(page);
            }

            let query = ListQuery::from(store.state());
            let result = sync.fetch_list(&query).await;
            let view = ListView::derive(&sync.list_snapshot(&query), store.search_query());
            render::print_list(&view, store.current_page());
            result?;
        }
        Command::Show { id } => {
            let result = sync.fetch_post(&id).await;
            render::print_detail(&DetailView::derive(&sync.post_snapshot(&id)));
            result?;
        }
        Command::Create {
            title,
            author,
            excerpt,
            content,
            tags,
            images,
        } => {
            let mut draft = CreatePostDraft {
                title,
                author,
                excerpt,
                content,
                tags,
                ..CreatePostDraft::default()
            };
            let files = read_images(&images).await?;
            if !files.is_empty() {
                draft.images.add_batch(files, &DataUriPreview).await?;
            }
            let payload = match draft.to_payload() {
                Ok(payload) => payload,
                Err(errors) => {
                    for error in errors.iter() {
                        println!("{:?}: {}", error.field, error.message);
                    }
                    return Err(errors.into());
                }
            };

            let result = sync.create_post(payload).await;
            for note in sync.take_notifications() {
                render::print_notification(&note);
            }
            let post = result?;
            println!("Post created! ID: {}", post.id);
            if let Some(cover) = draft.images.cover() {
                println!("Cover image: {}", cover.name);
            }
        }
        Command::Reset => {
            store.reset_filters();
            println!("Page size reset to {}", store.limit());
        }
    }

    Ok(())
}
