use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "shikyou",
    about = "Shikyou content store: posts, comments and view counts",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Backend settings as TOML. Without it, SHIKYOU_FIREBASE_* variables are used.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create, edit, read and search posts
    Post(PostArgs),
    /// Add, edit and list comments
    Comment(CommentArgs),
    /// Show the view count of a post
    Views(ViewsArgs),
}

#[derive(Args)]
pub struct PostArgs {
    #[command(subcommand)]
    pub action: PostAction,
}

#[derive(Subcommand)]
pub enum PostAction {
    /// Publish a new post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        category: String,
        #[arg(long, conflicts_with = "content_file", required_unless_present = "content_file")]
        content: Option<String>,
        #[arg(long)]
        content_file: Option<PathBuf>,
        /// Content reference. Defaults to a digest of the content.
        #[arg(long)]
        cid: Option<String>,
        #[arg(long)]
        image_cid: Option<String>,
    },
    /// Change fields of an existing post
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,
        #[arg(long)]
        content_file: Option<PathBuf>,
        #[arg(long)]
        cid: Option<String>,
        #[arg(long)]
        image_cid: Option<String>,
    },
    /// Delete a post
    Delete {
        id: String,
        /// Purge the post's comments first
        #[arg(long)]
        with_comments: bool,
    },
    /// Show a post and count the view
    Show { id: String },
    /// List posts, optionally filtered
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, conflicts_with = "category")]
        author: Option<String>,
    },
    /// Case-insensitive search over titles and content
    Search { term: String },
}

#[derive(Args)]
pub struct CommentArgs {
    #[command(subcommand)]
    pub action: CommentAction,
}

#[derive(Subcommand)]
pub enum CommentAction {
    /// Comment on a post
    Add {
        post_id: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        cid: String,
        #[arg(long)]
        reply_to: Option<String>,
        /// Milliseconds since the epoch or RFC 3339. Defaults to now.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Replace a comment's body reference or timestamp
    Edit {
        id: String,
        #[arg(long)]
        cid: Option<String>,
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Delete a comment
    Delete { id: String },
    /// List the comments of a post or of an author
    List {
        #[arg(required_unless_present = "author")]
        post_id: Option<String>,
        #[arg(long, conflicts_with = "post_id")]
        author: Option<String>,
        /// Group replies under their top-level comment
        #[arg(long, requires = "post_id")]
        threads: bool,
    },
}

#[derive(Args)]
pub struct ViewsArgs {
    pub post_id: String,
}
