use std::io::Write;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde_json::{json, Value};
use shikyou_blog::{Blog, CommentThread};
use shikyou_store::{DocumentStore, FirestoreConfig, FirestoreStore};
use shikyou_types::{
    Comment, CommentPatch, ContentRef, DocumentId, NewComment, NewPost, Post, PostPatch,
    Timestamp, WalletAddress,
};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(project = %config.project_id, endpoint = %config.endpoint, "using Firestore");
    let store = FirestoreStore::new(config).context("setting up the Firestore client")?;
    let blog = Blog::new(store);
    let mut out = std::io::stdout();
    execute(&blog, cli.command, cli.format, &mut out).await
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FirestoreConfig> {
    match path {
        Some(path) => FirestoreConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => FirestoreConfig::from_env().context("reading SHIKYOU_FIREBASE_* settings"),
    }
}

pub async fn execute<S: DocumentStore>(
    blog: &Blog<S>,
    command: Command,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        Command::Post(args) => cmd_post(blog, args.action, format, out).await,
        Command::Comment(args) => cmd_comment(blog, args.action, format, out).await,
        Command::Views(args) => {
            let id = DocumentId::new(args.post_id);
            let views = blog.get_view_count(&id).await;
            match format {
                OutputFormat::Json => emit(out, &json!({ "postId": id, "views": views })),
                OutputFormat::Text => {
                    writeln!(out, "{} views on {}", views.to_string().bold(), id.as_str().cyan())?;
                    Ok(())
                }
            }
        }
    }
}

async fn cmd_post<S: DocumentStore>(
    blog: &Blog<S>,
    action: PostAction,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match action {
        PostAction::Create { title, author, category, content, content_file, cid, image_cid } => {
            let author = parse_author(&author)?;
            let content = read_content(content, content_file.as_deref())?
                .context("post content is required")?;
            let cid = cid
                .map(ContentRef::new)
                .unwrap_or_else(|| ContentRef::digest(content.as_bytes()));
            let mut post = NewPost::new(title, content, author, cid, category);
            if let Some(image) = image_cid {
                post = post.with_image(ContentRef::new(image));
            }
            let id = blog.create_post(post).await.context("creating post")?;
            created(out, format, "post", &id)
        }
        PostAction::Update { id, title, category, content, content_file, cid, image_cid } => {
            let id = DocumentId::new(id);
            let mut patch = PostPatch::new();
            patch.title = title;
            patch.category = category;
            patch.image_cid = image_cid.map(ContentRef::new);
            patch.cid = cid.map(ContentRef::new);
            if let Some(content) = read_content(content, content_file.as_deref())? {
                if patch.cid.is_none() {
                    patch.cid = Some(ContentRef::digest(content.as_bytes()));
                }
                patch.content = Some(content);
            }
            blog.update_post(&id, patch)
                .await
                .with_context(|| format!("updating post {id}"))?;
            done(out, format, "updated", &id)
        }
        PostAction::Delete { id, with_comments } => {
            let id = DocumentId::new(id);
            let purged = if with_comments {
                blog.delete_post_with_comments(&id)
                    .await
                    .with_context(|| format!("deleting post {id} and its comments"))?
            } else {
                blog.delete_post(&id)
                    .await
                    .with_context(|| format!("deleting post {id}"))?;
                0
            };
            match format {
                OutputFormat::Json => emit(out, &json!({ "deleted": id, "comments": purged })),
                OutputFormat::Text => {
                    writeln!(out, "{} Deleted post {}", "✓".green().bold(), id.as_str().cyan())?;
                    if with_comments {
                        writeln!(out, "  {} comments removed", purged)?;
                    }
                    Ok(())
                }
            }
        }
        PostAction::Show { id } => {
            let id = DocumentId::new(id);
            let post = blog
                .get_post(&id)
                .await
                .with_context(|| format!("reading post {id}"))?
                .with_context(|| format!("no post with id {id}"))?;
            blog.record_view(&id).await;
            let views = blog.get_view_count(&id).await;
            match format {
                OutputFormat::Json => emit(out, &post_json(&post, Some(views))?),
                OutputFormat::Text => {
                    write_post(out, &post, Some(views))?;
                    writeln!(out)?;
                    writeln!(out, "{}", post.content)?;
                    Ok(())
                }
            }
        }
        PostAction::List { category, author } => {
            let rows: Vec<(Post, Option<u64>)> = match author {
                Some(author) => blog
                    .list_posts_by_author(&WalletAddress::new(author))
                    .await
                    .context("listing posts")?
                    .into_iter()
                    .map(|p| (p, None))
                    .collect(),
                None => blog
                    .list_posts_with_views(category.as_deref())
                    .await
                    .context("listing posts")?
                    .into_iter()
                    .map(|p| (p.post, Some(p.views)))
                    .collect(),
            };
            write_posts(out, format, &rows)
        }
        PostAction::Search { term } => {
            let rows: Vec<(Post, Option<u64>)> = blog
                .search_posts(&term)
                .await
                .context("searching posts")?
                .into_iter()
                .map(|p| (p, None))
                .collect();
            write_posts(out, format, &rows)
        }
    }
}

async fn cmd_comment<S: DocumentStore>(
    blog: &Blog<S>,
    action: CommentAction,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match action {
        CommentAction::Add { post_id, author, cid, reply_to, timestamp } => {
            let at = parse_timestamp(timestamp.as_deref())?.unwrap_or_else(Timestamp::wall);
            let mut comment = NewComment::new(
                DocumentId::new(post_id),
                ContentRef::new(cid),
                parse_author(&author)?,
                at,
            );
            if let Some(parent) = reply_to {
                comment = comment.reply_to(DocumentId::new(parent));
            }
            let id = blog.create_comment(comment).await.context("adding comment")?;
            created(out, format, "comment", &id)
        }
        CommentAction::Edit { id, cid, timestamp } => {
            let id = DocumentId::new(id);
            let patch = CommentPatch {
                comment_cid: cid.map(ContentRef::new),
                timestamp: parse_timestamp(timestamp.as_deref())?,
            };
            anyhow::ensure!(!patch.is_empty(), "nothing to change: pass --cid or --timestamp");
            blog.update_comment(&id, patch)
                .await
                .with_context(|| format!("editing comment {id}"))?;
            done(out, format, "updated", &id)
        }
        CommentAction::Delete { id } => {
            let id = DocumentId::new(id);
            blog.delete_comment(&id)
                .await
                .with_context(|| format!("deleting comment {id}"))?;
            done(out, format, "deleted", &id)
        }
        CommentAction::List { post_id, author, threads } => match (post_id, author) {
            (Some(post_id), _) if threads => {
                let threads = blog
                    .list_comment_threads(&DocumentId::new(post_id))
                    .await
                    .context("listing comments")?;
                write_threads(out, format, &threads)
            }
            (Some(post_id), _) => {
                let comments = blog
                    .list_comments(&DocumentId::new(post_id))
                    .await
                    .context("listing comments")?;
                write_comments(out, format, &comments)
            }
            (None, Some(author)) => {
                let comments = blog
                    .list_comments_by_author(&WalletAddress::new(author))
                    .await
                    .context("listing comments")?;
                write_comments(out, format, &comments)
            }
            (None, None) => anyhow::bail!("pass a post id or --author"),
        },
    }
}

/// New records must carry an EVM address. Read filters take any author
/// string, since other clients may have stored non-EVM authors.
fn parse_author(address: &str) -> anyhow::Result<WalletAddress> {
    WalletAddress::parse_evm(address).with_context(|| format!("invalid author {address}"))
}

fn parse_timestamp(raw: Option<&str>) -> anyhow::Result<Option<Timestamp>> {
    raw.map(|s| Timestamp::parse(s).with_context(|| format!("invalid timestamp {s}")))
        .transpose()
}

fn read_content(inline: Option<String>, file: Option<&Path>) -> anyhow::Result<Option<String>> {
    match (inline, file) {
        (Some(text), _) => Ok(Some(text)),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map(Some)
            .with_context(|| format!("reading {}", path.display())),
        (None, None) => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn emit(out: &mut dyn Write, value: &Value) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn created(out: &mut dyn Write, format: OutputFormat, kind: &str, id: &DocumentId) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => emit(out, &json!({ "id": id })),
        OutputFormat::Text => {
            writeln!(out, "{} Created {} {}", "✓".green().bold(), kind, id.as_str().cyan())?;
            Ok(())
        }
    }
}

fn done(out: &mut dyn Write, format: OutputFormat, verb: &str, id: &DocumentId) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => emit(out, &json!({ "id": id, "status": verb })),
        OutputFormat::Text => {
            writeln!(out, "{} {} {}", "✓".green().bold(), verb, id.as_str().cyan())?;
            Ok(())
        }
    }
}

/// Record JSON with the id put back in; records skip it when serialized.
fn with_id<T: serde::Serialize>(record: &T, id: &DocumentId) -> anyhow::Result<Value> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut value {
        map.insert("id".into(), Value::String(id.as_str().to_string()));
    }
    Ok(value)
}

fn post_json(post: &Post, views: Option<u64>) -> anyhow::Result<Value> {
    let mut value = with_id(post, &post.id)?;
    if let (Some(views), Value::Object(map)) = (views, &mut value) {
        map.insert("views".into(), views.into());
    }
    Ok(value)
}

fn comment_json(comment: &Comment) -> anyhow::Result<Value> {
    with_id(comment, &comment.id)
}

fn write_post(out: &mut dyn Write, post: &Post, views: Option<u64>) -> anyhow::Result<()> {
    write!(
        out,
        "{} {} [{}] by {}",
        post.id.as_str().cyan(),
        post.title.bold(),
        post.category.yellow(),
        post.author.short(),
    )?;
    if let Some(views) = views {
        write!(out, " ({views} views)")?;
    }
    writeln!(out)?;
    writeln!(out, "  created {}  updated {}", post.created_at, post.updated_at)?;
    Ok(())
}

fn write_posts(
    out: &mut dyn Write,
    format: OutputFormat,
    rows: &[(Post, Option<u64>)],
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let list = rows
                .iter()
                .map(|(p, v)| post_json(p, *v))
                .collect::<anyhow::Result<Vec<_>>>()?;
            emit(out, &Value::Array(list))
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                writeln!(out, "No posts.")?;
            }
            for (post, views) in rows {
                write_post(out, post, *views)?;
            }
            Ok(())
        }
    }
}

fn write_comment(out: &mut dyn Write, comment: &Comment, indent: &str) -> anyhow::Result<()> {
    writeln!(
        out,
        "{indent}{} {} on {} at {}: {}",
        comment.id.as_str().cyan(),
        comment.author.short(),
        comment.post_id,
        comment.timestamp,
        comment.comment_cid.as_str().dimmed(),
    )?;
    Ok(())
}

fn write_comments(out: &mut dyn Write, format: OutputFormat, comments: &[Comment]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let list = comments.iter().map(comment_json).collect::<anyhow::Result<Vec<_>>>()?;
            emit(out, &Value::Array(list))
        }
        OutputFormat::Text => {
            if comments.is_empty() {
                writeln!(out, "No comments.")?;
            }
            for comment in comments {
                write_comment(out, comment, "")?;
            }
            Ok(())
        }
    }
}

fn write_threads(
    out: &mut dyn Write,
    format: OutputFormat,
    threads: &[CommentThread],
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let mut list = Vec::with_capacity(threads.len());
            for thread in threads {
                let mut value = comment_json(&thread.comment)?;
                let replies = thread
                    .replies
                    .iter()
                    .map(comment_json)
                    .collect::<anyhow::Result<Vec<_>>>()?;
                if let Value::Object(map) = &mut value {
                    map.insert("replies".into(), Value::Array(replies));
                }
                list.push(value);
            }
            emit(out, &Value::Array(list))
        }
        OutputFormat::Text => {
            if threads.is_empty() {
                writeln!(out, "No comments.")?;
            }
            for thread in threads {
                write_comment(out, &thread.comment, "")?;
                for reply in &thread.replies {
                    write_comment(out, reply, "    ↳ ")?;
                }
            }
            Ok(())
        }
    }
}
