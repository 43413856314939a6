use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use threadweave_client::{
    api::{CommentId, NewComment, PostId, SortOrder, UserId, Uuid},
    CommentService, Expansion, HttpService, ThreadStore, ThreadView, UserDirectory,
};
use threadweave_mock_server::MockServer;

mod render;

const SEED_USERS: usize = 5;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base url of the comment service
    #[structopt(short, long, default_value = "http://localhost:3000")]
    host: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Run an in-memory comment service
    Serve {
        #[structopt(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,

        /// Create a post with this many random comments
        #[structopt(long)]
        seed: Option<usize>,
    },

    /// Print the comment thread of a post
    Show {
        post: Uuid,

        /// newest, oldest or top
        #[structopt(long, default_value = "newest")]
        sort: SortOrder,

        /// Depth at which threads get a "continue" gate
        #[structopt(long, default_value = "3")]
        max_depth: usize,

        /// Only print the root comments
        #[structopt(long)]
        collapsed: bool,
    },

    /// Comment on a post
    Comment { post: Uuid, text: String },

    /// Reply to a comment
    Reply {
        post: Uuid,
        parent: Uuid,
        text: String,
    },

    /// Toggle your upvote on a comment
    Upvote { comment: Uuid },

    /// Delete a comment
    Delete { comment: Uuid },
}

fn acting_user() -> anyhow::Result<UserId> {
    let id = std::env::var("THREADWEAVE_USER")
        .context("retrieving THREADWEAVE_USER environment variable")?;
    let id = Uuid::try_parse(&id).context("parsing THREADWEAVE_USER as a user id")?;
    Ok(UserId(id))
}

/// Loads and opens every thread below the roots, gates included
async fn expand_all<S: CommentService>(
    store: &mut ThreadStore<S>,
    view: &mut ThreadView,
) -> anyhow::Result<()> {
    let post = store.post_id().context("no post loaded")?;
    let sort = store.sort_order();
    let mut pending = store
        .roots()
        .iter()
        .filter(|c| c.has_replies())
        .map(|c| c.id)
        .collect::<Vec<_>>();
    while let Some(id) = pending.pop() {
        let Some(c) = store.find(&id) else {
            continue;
        };
        let a = view.toggle_replies(c);
        let b = view.toggle_continuation(c);
        if a == Expansion::NeedsLoad || b == Expansion::NeedsLoad {
            store
                .load_replies(post, id, sort)
                .await
                .with_context(|| format!("loading replies of {id}"))?;
        }
        if let Some(c) = store.find(&id) {
            pending.extend(c.children.iter().filter(|c| c.has_replies()).map(|c| c.id));
        }
    }
    Ok(())
}

async fn show(
    service: HttpService,
    post: PostId,
    sort: SortOrder,
    max_depth: usize,
    collapsed: bool,
) -> anyhow::Result<()> {
    let mut store = ThreadStore::new(service, UserDirectory::new());
    let mut view = ThreadView::new(max_depth);
    store
        .load_roots(post, sort)
        .await
        .with_context(|| format!("loading comments of post {post}"))?;
    if !collapsed {
        expand_all(&mut store, &mut view).await?;
    }
    store.resolve_authors().await;
    println!("{}", render::header(store.total_visible_count(), sort));
    let now = chrono::Utc::now();
    for row in view.rows(store.roots()) {
        println!("{}", render::row(&row, store.users(), now));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let service = HttpService::new(&opt.host);

    match opt.cmd {
        Command::Serve { addr, seed } => {
            let srv = Arc::new(MockServer::new());
            if let Some(n) = seed {
                let post = srv.test_add_post();
                let users = srv.test_seed(post, SEED_USERS, n);
                println!("post {post}");
                for u in users {
                    println!("user {} {} ({:?})", u.id, u.name, u.role);
                }
            }
            tracing::info!(%addr, "serving in-memory comment service");
            axum::Server::bind(&addr)
                .serve(threadweave_mock_server::router(srv).into_make_service())
                .await
                .context("running comment service")?;
        }
        Command::Show {
            post,
            sort,
            max_depth,
            collapsed,
        } => show(service, PostId(post), sort, max_depth, collapsed).await?,
        Command::Comment { post, text } => {
            let req = NewComment::new(PostId(post), None, acting_user()?, &text);
            req.validate()?;
            let c = service.create_comment(req).await?;
            println!("{}", c.id);
        }
        Command::Reply { post, parent, text } => {
            let req = NewComment::new(
                PostId(post),
                Some(CommentId(parent)),
                acting_user()?,
                &text,
            );
            req.validate()?;
            let c = service.create_comment(req).await?;
            println!("{}", c.id);
        }
        Command::Upvote { comment } => {
            let res = service
                .toggle_upvote(CommentId(comment), acting_user()?)
                .await?;
            println!("{} upvotes", res.upvotes);
        }
        Command::Delete { comment } => {
            service
                .delete_comment(CommentId(comment), acting_user()?)
                .await?;
        }
    }

    Ok(())
}
