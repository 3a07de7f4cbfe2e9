use std::process::exit;
use std::sync::Arc;

use clap::Parser;
use log::error;
use warp::Filter;

mod args;
mod auth;
mod blog;
mod post;
mod routes;
mod store;
mod templates;
mod time;
mod user;

use args::Args;
use blog::Blog;
use store::Store;

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let args = Args::parse();

    let addr = match args.addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("invalid listen address: {e}");
            exit(1);
        }
    };

    let store = match Store::new(args.redis_host(), args.redis_port()).await {
        Ok(store) => store,
        Err(()) => {
            error!(
                "couldn't reach the store at {}:{}",
                args.redis_host(),
                args.redis_port()
            );
            exit(1);
        }
    };

    let blog = Arc::new(Blog::new(store));
    let site = routes::site(blog, args.secure(), args.static_dir().to_path_buf());

    warp::serve(site.with(warp::log("miniblog"))).run(addr).await;
}
