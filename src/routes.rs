use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;

use askama::Template;
use cookie::Cookie;
use log::error;
use serde::de::DeserializeOwned;
use warp::http::{header, StatusCode, Uri};
use warp::{reject, reply, Filter, Rejection, Reply};

use crate::auth::{Credentials, SessionId, SESSION_COOKIE};
use crate::blog::{Blog, Error};
use crate::post::PostForm;
use crate::store::SESSION_TTL_SECS;
use crate::templates::{CreatePage, ErrorPage, IndexPage, LoginPage, PostsPage, RegisterPage};
use crate::user::{LoginForm, RegisterForm};

const FORM_LIMIT: u64 = 16 * 1024;

/// The full site: every route plus rejection recovery.
pub fn site(
    blog: Arc<Blog>,
    secure: bool,
    static_dir: PathBuf,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    routes(blog, secure, static_dir).recover(handle_rejection)
}

fn routes(
    blog: Arc<Blog>,
    secure: bool,
    static_dir: PathBuf,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_blog = warp::any().map(move || Arc::clone(&blog));
    let with_secure = warp::any().map(move || secure);

    let session = warp::cookie::optional::<String>(SESSION_COOKIE)
        .map(|cookie: Option<String>| cookie.and_then(|s| s.parse::<SessionId>().ok()));

    let index = warp::path::end()
        .and(warp::get())
        .and(with_blog.clone())
        .and(session.clone())
        .and_then(index_page);

    let register = {
        let page = warp::path!("register")
            .and(warp::get())
            .and(with_blog.clone())
            .and(session.clone())
            .and_then(register_page);

        let submit = warp::path!("register")
            .and(warp::post())
            .and(with_blog.clone())
            .and(with_secure.clone())
            .and(form())
            .and_then(register_submit);

        page.or(submit)
    };

    let login = {
        let page = warp::path!("login")
            .and(warp::get())
            .and(with_blog.clone())
            .and(session.clone())
            .and_then(login_page);

        let submit = warp::path!("login")
            .and(warp::post())
            .and(with_blog.clone())
            .and(with_secure)
            .and(form())
            .and_then(login_submit);

        page.or(submit)
    };

    let create = {
        let page = warp::path!("create")
            .and(warp::get())
            .and(with_blog.clone())
            .and(session.clone())
            .and_then(create_page);

        let submit = warp::path!("create")
            .and(warp::post())
            .and(with_blog.clone())
            .and(form())
            .and_then(create_submit);

        page.or(submit)
    };

    let posts = warp::path!("posts")
        .and(warp::get())
        .and(with_blog)
        .and(session)
        .and_then(posts_page);

    let statics = warp::path("static").and(warp::fs::dir(static_dir));

    index
        .or(register)
        .or(login)
        .or(create)
        .or(posts)
        .or(statics)
}

/// A size-limited urlencoded form body. Generic so each POST route decodes
/// its own form type.
fn form<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(FORM_LIMIT).and(warp::body::form())
}

fn render<T: Template>(page: &T) -> Result<reply::Html<String>, Rejection> {
    page.render().map(reply::html).map_err(|e| {
        error!("template render: {e}");
        reject::custom(Error::Internal)
    })
}

fn with_session_cookie(
    reply: impl Reply,
    session_id: &SessionId,
    secure: bool,
) -> impl Reply {
    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .max_age(::time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build();

    reply::with_header(reply, header::SET_COOKIE, cookie.to_string())
}

async fn index_page(
    blog: Arc<Blog>,
    session_id: Option<SessionId>,
) -> Result<impl Reply, Rejection> {
    let user = blog.current_user(session_id).await;
    render(&IndexPage { user })
}

async fn register_page(
    blog: Arc<Blog>,
    session_id: Option<SessionId>,
) -> Result<impl Reply, Rejection> {
    let user = blog.current_user(session_id).await;
    render(&RegisterPage { user })
}

async fn register_submit(
    blog: Arc<Blog>,
    secure: bool,
    form: RegisterForm,
) -> Result<impl Reply, Rejection> {
    let creds = Credentials::new(form.username, form.password);

    let session_id = blog.register(&creds).await.map_err(reject::custom)?;

    let page = render(&IndexPage {
        user: Some(creds.username().into()),
    })?;
    Ok(with_session_cookie(page, &session_id, secure))
}

async fn login_page(
    blog: Arc<Blog>,
    session_id: Option<SessionId>,
) -> Result<impl Reply, Rejection> {
    let user = blog.current_user(session_id).await;
    render(&LoginPage { user })
}

async fn login_submit(
    blog: Arc<Blog>,
    secure: bool,
    form: LoginForm,
) -> Result<impl Reply, Rejection> {
    let creds = Credentials::new(form.username, form.password);

    let session_id = blog.login(&creds).await.map_err(reject::custom)?;

    let page = render(&IndexPage {
        user: Some(creds.username().into()),
    })?;
    Ok(with_session_cookie(page, &session_id, secure))
}

async fn create_page(
    blog: Arc<Blog>,
    session_id: Option<SessionId>,
) -> Result<impl Reply, Rejection> {
    let user = blog.current_user(session_id).await;
    render(&CreatePage { user })
}

async fn create_submit(blog: Arc<Blog>, form: PostForm) -> Result<impl Reply, Rejection> {
    blog.add_post(form.title, form.post_body)
        .await
        .map_err(reject::custom)?;

    Ok(warp::redirect::see_other(Uri::from_static("/posts")))
}

async fn posts_page(
    blog: Arc<Blog>,
    session_id: Option<SessionId>,
) -> Result<impl Reply, Rejection> {
    let user = blog.current_user(session_id).await;
    let posts = blog.posts().await.map_err(reject::custom)?;
    render(&PostsPage { user, posts })
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "page not found")
    } else if let Some(e) = err.find::<Error>() {
        ((*e).into(), e.message())
    } else if err.find::<warp::body::BodyDeserializeError>().is_some() {
        (StatusCode::BAD_REQUEST, "malformed form submission")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "form too large")
    } else {
        error!("unhandled rejection: {err:?}");
        (StatusCode::INTERNAL_SERVER_ERROR, "something went wrong")
    };

    let page = ErrorPage {
        status: status.as_u16(),
        message,
    };
    let html = page.render().unwrap_or_else(|_| message.into());

    Ok(reply::with_status(reply::html(html), status))
}
