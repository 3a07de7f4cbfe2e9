use askama::Template;

use crate::post::Post;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub user: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub user: Option<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub user: Option<String>,
}

#[derive(Template)]
#[template(path = "create.html")]
pub struct CreatePage {
    pub user: Option<String>,
}

#[derive(Template)]
#[template(path = "posts.html")]
pub struct PostsPage {
    pub user: Option<String>,
    pub posts: Vec<Post>,
}

/// Standalone page: errors are rendered without the nav, which would
/// otherwise misreport the login state of whoever hit the error.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub status: u16,
    pub message: &'static str,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::time::Timestamp;

    #[test]
    fn posts_page_lists_titles_before_bodies() {
        let page = PostsPage {
            user: None,
            posts: vec![Post {
                title: "T".into(),
                body: "B".into(),
                created: Timestamp::default(),
            }],
        };

        let html = page.render().unwrap();
        let title = html.find("T").unwrap();
        let body = html.find("B").unwrap();
        assert!(title < body);
    }

    #[test]
    fn nav_shows_the_logged_in_user() {
        let html = IndexPage {
            user: Some("alice".into()),
        }
        .render()
        .unwrap();
        assert!(html.contains("alice"));

        let html = IndexPage { user: None }.render().unwrap();
        assert!(html.contains("/login"));
    }

    #[test]
    fn error_page_carries_the_status() {
        let html = ErrorPage {
            status: 404,
            message: "page not found",
        }
        .render()
        .unwrap();

        assert!(html.contains("404"));
        assert!(html.contains("page not found"));
    }

    #[test]
    fn error_page_claims_nothing_about_login_state() {
        let html = ErrorPage {
            status: 500,
            message: "something went wrong",
        }
        .render()
        .unwrap();

        assert!(!html.contains("/login"));
        assert!(!html.contains("/register"));
    }
}
