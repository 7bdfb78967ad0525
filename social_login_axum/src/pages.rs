use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use social_login::{AUTH_ROUTE_PREFIX, UserProfile, current_user};

use crate::config::FAILURE_PATH;
use crate::session::AuthSession;
use crate::state::AuthState;

struct ProviderLink {
    href: String,
    label: &'static str,
}

#[derive(Template)]
#[template(path = "index_user.j2", escape = "html")]
struct IndexTemplateUser<'a> {
    message: &'a str,
    picture: &'a str,
}

#[derive(Template)]
#[template(path = "index_anon.j2", escape = "html")]
struct IndexTemplateAnon<'a> {
    message: &'a str,
    providers: Vec<ProviderLink>,
}

#[derive(Template)]
#[template(path = "success.j2", escape = "html")]
struct SuccessTemplate<'a> {
    name: &'a str,
    id: &'a str,
    email: &'a str,
    picture: &'a str,
}

#[derive(Template)]
#[template(path = "failure.j2", escape = "html")]
struct FailureTemplate<'a> {
    message: &'a str,
}

fn render(template: &impl Template) -> Result<Html<String>, (StatusCode, String)> {
    template.render().map(Html).map_err(|e| {
        tracing::error!("Failed to render template: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

pub(super) async fn index(
    State(state): State<AuthState>,
    session: AuthSession,
) -> Result<Html<String>, (StatusCode, String)> {
    match current_user(&*session).await {
        Some(user) => {
            let message = format!("Hey {}!", user.display_name());
            render(&IndexTemplateUser {
                message: &message,
                picture: user.picture.as_deref().unwrap_or_default(),
            })
        }
        None => {
            let providers = state
                .orchestrator()
                .registry()
                .providers()
                .into_iter()
                .map(|id| ProviderLink {
                    href: format!("{AUTH_ROUTE_PREFIX}/{id}"),
                    label: id.display_name(),
                })
                .collect();
            render(&IndexTemplateAnon {
                message: "Click a button below to log in.",
                providers,
            })
        }
    }
}

pub(super) async fn success(session: AuthSession) -> Result<Response, (StatusCode, String)> {
    let Some(user) = current_user(&*session).await else {
        tracing::debug!("No user in session, redirecting to {}", FAILURE_PATH);
        return Ok(Redirect::temporary(FAILURE_PATH).into_response());
    };
    Ok(render_success(&user)?.into_response())
}

fn render_success(user: &UserProfile) -> Result<Html<String>, (StatusCode, String)> {
    render(&SuccessTemplate {
        name: user.display_name(),
        id: &user.id,
        email: user.email.as_deref().unwrap_or_default(),
        picture: user.picture.as_deref().unwrap_or_default(),
    })
}

pub(super) async fn failure() -> Result<Html<String>, (StatusCode, String)> {
    render(&FailureTemplate {
        message: "Login failed. Please try again.",
    })
}
