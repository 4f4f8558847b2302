use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use leads_ingest::load_leads;

use crate::auth::{self, AdminSession};
use crate::templates::{render_dashboard, render_login};
use crate::AppState;

pub async fn index() -> Response {
    redirect("/admin", None)
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn admin_page(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    session: Result<AdminSession, Response>,
) -> Response {
    // First `logout` wins; repeated keys are not an error
    let logout = uri
        .query()
        .and_then(|q| auth::query_param(q, "logout"))
        .is_some_and(|v| !v.is_empty());
    if logout {
        return redirect("/admin", Some(auth::clear_session_cookie()));
    }

    if let Err(login_page) = session {
        return login_page;
    }

    let root = state.config.leads_path.clone();
    let date_prefix = state.config.date_prefix.clone();
    match tokio::task::spawn_blocking(move || load_leads(&root, &date_prefix)).await {
        Ok(aggregate) => Html(render_dashboard(&aggregate)).into_response(),
        Err(e) => {
            error!(error = %e, "Lead aggregation task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("Error loading leads".to_string()),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub secret: String,
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    // An unreadable body counts as a missing secret
    let secret = form.ok().map(|Form(f)| f.secret);
    if secret.is_some_and(|s| state.auth.check_secret(&s)) {
        info!("Admin login accepted");
        let cookie = auth::session_cookie(&state.auth.session_token());
        return redirect("/admin", Some(cookie));
    }

    warn!("Admin login rejected");
    Html(render_login(Some("Invalid admin secret"))).into_response()
}

fn redirect(location: &str, set_cookie: Option<String>) -> Response {
    let mut response = (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response();
    if let Some(cookie) = set_cookie {
        match cookie.parse() {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => error!(error = %e, "Invalid Set-Cookie header"),
        }
    }
    response
}
