// Operator interface
// Askama templates rendered server-side, one page per view of the desk

pub mod labels;
mod session;
mod templates;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::db::{CustomerInput, CustomerQuery, CustomerType, DashboardSummary, TypeFilter};
use crate::error::{CrmError, ValidationError};
use crate::AppState;

use labels::{fill, Labels, LABELS};
pub use session::{CurrentSession, SessionRegistry, SESSION_COOKIE};
pub use templates::*;

// Helper to render templates and handle errors
fn render_template<T: Template>(status: StatusCode, template: T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Template error: {}", e),
        )
            .into_response(),
    }
}

/// Status for a failed action: bad input is the operator's to fix
fn error_status(err: &CrmError) -> StatusCode {
    match err {
        CrmError::Storage(_) | CrmError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CrmError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
        .route("/", get(dashboard))
        .route("/customers", get(customers_list))
        .route("/customers/new", get(customer_new_form).post(customer_create))
        .route(
            "/customers/:id/edit",
            get(customer_edit_form).post(customer_update),
        )
        .route(
            "/customers/:id/delete",
            get(customer_delete_confirm).post(customer_delete),
        )
        .route("/settings", get(settings_page))
        .route("/settings/password", post(password_submit))
        .route("/settings/backup", post(backup_submit))
        .route("/settings/restore", get(restore_page).post(restore_submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn labels() -> &'static Labels {
    &LABELS
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

async fn login_page() -> Response {
    render_template(
        StatusCode::OK,
        LoginTemplate {
            labels: labels(),
            notice: None,
            username: String::new(),
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let username = form.username.trim();
    match state.desk.login(username, &form.password).await {
        Ok(session) => {
            let jar = jar.add(
                Cookie::build((SESSION_COOKIE, session.token.clone()))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .build(),
            );
            state.sessions.insert(session);
            (jar, Redirect::to("/?welcome=1")).into_response()
        }
        Err(e) => render_template(
            error_status(&e),
            LoginTemplate {
                labels: labels(),
                notice: Some(Notice::from_error(labels(), labels().fail_generic, &e)),
                username: username.to_string(),
                version: env!("CARGO_PKG_VERSION"),
            },
        ),
    }
}

async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value());
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/login"))
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
struct DashboardParams {
    welcome: Option<u8>,
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Query(params): Query<DashboardParams>,
) -> Response {
    let notice = params
        .welcome
        .map(|_| welcome(labels(), &session.username));
    render_dashboard(&state, session.username, notice).await
}

/// Fetch fresh counts and render the dashboard. A notice passed in wins over
/// a failure to load the counts, so the outcome of a restore is always shown.
async fn render_dashboard(state: &AppState, user: String, notice: Option<Notice>) -> Response {
    let (summary, notice) = match state.desk.dashboard().await {
        Ok(summary) => (summary, notice),
        Err(e) => (
            DashboardSummary::default(),
            notice.or_else(|| Some(Notice::from_error(labels(), labels().fail_generic, &e))),
        ),
    };

    render_template(
        StatusCode::OK,
        DashboardTemplate {
            labels: labels(),
            user,
            notice,
            summary,
        },
    )
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

/// Outcome of a write, carried across the redirect back to the list
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Done {
    Added,
    Updated,
    Deleted,
    Missing,
}

impl Done {
    fn notice(self) -> Notice {
        let l = labels();
        match self {
            Done::Added => Notice::info(l.title_success, l.msg_customer_added),
            Done::Updated => Notice::info(l.title_success, l.msg_customer_updated),
            Done::Deleted => Notice::info(l.title_success, l.msg_customer_deleted),
            Done::Missing => Notice::info(l.title_hint, l.msg_customer_missing),
        }
    }
}

#[derive(Deserialize, Default)]
struct ListParams {
    #[serde(default)]
    q: String,
    #[serde(default, rename = "type")]
    customer_type: String,
    done: Option<Done>,
}

async fn customers_list(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Query(params): Query<ListParams>,
) -> Response {
    let query = CustomerQuery::new(params.q.trim(), TypeFilter::parse(&params.customer_type));
    render_customers(&state, session.username, &query, params.done.map(Done::notice)).await
}

async fn render_customers(
    state: &AppState,
    user: String,
    query: &CustomerQuery,
    notice: Option<Notice>,
) -> Response {
    let (customers, notice, status) = match state.desk.search_customers(query).await {
        Ok(customers) => (customers, notice, StatusCode::OK),
        Err(e) => (
            Vec::new(),
            Some(Notice::from_error(labels(), labels().fail_generic, &e)),
            error_status(&e),
        ),
    };

    render_template(
        status,
        CustomersTemplate {
            labels: labels(),
            user,
            notice,
            customers,
            search: query.text.clone(),
            type_options: type_options(query.type_filter.as_str(), true),
        },
    )
}

#[derive(Deserialize)]
struct CustomerForm {
    #[serde(default)]
    company_name: String,
    #[serde(default)]
    contact_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    customer_type: String,
    #[serde(default)]
    notes: String,
    /// Echoed back by the edit form for display only
    #[serde(default)]
    registration_date: Option<String>,
}

impl CustomerForm {
    fn input(&self) -> Result<CustomerInput, CrmError> {
        let customer_type = CustomerType::from_str(&self.customer_type)
            .ok_or(ValidationError::UnknownCustomerType)?;
        Ok(CustomerInput::new(
            self.company_name.as_str(),
            self.contact_name.as_str(),
            self.phone.as_str(),
            customer_type,
            self.notes.as_str(),
        ))
    }

    fn values(&self) -> CustomerFormValues {
        CustomerFormValues {
            company_name: self.company_name.clone(),
            contact_name: self.contact_name.clone(),
            phone: self.phone.clone(),
            customer_type: self.customer_type.clone(),
            notes: self.notes.clone(),
        }
    }
}

fn customer_form_page(
    status: StatusCode,
    user: String,
    notice: Option<Notice>,
    edit: Option<(i64, Option<String>)>,
    form: CustomerFormValues,
) -> Response {
    let (heading, action, registration_date) = match edit {
        Some((id, date)) => (
            labels().edit_customer,
            format!("/customers/{}/edit", id),
            Some(date.unwrap_or_default()),
        ),
        None => (labels().add_customer, "/customers/new".to_string(), None),
    };
    let selected = if form.customer_type.is_empty() {
        CustomerType::CleanCoal.as_str().to_string()
    } else {
        form.customer_type.clone()
    };

    render_template(
        status,
        CustomerFormTemplate {
            labels: labels(),
            user,
            notice,
            heading,
            action,
            type_options: type_options(&selected, false),
            form,
            registration_date,
        },
    )
}

async fn customer_new_form(CurrentSession(session): CurrentSession) -> Response {
    customer_form_page(
        StatusCode::OK,
        session.username,
        None,
        None,
        CustomerFormValues::default(),
    )
}

async fn customer_create(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<CustomerForm>,
) -> Response {
    let result = match form.input() {
        Ok(input) => state.desk.add_customer(&input).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => Redirect::to("/customers?done=added").into_response(),
        Err(e) => customer_form_page(
            error_status(&e),
            session.username,
            Some(Notice::from_error(labels(), labels().fail_generic, &e)),
            None,
            form.values(),
        ),
    }
}

async fn customer_edit_form(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
) -> Response {
    match state.desk.customer(id).await {
        Ok(Some(customer)) => customer_form_page(
            StatusCode::OK,
            session.username,
            None,
            Some((customer.id, Some(customer.registration_date.clone()))),
            CustomerFormValues::from(&customer),
        ),
        Ok(None) => Redirect::to("/customers?done=missing").into_response(),
        Err(e) => {
            render_customers(
                &state,
                session.username,
                &CustomerQuery::all(),
                Some(Notice::from_error(labels(), labels().fail_generic, &e)),
            )
            .await
        }
    }
}

async fn customer_update(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
    Form(form): Form<CustomerForm>,
) -> Response {
    let result = match form.input() {
        Ok(input) => state.desk.update_customer(id, &input).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Redirect::to("/customers?done=updated").into_response(),
        Err(e) => customer_form_page(
            error_status(&e),
            session.username,
            Some(Notice::from_error(labels(), labels().fail_generic, &e)),
            Some((id, form.registration_date.clone())),
            form.values(),
        ),
    }
}

async fn customer_delete_confirm(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
) -> Response {
    match state.desk.customer(id).await {
        Ok(Some(customer)) => {
            let prompt = fill(labels().confirm_delete_prompt, &customer.company_name);
            render_template(
                StatusCode::OK,
                ConfirmDeleteTemplate {
                    labels: labels(),
                    user: session.username,
                    notice: None,
                    customer,
                    prompt,
                },
            )
        }
        Ok(None) => Redirect::to("/customers?done=missing").into_response(),
        Err(e) => {
            render_customers(
                &state,
                session.username,
                &CustomerQuery::all(),
                Some(Notice::from_error(labels(), labels().fail_generic, &e)),
            )
            .await
        }
    }
}

async fn customer_delete(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
) -> Response {
    match state.desk.delete_customer(id).await {
        Ok(()) => Redirect::to("/customers?done=deleted").into_response(),
        Err(e) => {
            render_customers(
                &state,
                session.username,
                &CustomerQuery::all(),
                Some(Notice::from_error(labels(), labels().fail_delete, &e)),
            )
            .await
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

fn settings(
    state: &AppState,
    status: StatusCode,
    user: String,
    notice: Option<Notice>,
) -> Response {
    render_template(
        status,
        SettingsTemplate {
            labels: labels(),
            user,
            notice,
            version: env!("CARGO_PKG_VERSION"),
            database_location: fill(
                labels().info_database,
                &state.config.database_path().display().to_string(),
            ),
        },
    )
}

async fn settings_page(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    settings(&state, StatusCode::OK, session.username, None)
}

#[derive(Deserialize)]
struct PasswordForm {
    #[serde(default)]
    current_password: String,
    #[serde(default)]
    new_password: String,
    #[serde(default)]
    confirm_password: String,
}

async fn password_submit(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<PasswordForm>,
) -> Response {
    let result = state
        .desk
        .change_password(
            &session,
            &form.current_password,
            &form.new_password,
            &form.confirm_password,
        )
        .await;

    match result {
        Ok(()) => settings(
            &state,
            StatusCode::OK,
            session.username,
            Some(Notice::info(
                labels().title_success,
                labels().msg_password_updated,
            )),
        ),
        Err(e) => settings(
            &state,
            error_status(&e),
            session.username,
            Some(Notice::from_error(labels(), labels().fail_generic, &e)),
        ),
    }
}

async fn backup_submit(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    match state.desk.backup().await {
        Ok(path) => settings(
            &state,
            StatusCode::OK,
            session.username,
            Some(Notice::info(
                labels().title_success,
                fill(labels().msg_backup_done, &path.display().to_string()),
            )),
        ),
        Err(e) => settings(
            &state,
            error_status(&e),
            session.username,
            Some(Notice::from_error(labels(), labels().fail_backup, &e)),
        ),
    }
}

async fn restore_page(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    match state.desk.list_backups().await {
        Ok(backups) if backups.is_empty() => settings(
            &state,
            StatusCode::OK,
            session.username,
            Some(Notice::from_error(
                labels(),
                labels().fail_restore,
                &CrmError::NoBackups,
            )),
        ),
        Ok(backups) => render_template(
            StatusCode::OK,
            RestoreTemplate {
                labels: labels(),
                user: session.username,
                notice: None,
                backups,
            },
        ),
        Err(e) => settings(
            &state,
            error_status(&e),
            session.username,
            Some(Notice::from_error(labels(), labels().fail_restore, &e)),
        ),
    }
}

#[derive(Deserialize)]
struct RestoreForm {
    #[serde(default)]
    file_name: String,
    confirm: Option<String>,
}

async fn restore_submit(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<RestoreForm>,
) -> Response {
    if form.confirm.is_none() {
        let backups = state.desk.list_backups().await.unwrap_or_default();
        return render_template(
            StatusCode::UNPROCESSABLE_ENTITY,
            RestoreTemplate {
                labels: labels(),
                user: session.username,
                notice: Some(Notice::info(
                    labels().title_hint,
                    labels().msg_restore_unconfirmed,
                )),
                backups,
            },
        );
    }

    let notice = match state.desk.restore(&form.file_name).await {
        Ok(()) => Notice::info(labels().title_success, labels().msg_restore_done),
        Err(e) => Notice::from_error(labels(), labels().fail_restore, &e),
    };

    // The dashboard is shown after every restore attempt, whatever the outcome
    render_dashboard(&state, session.username, Some(notice)).await
}
