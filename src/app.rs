//! Application core: screen state machine and the action loop.
//!
//! Key handling is synchronous. Screens translate key events into
//! [`Action`]s and never touch the network; the loop performs the async
//! work (API calls, session writes) and pushes fresh data back into the
//! active screen. Every authenticated screen carries its own snapshot of
//! the signed-in user, so a permission check never reads global state.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{Role, TaskDraft, TaskFilter, TaskPatch, User};
use crate::policy;
use crate::session::{self, Session, SessionStore};
use crate::ui::{
    self, dashboard::DashboardScreen, login::LoginScreen, profile::ProfileScreen,
    register::RegisterScreen, tasks::TasksScreen, users::UsersScreen,
};

// ─── Actions and navigation ──────────────────────────────────────────────

/// Authenticated top-level destinations, in nav-bar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Dashboard,
    Tasks,
    Users,
    Profile,
}

/// What a key press asks the app to do. Screens return these from their
/// `handle_key`; the loop executes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Go(Nav),
    /// Refetch the active screen's data, keeping its filters.
    Reload,
    OpenLogin,
    OpenRegister,
    SubmitLogin,
    SubmitRegister,
    SubmitTaskForm,
    DeleteTask(i64),
    SubmitUserForm,
    DeleteUser(i64),
    SubmitPassword,
    Logout,
}

pub enum Screen {
    Login(LoginScreen),
    Register(RegisterScreen),
    Dashboard(DashboardScreen),
    Tasks(TasksScreen),
    Users(UsersScreen),
    Profile(ProfileScreen),
}

/// Resolve a navigation request against the caller's role. Non-admins
/// asking for user management land on the dashboard instead.
fn nav_target(nav: Nav, role: Role) -> Nav {
    match nav {
        Nav::Users if !policy::can_manage_users(role) => Nav::Dashboard,
        other => other,
    }
}

// ─── App ─────────────────────────────────────────────────────────────────

pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub store: SessionStore,
    pub session: Option<Session>,
    pub screen: Screen,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config.api_url, config.timeout())
            .context("failed to build HTTP client")?;
        let store = SessionStore::new(&config.data_dir);
        let session = store.load();
        Ok(Self {
            config,
            api,
            store,
            session,
            screen: Screen::Login(LoginScreen::new()),
            should_quit: false,
        })
    }

    /// Start the interactive TUI loop.
    pub async fn run(mut self) -> Result<()> {
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("create terminal")?;

        let result = self.event_loop(&mut terminal).await;

        // Restore terminal regardless of result.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        // A stored session resumes straight into the dashboard. If its
        // tokens turn out dead, the load path lands back on the login
        // screen with a notice.
        if let Some(session) = &self.session {
            info!(user = %session.user.username, "resuming stored session");
            self.screen = Screen::Dashboard(DashboardScreen::new());
            terminal.draw(|f| ui::draw(f, self))?;
            self.load_current().await;
        }

        loop {
            terminal.draw(|f| ui::draw(f, self))?;
            if self.should_quit {
                break;
            }

            // Poll for terminal events (non-blocking, 50ms timeout).
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    let action = self.handle_key(&key);
                    if action != Action::None {
                        self.begin(action);
                        // Paint the pending state before the async work
                        // blocks the loop.
                        terminal.draw(|f| ui::draw(f, self))?;
                        self.run_action(action).await;
                    }
                }
            }
        }
        Ok(())
    }

    // ─── Key routing ─────────────────────────────────────────────────────

    /// Global shortcuts first, then the active screen. Plain-letter
    /// shortcuts stay out of the way while a screen is capturing text.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Action {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            return Action::Quit;
        }

        if self.session.is_some() {
            match (key.code, key.modifiers) {
                (KeyCode::Char('d'), KeyModifiers::CONTROL) => return Action::Go(Nav::Dashboard),
                (KeyCode::Char('t'), KeyModifiers::CONTROL) => return Action::Go(Nav::Tasks),
                (KeyCode::Char('u'), KeyModifiers::CONTROL) => return Action::Go(Nav::Users),
                (KeyCode::Char('p'), KeyModifiers::CONTROL) => return Action::Go(Nav::Profile),
                (KeyCode::Char('l'), KeyModifiers::CONTROL) => return Action::Logout,
                _ => {}
            }

            if !self.capturing_input() {
                match key.code {
                    KeyCode::Char('1') => return Action::Go(Nav::Dashboard),
                    KeyCode::Char('2') => return Action::Go(Nav::Tasks),
                    KeyCode::Char('3') => return Action::Go(Nav::Users),
                    KeyCode::Char('4') => return Action::Go(Nav::Profile),
                    KeyCode::Char('q') => return Action::Quit,
                    _ => {}
                }
            }
        }

        match &mut self.screen {
            Screen::Login(s) => s.handle_key(key),
            Screen::Register(s) => s.handle_key(key),
            Screen::Dashboard(s) => s.handle_key(key),
            Screen::Tasks(s) => s.handle_key(key),
            Screen::Users(s) => s.handle_key(key),
            Screen::Profile(s) => s.handle_key(key),
        }
    }

    fn capturing_input(&self) -> bool {
        match &self.screen {
            Screen::Login(_) | Screen::Register(_) => true,
            Screen::Dashboard(_) => false,
            Screen::Tasks(s) => s.capturing_input(),
            Screen::Users(s) => s.capturing_input(),
            Screen::Profile(s) => s.capturing_input(),
        }
    }

    // ─── Action execution ────────────────────────────────────────────────

    /// Flip the state that should be visible while the async part of
    /// `action` runs: screen swaps for navigation, loading and saving
    /// flags for fetches and submits.
    pub fn begin(&mut self, action: Action) {
        match action {
            Action::Go(nav) => {
                let Some(user) = self.current_user() else { return };
                match nav_target(nav, user.role) {
                    Nav::Dashboard => self.screen = Screen::Dashboard(DashboardScreen::new()),
                    Nav::Tasks => self.screen = Screen::Tasks(TasksScreen::new(user)),
                    Nav::Users => self.screen = Screen::Users(UsersScreen::new()),
                    Nav::Profile => self.screen = Screen::Profile(ProfileScreen::new(user)),
                }
            }
            Action::Reload => match &mut self.screen {
                Screen::Dashboard(s) => s.loading = true,
                Screen::Tasks(s) => s.loading = true,
                Screen::Users(s) => s.loading = true,
                _ => {}
            },
            Action::SubmitLogin => {
                if let Screen::Login(s) = &mut self.screen {
                    s.loading = true;
                }
            }
            Action::SubmitRegister => {
                if let Screen::Register(s) = &mut self.screen {
                    s.loading = true;
                }
            }
            Action::SubmitTaskForm => {
                if let Screen::Tasks(s) = &mut self.screen {
                    if let Some(form) = s.form.as_mut() {
                        form.saving = true;
                    }
                }
            }
            Action::SubmitUserForm => {
                if let Screen::Users(s) = &mut self.screen {
                    if let Some(form) = s.form.as_mut() {
                        form.saving = true;
                    }
                }
            }
            Action::SubmitPassword => {
                if let Screen::Profile(s) = &mut self.screen {
                    s.saving = true;
                }
            }
            _ => {}
        }
    }

    pub async fn run_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => self.should_quit = true,
            Action::OpenLogin => self.screen = Screen::Login(LoginScreen::new()),
            Action::OpenRegister => self.screen = Screen::Register(RegisterScreen::new()),
            Action::Go(_) | Action::Reload => self.load_current().await,
            Action::SubmitLogin => self.do_login().await,
            Action::SubmitRegister => self.do_register().await,
            Action::SubmitTaskForm => self.submit_task_form().await,
            Action::DeleteTask(id) => self.delete_task(id).await,
            Action::SubmitUserForm => self.submit_user_form().await,
            Action::DeleteUser(id) => self.delete_user(id).await,
            Action::SubmitPassword => self.submit_password().await,
            Action::Logout => self.logout().await,
        }
    }

    fn current_user(&self) -> Option<User> {
        self.session.as_ref().map(|s| s.user.clone())
    }

    fn access_token(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.access.clone())
    }

    // ─── Data loading ────────────────────────────────────────────────────

    /// Fetch the active screen's data. A 401 gets one token refresh and
    /// one retry; a second 401 means the session is gone for good.
    async fn load_current(&mut self) {
        for attempt in 0..2 {
            match self.try_load_current().await {
                Ok(()) => return,
                Err(ApiError::Unauthorized(_)) if attempt == 0 => {
                    if !self.try_refresh().await {
                        self.expire_session();
                        return;
                    }
                }
                Err(ApiError::Unauthorized(_)) => {
                    self.expire_session();
                    return;
                }
                Err(err) => {
                    self.show_load_error(&err);
                    return;
                }
            }
        }
    }

    async fn try_load_current(&mut self) -> Result<(), ApiError> {
        match &self.screen {
            Screen::Dashboard(_) => self.try_load_dashboard().await,
            Screen::Tasks(_) => self.try_load_tasks().await,
            Screen::Users(_) => self.try_load_users().await,
            _ => Ok(()),
        }
    }

    async fn try_load_dashboard(&mut self) -> Result<(), ApiError> {
        let Some(token) = self.access_token() else {
            return Ok(());
        };
        let filter = TaskFilter::default();
        let (stats, tasks) = tokio::join!(
            self.api.task_stats(&token),
            self.api.list_tasks(&token, &filter),
        );
        let (stats, tasks) = (stats?, tasks?);
        if let Screen::Dashboard(s) = &mut self.screen {
            s.loading = false;
            s.set_data(stats, tasks);
        }
        Ok(())
    }

    async fn try_load_tasks(&mut self) -> Result<(), ApiError> {
        let Some(token) = self.access_token() else {
            return Ok(());
        };
        let Some(user) = self.current_user() else {
            return Ok(());
        };
        let filter = match &self.screen {
            Screen::Tasks(s) => s.filter,
            _ => TaskFilter::default(),
        };
        let (tasks, users) = tokio::join!(
            self.api.list_tasks(&token, &filter),
            self.api.list_users(&token),
        );
        let tasks = tasks?;
        // Members may not be allowed to list users; fall back to just
        // themselves so assignee names still resolve where possible.
        let users = match users {
            Ok(users) => users,
            Err(err) => {
                warn!(err = %err, "user list unavailable, using own account only");
                vec![user]
            }
        };
        if let Screen::Tasks(s) = &mut self.screen {
            s.loading = false;
            s.set_data(tasks, users);
        }
        Ok(())
    }

    async fn try_load_users(&mut self) -> Result<(), ApiError> {
        let Some(token) = self.access_token() else {
            return Ok(());
        };
        let users = self.api.list_users(&token).await?;
        if let Screen::Users(s) = &mut self.screen {
            s.loading = false;
            s.set_data(users);
        }
        Ok(())
    }

    fn show_load_error(&mut self, err: &ApiError) {
        warn!(err = %err, "screen data load failed");
        match &mut self.screen {
            Screen::Dashboard(s) => {
                s.loading = false;
                s.error = Some("Failed to load dashboard data".to_string());
            }
            Screen::Tasks(s) => {
                s.loading = false;
                s.error = Some("Failed to load tasks".to_string());
            }
            Screen::Users(s) => {
                s.loading = false;
                s.error = Some("Failed to load users".to_string());
            }
            _ => {}
        }
    }

    // ─── Session lifecycle ───────────────────────────────────────────────

    async fn do_login(&mut self) {
        let (email, password) = match &self.screen {
            Screen::Login(s) => (s.email.trim().to_string(), s.password.clone()),
            _ => return,
        };
        match self.api.login(&email, &password).await {
            Ok(auth) => {
                info!(user = %auth.user.username, "signed in");
                self.start_session(auth.into()).await;
            }
            Err(err) => {
                warn!(err = %err, "login failed");
                if let Screen::Login(s) = &mut self.screen {
                    s.loading = false;
                    s.error = Some(
                        err.server_message()
                            .unwrap_or("Login failed")
                            .to_string(),
                    );
                }
            }
        }
    }

    async fn do_register(&mut self) {
        let req = match &self.screen {
            Screen::Register(s) => s.to_request(),
            _ => return,
        };
        match self.api.register(&req).await {
            Ok(auth) => {
                info!(user = %auth.user.username, "account created");
                self.start_session(auth.into()).await;
            }
            Err(err) => {
                warn!(err = %err, "registration failed");
                if let Screen::Register(s) = &mut self.screen {
                    s.loading = false;
                    s.error = Some(form_error(
                        &err,
                        &["username", "email", "password"],
                        "Registration failed",
                    ));
                }
            }
        }
    }

    async fn start_session(&mut self, session: Session) {
        if let Err(err) = self.store.save(&session) {
            warn!(err = %err, "failed to persist session");
        }
        self.session = Some(session);
        self.screen = Screen::Dashboard(DashboardScreen::new());
        self.load_current().await;
    }

    async fn logout(&mut self) {
        if let Err(err) = session::sign_out(&self.api, &self.store).await {
            warn!(err = %err, "sign out cleanup failed");
        }
        info!("signed out");
        self.session = None;
        self.screen = Screen::Login(LoginScreen::new());
    }

    /// One shot at exchanging the refresh token for a new access token.
    async fn try_refresh(&mut self) -> bool {
        let Some(refresh) = self.session.as_ref().map(|s| s.refresh.clone()) else {
            return false;
        };
        match self.api.refresh(&refresh).await {
            Ok(tokens) => {
                if let Some(session) = self.session.as_mut() {
                    session.access = tokens.access;
                    if let Some(rotated) = tokens.refresh {
                        session.refresh = rotated;
                    }
                }
                if let Some(session) = &self.session {
                    if let Err(err) = self.store.save(session) {
                        warn!(err = %err, "failed to persist refreshed session");
                    }
                }
                info!("access token refreshed");
                true
            }
            Err(err) => {
                warn!(err = %err, "token refresh failed");
                false
            }
        }
    }

    /// Hard sign-out after a failed refresh. Local state only; by this
    /// point the server already considers the tokens dead.
    fn expire_session(&mut self) {
        if let Err(err) = self.store.clear() {
            warn!(err = %err, "failed to clear session file");
        }
        self.session = None;
        self.screen = Screen::Login(LoginScreen::with_notice(
            "Your session has expired. Please sign in again.",
        ));
    }

    /// A mutation came back 401. Refresh once and reload the screen's
    /// data; the mutation itself is never replayed.
    async fn recover_unauthorized(&mut self) {
        if self.try_refresh().await {
            self.load_current().await;
        } else {
            self.expire_session();
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    async fn submit_task_form(&mut self) {
        let Some(token) = self.access_token() else {
            return;
        };

        enum Req {
            Create(TaskDraft),
            Update(i64, TaskPatch),
        }
        let req = {
            let Screen::Tasks(s) = &mut self.screen else {
                return;
            };
            let role = s.current_user.role;
            let Some(form) = s.form.as_mut() else {
                return;
            };
            let built = match form.editing {
                Some(id) => form.build_patch(role).map(|p| Req::Update(id, p)),
                None => form.build_draft().map(Req::Create),
            };
            match built {
                Ok(req) => req,
                Err(msg) => {
                    form.saving = false;
                    form.error = Some(msg);
                    return;
                }
            }
        };

        let result = match &req {
            Req::Create(draft) => self.api.create_task(&token, draft).await.map(|_| ()),
            Req::Update(id, patch) => self.api.update_task(&token, *id, patch).await.map(|_| ()),
        };

        match result {
            Ok(()) => {
                if let Screen::Tasks(s) = &mut self.screen {
                    s.form = None;
                    s.loading = true;
                }
                self.load_current().await;
            }
            Err(ApiError::Unauthorized(_)) => self.recover_unauthorized().await,
            Err(err) => {
                warn!(err = %err, "task save failed");
                if let Screen::Tasks(s) = &mut self.screen {
                    if let Some(form) = s.form.as_mut() {
                        form.saving = false;
                        form.error = Some(error_text(&err));
                    }
                }
            }
        }
    }

    async fn delete_task(&mut self, id: i64) {
        let Some(token) = self.access_token() else {
            return;
        };
        match self.api.delete_task(&token, id).await {
            Ok(()) => {
                if let Screen::Tasks(s) = &mut self.screen {
                    s.loading = true;
                }
                self.load_current().await;
            }
            Err(ApiError::Unauthorized(_)) => self.recover_unauthorized().await,
            Err(err) => {
                warn!(err = %err, task = id, "task delete failed");
                if let Screen::Tasks(s) = &mut self.screen {
                    s.error = Some(format!("Error deleting task: {}", error_text(&err)));
                }
            }
        }
    }

    async fn submit_user_form(&mut self) {
        let Some(token) = self.access_token() else {
            return;
        };

        enum Req {
            Create(crate::models::NewUser),
            Update(i64, crate::models::UserUpdate),
        }
        let req = {
            let Screen::Users(s) = &mut self.screen else {
                return;
            };
            let Some(form) = s.form.as_mut() else {
                return;
            };
            let built = match form.editing {
                Some(id) => form.to_update().map(|u| Req::Update(id, u)),
                None => form.to_new_user().map(Req::Create),
            };
            match built {
                Ok(req) => req,
                Err(msg) => {
                    form.saving = false;
                    form.error = Some(msg);
                    return;
                }
            }
        };

        let result = match &req {
            Req::Create(user) => self.api.create_user(&token, user).await.map(|_| ()),
            Req::Update(id, update) => self.api.update_user(&token, *id, update).await.map(|_| ()),
        };

        match result {
            Ok(()) => {
                if let Screen::Users(s) = &mut self.screen {
                    s.form = None;
                    s.loading = true;
                }
                self.load_current().await;
            }
            Err(ApiError::Unauthorized(_)) => self.recover_unauthorized().await,
            Err(err) => {
                warn!(err = %err, "user save failed");
                if let Screen::Users(s) = &mut self.screen {
                    if let Some(form) = s.form.as_mut() {
                        form.saving = false;
                        form.error = Some(form_error(
                            &err,
                            &["email", "username"],
                            "An error occurred",
                        ));
                    }
                }
            }
        }
    }

    async fn delete_user(&mut self, id: i64) {
        let Some(token) = self.access_token() else {
            return;
        };
        match self.api.delete_user(&token, id).await {
            Ok(()) => {
                if let Screen::Users(s) = &mut self.screen {
                    s.loading = true;
                }
                self.load_current().await;
            }
            Err(ApiError::Unauthorized(_)) => self.recover_unauthorized().await,
            Err(err) => {
                warn!(err = %err, user = id, "user delete failed");
                if let Screen::Users(s) = &mut self.screen {
                    s.error = Some(format!("Error deleting user: {}", error_text(&err)));
                }
            }
        }
    }

    async fn submit_password(&mut self) {
        let Some(token) = self.access_token() else {
            return;
        };
        let change = match &self.screen {
            Screen::Profile(s) => s.to_request(),
            _ => return,
        };
        match self.api.change_password(&token, &change).await {
            Ok(()) => {
                info!("password changed");
                if let Screen::Profile(s) = &mut self.screen {
                    s.mark_saved();
                }
            }
            Err(ApiError::Unauthorized(_)) => self.recover_unauthorized().await,
            Err(err) => {
                warn!(err = %err, "password change failed");
                if let Screen::Profile(s) = &mut self.screen {
                    s.saving = false;
                    s.error = Some(form_error(
                        &err,
                        &["old_password", "new_password"],
                        "Failed to change password",
                    ));
                }
            }
        }
    }
}

// ─── Error wording ───────────────────────────────────────────────────────

/// Server's own words when it sent any, the error display otherwise.
fn error_text(err: &ApiError) -> String {
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}

/// Form-style error wording: probe the validation field map in the given
/// priority order, then the server message, then the fallback.
fn form_error(err: &ApiError, order: &[&str], fallback: &str) -> String {
    if let Some(fields) = err.fields() {
        return fields
            .first_of(order)
            .unwrap_or(fallback)
            .to_string();
    }
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

impl From<crate::models::AuthResponse> for Session {
    fn from(auth: crate::models::AuthResponse) -> Self {
        Session {
            access: auth.access,
            refresh: auth.refresh,
            user: auth.user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn user(role: Role) -> User {
        User {
            id: 7,
            username: "casey".into(),
            email: "casey@example.com".into(),
            first_name: "Casey".into(),
            last_name: "Reed".into(),
            role,
        }
    }

    fn app_with(role: Option<Role>) -> App {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::new(None, Some(dir.path().to_path_buf()), None);
        let mut app = App::new(config).expect("app");
        if let Some(role) = role {
            let user = user(role);
            app.session = Some(Session {
                access: "acc".into(),
                refresh: "ref".into(),
                user: user.clone(),
            });
            app.screen = Screen::Tasks(TasksScreen::new(user));
        }
        app
    }

    #[test]
    fn users_nav_needs_admin() {
        assert_eq!(nav_target(Nav::Users, Role::Admin), Nav::Users);
        assert_eq!(nav_target(Nav::Users, Role::Manager), Nav::Dashboard);
        assert_eq!(nav_target(Nav::Users, Role::Member), Nav::Dashboard);
        assert_eq!(nav_target(Nav::Tasks, Role::Member), Nav::Tasks);
    }

    #[test]
    fn digit_keys_navigate_when_signed_in() {
        let mut app = app_with(Some(Role::Member));
        assert_eq!(app.handle_key(&key(KeyCode::Char('1'))), Action::Go(Nav::Dashboard));
        assert_eq!(app.handle_key(&key(KeyCode::Char('4'))), Action::Go(Nav::Profile));
        assert_eq!(app.handle_key(&key(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn digits_type_into_the_login_form() {
        let mut app = app_with(None);
        assert_eq!(app.handle_key(&key(KeyCode::Char('1'))), Action::None);
        if let Screen::Login(s) = &app.screen {
            assert_eq!(s.email, "1");
        } else {
            panic!("expected login screen");
        }
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let mut app = app_with(None);
        assert_eq!(app.handle_key(&ctrl('c')), Action::Quit);
        let mut app = app_with(Some(Role::Admin));
        assert_eq!(app.handle_key(&ctrl('c')), Action::Quit);
    }

    #[test]
    fn nav_chords_and_logout_require_a_session() {
        let mut app = app_with(None);
        // Ctrl+L on the login screen is just an ignored key.
        assert_eq!(app.handle_key(&ctrl('l')), Action::None);

        let mut app = app_with(Some(Role::Admin));
        assert_eq!(app.handle_key(&ctrl('u')), Action::Go(Nav::Users));
        assert_eq!(app.handle_key(&ctrl('l')), Action::Logout);
    }

    #[test]
    fn begin_swaps_screens_and_guards_users_nav() {
        let mut app = app_with(Some(Role::Member));
        app.begin(Action::Go(Nav::Users));
        assert!(matches!(app.screen, Screen::Dashboard(_)));

        let mut app = app_with(Some(Role::Admin));
        app.begin(Action::Go(Nav::Users));
        assert!(matches!(app.screen, Screen::Users(_)));
    }

    #[test]
    fn form_error_prefers_listed_fields() {
        let err = crate::error::classify(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"username": ["taken"], "email": ["user with this email already exists."]}"#,
        );
        assert_eq!(
            form_error(&err, &["email", "username"], "An error occurred"),
            "user with this email already exists."
        );
        assert_eq!(
            form_error(&err, &["first_name"], "An error occurred"),
            "An error occurred"
        );
    }

    #[test]
    fn error_text_uses_server_words_first() {
        let err = crate::error::classify(
            reqwest::StatusCode::FORBIDDEN,
            r#"{"error": "You do not have permission to delete this task"}"#,
        );
        assert_eq!(error_text(&err), "You do not have permission to delete this task");
    }
}
