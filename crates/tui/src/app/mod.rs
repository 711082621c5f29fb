use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::Utc;
use chrono_tz::Tz;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use api_types::month::{DiscountEntryView, MonthClose, MonthView};
use engine::{ChartSlot, EntryField, Ledger, MonthPeriod};

use crate::{
    client::{Client, ClientError, Credentials, message_for_error},
    config::AppConfig,
    error::{AppError, Result},
    ui::{
        self,
        components::charts::{TerminalChart, chart_data},
        keymap::AppAction,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Ledger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Month,
    Received,
    Entry(usize, EntryField),
}

/// In-progress text edit. Every keystroke is applied to the ledger right
/// away; `original` is restored on cancel. The month is only applied on
/// commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    pub target: EditTarget,
    pub buffer: String,
    original: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Pdf,
}

impl ExportKind {
    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }
}

pub struct AppState {
    pub login: LoginState,
    pub session: Option<Credentials>,
    pub ledger: Ledger,
    pub selected: usize,
    pub column: EntryField,
    pub editor: Option<Editor>,
    pub month: MonthPeriod,
    pub latest: Option<MonthView>,
    pub chart: ChartSlot<TerminalChart>,
    pub toast: Option<ToastState>,
    pub dark: bool,
}

impl AppState {
    pub fn new(username: String, month: MonthPeriod, dark: bool) -> Self {
        Self {
            login: LoginState {
                username,
                password: String::new(),
                focus: LoginField::Username,
                message: None,
            },
            session: None,
            ledger: Ledger::new(),
            selected: 0,
            column: EntryField::Description,
            editor: None,
            month,
            latest: None,
            chart: ChartSlot::new(TerminalChart::default()),
            toast: None,
            dark,
        }
    }

    /// The ledger is only reachable with a session.
    pub fn screen(&self) -> Screen {
        if self.session.is_some() {
            Screen::Ledger
        } else {
            Screen::Login
        }
    }

    fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(ToastState {
            message: message.into(),
            level,
        });
    }

    fn login_credentials(&self) -> Option<Credentials> {
        let username = self.login.username.trim();
        let password = self.login.password.trim();
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn active_login_field_mut(&mut self) -> &mut String {
        match self.login.focus {
            LoginField::Username => &mut self.login.username,
            LoginField::Password => &mut self.login.password,
        }
    }

    fn advance_login_focus(&mut self) {
        self.login.focus = match self.login.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    pub fn signed_in(&mut self, credentials: Credentials) {
        self.login.password.clear();
        self.login.message = None;
        self.session = Some(credentials);
    }

    /// Drops the session and every piece of per-user state.
    pub fn sign_out(&mut self, message: Option<String>) {
        self.session = None;
        self.login.password.clear();
        self.login.focus = LoginField::Password;
        self.login.message = message;
        self.ledger.reset();
        self.selected = 0;
        self.editor = None;
        self.toast = None;
        self.set_latest(None);
    }

    pub fn set_latest(&mut self, latest: Option<MonthView>) {
        let owner = self
            .session
            .as_ref()
            .map_or(self.login.username.as_str(), |session| session.username.as_str());
        match latest.as_ref().and_then(|view| chart_data(view, owner)) {
            Some(data) => self.chart.show(&data),
            None => self.chart.clear(),
        }
        self.latest = latest;
    }

    pub fn select_next(&mut self) {
        let len = self.ledger.entries().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn column_right(&mut self) {
        self.column = match self.column {
            EntryField::Description => EntryField::Amount,
            EntryField::Amount | EntryField::Paid => EntryField::Paid,
        };
    }

    pub fn column_left(&mut self) {
        self.column = match self.column {
            EntryField::Paid => EntryField::Amount,
            EntryField::Amount | EntryField::Description => EntryField::Description,
        };
    }

    /// Appends a blank row and starts editing its description.
    pub fn add_entry(&mut self) {
        self.selected = self.ledger.add_entry();
        self.column = EntryField::Description;
        self.begin_edit(EditTarget::Entry(self.selected, EntryField::Description));
    }

    pub fn remove_selected(&mut self) {
        match self.ledger.remove_entry(self.selected) {
            Ok(_) => {
                let len = self.ledger.entries().len();
                self.selected = self.selected.min(len.saturating_sub(1));
            }
            Err(err) => self.toast(ToastLevel::Error, err.to_string()),
        }
    }

    pub fn toggle_selected_paid(&mut self) {
        if let Err(err) = self.ledger.toggle_paid(self.selected) {
            self.toast(ToastLevel::Error, err.to_string());
        }
    }

    /// Enter on a cell: the paid column toggles, the others open an editor.
    pub fn activate_cell(&mut self) {
        if self.ledger.is_empty() {
            return;
        }
        match self.column {
            EntryField::Paid => self.toggle_selected_paid(),
            field => self.begin_edit(EditTarget::Entry(self.selected, field)),
        }
    }

    pub fn begin_edit(&mut self, target: EditTarget) {
        let original = match target {
            EditTarget::Month => self.month.to_string(),
            EditTarget::Received => {
                let received = self.ledger.received();
                if received.is_zero() {
                    String::new()
                } else {
                    received.to_decimal_string()
                }
            }
            EditTarget::Entry(index, field) => {
                let Some(entry) = self.ledger.entries().get(index) else {
                    return;
                };
                match field {
                    EntryField::Description => entry.description.clone(),
                    EntryField::Amount if entry.amount.is_zero() => String::new(),
                    EntryField::Amount => entry.amount.to_decimal_string(),
                    EntryField::Paid => return,
                }
            }
        };
        self.editor = Some(Editor {
            target,
            buffer: original.clone(),
            original,
        });
    }

    fn apply_edit(&mut self, target: EditTarget, raw: &str) {
        match target {
            EditTarget::Month => {}
            EditTarget::Received => self.ledger.set_received(raw),
            EditTarget::Entry(index, field) => {
                if let Err(err) = self.ledger.update_entry(index, field, raw) {
                    self.editor = None;
                    self.toast(ToastLevel::Error, err.to_string());
                }
            }
        }
    }

    pub fn edit_input(&mut self, ch: char) {
        if let Some(editor) = self.editor.as_mut() {
            editor.buffer.push(ch);
            let (target, raw) = (editor.target, editor.buffer.clone());
            self.apply_edit(target, &raw);
        }
    }

    pub fn edit_backspace(&mut self) {
        if let Some(editor) = self.editor.as_mut() {
            editor.buffer.pop();
            let (target, raw) = (editor.target, editor.buffer.clone());
            self.apply_edit(target, &raw);
        }
    }

    pub fn commit_edit(&mut self) {
        let Some(editor) = self.editor.take() else {
            return;
        };
        if editor.target == EditTarget::Month {
            match editor.buffer.parse::<MonthPeriod>() {
                Ok(month) => self.month = month,
                Err(err) => self.toast(ToastLevel::Error, err.to_string()),
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        if let Some(editor) = self.editor.take() {
            self.apply_edit(editor.target, &editor.original);
        }
    }

    /// Request body for closing the current month.
    pub fn close_payload(&self) -> MonthClose {
        MonthClose {
            month: self.month.to_string(),
            received_minor: self.ledger.received().cents(),
            entries: self
                .ledger
                .entries()
                .iter()
                .map(|entry| DiscountEntryView {
                    id: Some(entry.id),
                    description: entry.description.clone(),
                    amount_minor: entry.amount.cents(),
                    paid: entry.paid,
                })
                .collect(),
        }
    }

    /// Applies the outcome of a close request. The ledger is cleared only
    /// when the server confirmed the insert.
    pub fn month_closed(&mut self, result: std::result::Result<MonthView, ClientError>) {
        match result {
            Ok(view) => {
                self.ledger.reset();
                self.selected = 0;
                self.editor = None;
                let message = format!(
                    "Month closed, remainder {}",
                    engine::MoneyCents::new(view.remainder_minor)
                );
                self.set_latest(Some(view));
                self.toast(ToastLevel::Success, message);
            }
            Err(ClientError::Unauthorized) => {
                self.sign_out(Some("Session expired, sign in again.".to_string()));
            }
            Err(err) => self.toast(ToastLevel::Error, message_for_error(err)),
        }
    }

    pub fn export(&self, kind: ExportKind, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("sobra-{}.{}", self.month, kind.extension()));
        let entries = self.ledger.entries();
        let bytes = match kind {
            ExportKind::Csv => engine::to_csv(entries)?,
            ExportKind::Pdf => engine::to_pdf(
                &format!("Sobra: {}", self.month.label_pt_br()),
                self.ledger.received(),
                self.ledger.totals(),
                entries,
            ),
        };
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

pub struct App {
    config: AppConfig,
    client: Client,
    pub state: AppState,
    should_quit: bool,
}

fn current_month(timezone: &str) -> Result<MonthPeriod> {
    let tz: Tz = timezone
        .parse()
        .map_err(|err| AppError::Terminal(format!("invalid timezone {timezone}: {err}")))?;
    Ok(MonthPeriod::containing(&Utc::now().with_timezone(&tz)))
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let month = current_month(&config.timezone)?;
        let state = AppState::new(config.username.clone(), month, config.dark);

        Ok(Self {
            config,
            client,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut session = ui::TerminalSession::enter()?;
        self.event_loop(session.terminal()).await
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key).await?;
            }
        }

        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let action = ui::keymap::map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return Ok(());
        }

        match self.state.screen() {
            Screen::Login => self.handle_login_key(action).await,
            Screen::Ledger => self.handle_ledger_key(action).await,
        }
    }

    async fn handle_login_key(&mut self, action: AppAction) -> Result<()> {
        match action {
            AppAction::NextField | AppAction::Up | AppAction::Down => {
                self.state.advance_login_focus()
            }
            AppAction::Submit => self.attempt_login().await?,
            AppAction::Backspace => {
                self.state.active_login_field_mut().pop();
            }
            AppAction::Input(ch) => self.state.active_login_field_mut().push(ch),
            AppAction::Cancel => self.state.login.message = None,
            _ => {}
        }
        Ok(())
    }

    async fn handle_ledger_key(&mut self, action: AppAction) -> Result<()> {
        if self.state.editor.is_some() {
            match action {
                AppAction::Submit | AppAction::NextField => self.state.commit_edit(),
                AppAction::Cancel => self.state.cancel_edit(),
                AppAction::Backspace => self.state.edit_backspace(),
                AppAction::Input(ch) => self.state.edit_input(ch),
                _ => {}
            }
            return Ok(());
        }

        self.state.toast = None;
        match action {
            AppAction::Up => self.state.select_prev(),
            AppAction::Down => self.state.select_next(),
            AppAction::Left => self.state.column_left(),
            AppAction::Right | AppAction::NextField => self.state.column_right(),
            AppAction::Submit => self.state.activate_cell(),
            AppAction::Input(ch) => self.handle_command(ch).await?,
            _ => {}
        }
        Ok(())
    }

    async fn handle_command(&mut self, ch: char) -> Result<()> {
        match ch {
            'q' => self.should_quit = true,
            'j' => self.state.select_next(),
            'k' => self.state.select_prev(),
            'a' => self.state.add_entry(),
            'd' => self.state.remove_selected(),
            ' ' => self.state.toggle_selected_paid(),
            'r' => self.state.begin_edit(EditTarget::Received),
            'g' => self.state.begin_edit(EditTarget::Month),
            'c' => self.close_month().await,
            'l' => self.refresh_latest().await,
            'x' => self.export(ExportKind::Csv),
            'p' => self.export(ExportKind::Pdf),
            'm' => self.state.dark = !self.state.dark,
            'o' => self.state.sign_out(None),
            _ => {}
        }
        Ok(())
    }

    async fn attempt_login(&mut self) -> Result<()> {
        let Some(credentials) = self.state.login_credentials() else {
            self.state.login.message = Some("Fill in username and password.".to_string());
            return Ok(());
        };

        match self.client.sign_in(&credentials).await {
            Ok(user) => {
                tracing::info!("signed in as {}", user.username);
                self.state.signed_in(credentials);
                self.refresh_latest().await;
            }
            Err(err) => self.state.login.message = Some(message_for_error(err)),
        }

        Ok(())
    }

    async fn close_month(&mut self) {
        let Some(credentials) = self.state.session.clone() else {
            return;
        };
        let payload = self.state.close_payload();
        let result = self.client.close_month(&credentials, &payload).await;
        self.state.month_closed(result);
    }

    async fn refresh_latest(&mut self) {
        let Some(credentials) = self.state.session.clone() else {
            return;
        };
        match self.client.latest_month(&credentials).await {
            Ok(None) => {
                self.state.set_latest(None);
                self.state.toast(ToastLevel::Info, "No month closed yet.");
            }
            Ok(latest) => self.state.set_latest(latest),
            Err(ClientError::Unauthorized) => self
                .state
                .sign_out(Some("Session expired, sign in again.".to_string())),
            Err(err) => self.state.toast(ToastLevel::Error, message_for_error(err)),
        }
    }

    fn export(&mut self, kind: ExportKind) {
        match self.state.export(kind, &self.config.export_dir) {
            Ok(path) => self
                .state
                .toast(ToastLevel::Success, format!("Saved {}", path.display())),
            Err(err) => {
                tracing::error!("export failed: {err}");
                self.state.toast(ToastLevel::Error, format!("Export failed: {err}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use engine::MoneyCents;

    use super::*;

    fn signed_in_state() -> AppState {
        let mut state = AppState::new("alice".into(), MonthPeriod::new(2025, 10).unwrap(), false);
        state.signed_in(Credentials {
            username: "alice".into(),
            password: "password".into(),
        });
        state
    }

    fn type_text(state: &mut AppState, text: &str) {
        for ch in text.chars() {
            state.edit_input(ch);
        }
        state.commit_edit();
    }

    fn view(remainder_minor: i64) -> MonthView {
        MonthView {
            id: 7,
            month: "2025-10".into(),
            received_minor: 200_000,
            discounts_minor: 80_000,
            remainder_minor,
            closed_at: Utc.with_ymd_and_hms(2025, 10, 31, 12, 0, 0).unwrap(),
        }
    }

    fn rent_ledger() -> AppState {
        let mut state = signed_in_state();
        state.begin_edit(EditTarget::Received);
        type_text(&mut state, "2000");
        state.add_entry();
        type_text(&mut state, "Aluguel");
        state.column = EntryField::Amount;
        state.activate_cell();
        type_text(&mut state, "800");
        state.column = EntryField::Paid;
        state.activate_cell();
        state
    }

    #[test]
    fn ledger_is_gated_by_session() {
        let mut state = signed_in_state();
        assert_eq!(state.screen(), Screen::Ledger);
        state.sign_out(None);
        assert_eq!(state.screen(), Screen::Login);
        assert!(state.login.password.is_empty());
    }

    #[test]
    fn edits_recompute_totals_on_every_keystroke() {
        let mut state = rent_ledger();
        let totals = state.ledger.totals();
        assert_eq!(totals.paid_total, MoneyCents::new(80_000));
        assert_eq!(totals.remainder, MoneyCents::new(120_000));

        state.column = EntryField::Amount;
        state.activate_cell();
        for _ in 0..4 {
            state.edit_backspace();
        }
        assert_eq!(state.editor.as_ref().map(|e| e.buffer.as_str()), Some("80"));
        assert_eq!(state.ledger.entries()[0].amount, MoneyCents::new(8_000));
        assert_eq!(state.ledger.totals().remainder, MoneyCents::new(192_000));
        state.edit_input('x');
        assert_eq!(state.ledger.entries()[0].amount, MoneyCents::new(8_000));
    }

    #[test]
    fn cancel_restores_the_previous_value() {
        let mut state = rent_ledger();
        state.column = EntryField::Description;
        state.activate_cell();
        state.edit_input('!');
        assert_eq!(state.ledger.entries()[0].description, "Aluguel!");
        state.cancel_edit();
        assert_eq!(state.ledger.entries()[0].description, "Aluguel");
        assert!(state.editor.is_none());
    }

    #[test]
    fn month_can_be_changed_before_closing() {
        let mut state = rent_ledger();
        state.begin_edit(EditTarget::Month);
        assert_eq!(state.editor.as_ref().map(|e| e.buffer.as_str()), Some("2025-10"));
        state.edit_backspace();
        state.edit_backspace();
        type_text(&mut state, "09");

        assert_eq!(state.month, MonthPeriod::new(2025, 9).unwrap());
        assert_eq!(state.close_payload().month, "2025-09");
        assert!(state.toast.is_none());

        state.begin_edit(EditTarget::Month);
        for _ in 0..7 {
            state.edit_backspace();
        }
        type_text(&mut state, "setembro de 2024");
        assert_eq!(state.month, MonthPeriod::new(2024, 9).unwrap());
    }

    #[test]
    fn unparsable_month_keeps_the_previous_one() {
        let mut state = rent_ledger();
        state.begin_edit(EditTarget::Month);
        type_text(&mut state, "xx");

        assert_eq!(state.month, MonthPeriod::new(2025, 10).unwrap());
        assert!(state.editor.is_none());
        assert_eq!(state.toast.as_ref().map(|t| t.level), Some(ToastLevel::Error));
        assert_eq!(state.ledger.entries().len(), 1);
    }

    #[test]
    fn close_payload_carries_entries_in_cents() {
        let state = rent_ledger();
        let payload = state.close_payload();
        assert_eq!(payload.month, "2025-10");
        assert_eq!(payload.received_minor, 200_000);
        assert_eq!(payload.entries.len(), 1);
        assert_eq!(payload.entries[0].amount_minor, 80_000);
        assert!(payload.entries[0].paid);
    }

    #[test]
    fn successful_close_resets_ledger_and_shows_chart() {
        let mut state = rent_ledger();
        state.month_closed(Ok(view(120_000)));

        assert!(state.ledger.is_empty());
        assert_eq!(state.ledger.received(), MoneyCents::ZERO);
        assert!(state.chart.is_live());
        assert_eq!(
            state.chart.renderer().current().map(|data| data.values),
            Some([200_000, 80_000, 120_000])
        );
        assert_eq!(state.toast.as_ref().map(|t| t.level), Some(ToastLevel::Success));
    }

    #[test]
    fn failed_close_keeps_the_ledger() {
        let mut state = rent_ledger();
        state.month_closed(Err(ClientError::Server("internal server error".into())));

        assert_eq!(state.ledger.entries().len(), 1);
        assert_eq!(state.ledger.received(), MoneyCents::new(200_000));
        assert_eq!(state.toast.as_ref().map(|t| t.level), Some(ToastLevel::Error));
    }

    #[test]
    fn unauthorized_close_returns_to_login() {
        let mut state = rent_ledger();
        state.month_closed(Err(ClientError::Unauthorized));
        assert_eq!(state.screen(), Screen::Login);
        assert!(state.login.message.is_some());
    }

    #[test]
    fn removing_rows_keeps_selection_in_range() {
        let mut state = rent_ledger();
        state.add_entry();
        state.commit_edit();
        assert_eq!(state.selected, 1);
        state.remove_selected();
        assert_eq!(state.selected, 0);
        state.remove_selected();
        assert!(state.ledger.is_empty());
        state.remove_selected();
        assert_eq!(state.toast.as_ref().map(|t| t.level), Some(ToastLevel::Error));
    }

    #[test]
    fn new_latest_replaces_the_chart() {
        let mut state = signed_in_state();
        state.set_latest(Some(view(1)));
        state.set_latest(Some(view(2)));
        assert_eq!(
            state.chart.renderer().current().map(|data| data.values[2]),
            Some(2)
        );
        state.set_latest(None);
        assert!(!state.chart.is_live());
        assert!(state.chart.renderer().current().is_none());
    }

    #[test]
    fn latest_with_unreadable_month_clears_the_chart() {
        let mut state = signed_in_state();
        state.set_latest(Some(view(1)));
        let mut broken = view(2);
        broken.month = "13/2025".into();
        state.set_latest(Some(broken));
        assert!(!state.chart.is_live());
        assert!(state.latest.is_some());
    }

    #[test]
    fn exports_are_named_after_the_month() {
        let dir = tempfile::tempdir().unwrap();
        let state = rent_ledger();

        let csv = state.export(ExportKind::Csv, dir.path()).unwrap();
        assert_eq!(csv, dir.path().join("sobra-2025-10.csv"));
        let content = std::fs::read_to_string(csv).unwrap();
        assert!(content.starts_with("description,amount,paid\n"));
        assert!(content.contains("Aluguel,800.00,yes"));

        let pdf = state.export(ExportKind::Pdf, dir.path()).unwrap();
        assert!(std::fs::read(pdf).unwrap().starts_with(b"%PDF-1.4"));
    }

    #[test]
    fn timezone_must_be_known() {
        assert!(current_month("America/Sao_Paulo").is_ok());
        assert!(current_month("Mars/Olympus").is_err());
    }
}
