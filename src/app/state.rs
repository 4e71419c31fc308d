use std::sync::Arc;

use fltk::{app, app::Sender, prelude::*};
use tracing::{info, warn};

use super::controllers::content::{ContentLoader, ContentState, spawn_fetch};
use super::controllers::session::GuideSession;
use super::domain::catalog::filter_languages;
use super::domain::config::GuideConfig;
use super::domain::content::FetchTarget;
use super::domain::messages::Message;
use super::domain::preferences::{EffectiveTheme, ThemeMode};
use super::infrastructure::platform::SystemAmbient;
use super::services::fetcher::ContentFetcher;
use super::services::markdown::{page_html, render_markdown, status_page};
use super::services::preference_store::FileBackend;
use crate::ui::icons::DocIcon;
use crate::ui::main_window::{MainWidgets, NOTICE_HEIGHT, RETRY_HEIGHT, SIDEBAR_WIDTH};
use crate::ui::theme::apply_theme;
#[cfg(target_os = "windows")]
use crate::ui::theme::set_windows_titlebar_theme;

const LOADING_MESSAGE: &str = "Loading guide...";
const EMPTY_MESSAGE: &str = "No guides available";

pub struct AppState {
    pub widgets: MainWidgets,
    pub session: GuideSession<FileBackend>,
    pub loader: ContentLoader,
    fetcher: Arc<dyn ContentFetcher + Send + Sync>,
    pub sender: Sender<Message>,
    ambient: SystemAmbient,
    pub dark_mode: bool,
    pub sidebar_open: bool,
    /// Language ids currently listed in the picker, in picker order.
    visible_languages: Vec<String>,
    config: GuideConfig,
}

impl AppState {
    pub fn new(
        widgets: MainWidgets,
        session: GuideSession<FileBackend>,
        fetcher: Arc<dyn ContentFetcher + Send + Sync>,
        sender: Sender<Message>,
        config: GuideConfig,
    ) -> Self {
        let ambient = SystemAmbient;
        let dark_mode = session.effective_theme(&ambient).is_dark();
        let sidebar_open = config.sidebar_open;
        Self {
            widgets,
            session,
            loader: ContentLoader::new(),
            fetcher,
            sender,
            ambient,
            dark_mode,
            sidebar_open,
            visible_languages: Vec::new(),
            config,
        }
    }

    /// Resolve the launch request and paint the first frame.
    pub fn start(&mut self, document: Option<&str>, language: Option<&str>) {
        let target = self.session.start(document, language);
        self.apply_theme(true);
        self.set_sidebar_visible(self.sidebar_open);
        self.after_resolution(target);
    }

    /// Dispatch one message. Returns false when the app should quit.
    pub fn handle(&mut self, msg: Message) -> bool {
        match msg {
            Message::SidebarClicked => {
                let line = self.widgets.sidebar.value();
                let id = (line > 0)
                    .then(|| self.session.catalog().list_documents().get(line as usize - 1))
                    .flatten()
                    .map(|doc| doc.id.clone());
                if let Some(id) = id {
                    self.select_document(&id);
                }
            }
            Message::PreviousDocument => {
                if let (Some(prev), _) = self.session.neighbours() {
                    let id = prev.id.clone();
                    self.select_document(&id);
                }
            }
            Message::NextDocument => {
                if let (_, Some(next)) = self.session.neighbours() {
                    let id = next.id.clone();
                    self.select_document(&id);
                }
            }
            Message::LanguageChosen(index) => {
                let id = usize::try_from(index)
                    .ok()
                    .and_then(|i| self.visible_languages.get(i))
                    .cloned();
                if let Some(id) = id {
                    let target = self.session.select_language(&id);
                    self.after_resolution(target);
                }
            }
            Message::FilterLanguages => self.render_languages(),
            Message::SetTheme(mode) => self.set_theme(mode),
            Message::ToggleSidebar => self.toggle_sidebar(),
            Message::OpenPortal => self.open_portal(),
            Message::DismissNotice => {
                self.session.dismiss_notice();
                self.render_notice();
            }
            Message::RetryFetch => {
                if let Some(target) = self.session.current_target() {
                    self.start_fetch(target);
                }
            }
            Message::ContentLoaded(ticket, result) => {
                if self.loader.complete(ticket, result) {
                    self.render_content();
                }
            }
            Message::AmbientTick => {
                if self.session.preferences().theme == ThemeMode::System {
                    self.apply_theme(false);
                }
            }
            Message::WindowClose => return false,
        }
        true
    }

    fn select_document(&mut self, id: &str) {
        let target = self.session.select_document(id);
        self.after_resolution(target);
    }

    fn after_resolution(&mut self, target: Option<FetchTarget>) {
        if let Some(target) = target {
            self.start_fetch(target);
        } else if self.session.current_target().is_none() {
            self.loader.clear();
            self.render_content();
        }
        self.render_chrome();
    }

    fn start_fetch(&mut self, target: FetchTarget) {
        let ticket = self.loader.begin(&target);
        let s = self.sender;
        spawn_fetch(self.fetcher.clone(), ticket, target.location, move |ticket, result| {
            s.send(Message::ContentLoaded(ticket, result));
            app::awake();
        });
        self.render_content();
    }

    fn effective_theme(&self) -> EffectiveTheme {
        if self.dark_mode { EffectiveTheme::Dark } else { EffectiveTheme::Light }
    }

    // --- Rendering ---

    fn render_chrome(&mut self) {
        self.render_title();
        self.render_sidebar();
        self.render_languages();
        self.render_notice();
        self.render_footer();
        self.widgets.wind.redraw();
    }

    fn render_title(&mut self) {
        let name = self.session.current_document().map(|d| d.name.clone());
        match name {
            Some(name) => {
                self.widgets.wind.set_label(&format!("{} | Guide", name));
                self.widgets.title.set_label(&format!("  {}", name));
            }
            None => {
                self.widgets.wind.set_label("Guide");
                self.widgets.title.set_label("");
            }
        }
    }

    fn render_sidebar(&mut self) {
        let current = self.session.current_document().map(|d| d.id.clone());
        let sidebar = &mut self.widgets.sidebar;
        sidebar.clear();

        let mut selected = 0;
        for (i, doc) in self.session.catalog().list_documents().iter().enumerate() {
            let glyph = DocIcon::from_name(doc.icon.as_deref()).glyph();
            // "@." stops FLTK from reading format codes out of the name
            if current.as_deref() == Some(doc.id.as_str()) {
                sidebar.add(&format!("@b@.{}  {}", glyph, doc.name));
                selected = i as i32 + 1;
            } else {
                sidebar.add(&format!("@.{}  {}", glyph, doc.name));
            }
        }
        if selected > 0 {
            sidebar.select(selected);
        }
    }

    fn render_languages(&mut self) {
        let query = self.widgets.lang_search.value();
        let current = self.session.current_language().map(|l| l.id.clone());
        let languages: Vec<(String, String)> = self
            .session
            .current_document()
            .map(|doc| {
                filter_languages(&doc.languages, &query)
                    .into_iter()
                    .map(|l| (l.id.clone(), l.name.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let choice = &mut self.widgets.lang_choice;
        choice.clear();
        for (_, name) in &languages {
            choice.add_choice(&name.replace('/', "\\/").replace('|', "\\|"));
        }
        if let Some(index) = languages
            .iter()
            .position(|(id, _)| current.as_deref() == Some(id.as_str()))
        {
            choice.set_value(index as i32);
        }
        if languages.is_empty() {
            choice.deactivate();
        } else {
            choice.activate();
        }
        choice.redraw();

        self.visible_languages = languages.into_iter().map(|(id, _)| id).collect();
    }

    fn render_notice(&mut self) {
        let w = &mut self.widgets;
        match self.session.notice() {
            Some(notice) => {
                w.notice_frame.set_label(&format!("  {}", notice.message));
                w.notice_row.show();
                w.flex.fixed(&w.notice_row, NOTICE_HEIGHT);
            }
            None => {
                w.notice_row.hide();
                w.flex.fixed(&w.notice_row, 0);
            }
        }
        w.wind.redraw();
    }

    fn render_footer(&mut self) {
        let (prev, next) = self.session.neighbours();
        let prev_label = prev.map(|d| format!("\u{2190}  Previous Page: {}", d.name));
        let next_label = next.map(|d| format!("Next Page: {}  \u{2192}", d.name));

        let w = &mut self.widgets;
        for (btn, label) in [(&mut w.prev_btn, prev_label), (&mut w.next_btn, next_label)] {
            match label {
                Some(label) => {
                    btn.set_label(&label);
                    btn.activate();
                }
                None => {
                    btn.set_label("");
                    btn.deactivate();
                }
            }
        }
    }

    fn render_content(&mut self) {
        let theme = self.effective_theme();
        let (html, show_retry) = match self.loader.state() {
            ContentState::Empty => {
                let message = match self.session.notice() {
                    Some(notice) if !self.session.catalog().is_empty() => notice.message,
                    _ => EMPTY_MESSAGE,
                };
                (status_page(message, theme), false)
            }
            ContentState::Loading(_) => (status_page(LOADING_MESSAGE, theme), false),
            ContentState::Ready { markdown, .. } => (page_html(&render_markdown(markdown), theme), false),
            ContentState::Failed { error, .. } => (status_page(&error.to_string(), theme), true),
        };

        let w = &mut self.widgets;
        w.content.set_value(&html);
        if show_retry {
            w.retry.show();
            w.content_col.fixed(&w.retry, RETRY_HEIGHT);
        } else {
            w.retry.hide();
            w.content_col.fixed(&w.retry, 0);
        }
        w.wind.redraw();
    }

    // --- Theme ---

    fn set_theme(&mut self, mode: ThemeMode) {
        if let Err(e) = self.session.set_theme(mode) {
            warn!("Failed to save theme preference: {}", e);
        }
        self.apply_theme(true);
    }

    /// Re-resolve the effective theme. Widgets are repainted when it changed
    /// or when `force` is set.
    fn apply_theme(&mut self, force: bool) {
        let dark = self.session.effective_theme(&self.ambient).is_dark();
        let changed = dark != self.dark_mode;
        self.dark_mode = dark;
        if !changed && !force {
            return;
        }

        apply_theme(&mut self.widgets, self.dark_mode);
        #[cfg(target_os = "windows")]
        set_windows_titlebar_theme(&self.widgets.wind, self.dark_mode);

        if changed {
            info!(dark = self.dark_mode, "theme changed");
            self.render_content();
        }
    }

    // --- Sidebar ---

    fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
        self.set_sidebar_visible(self.sidebar_open);

        self.config.sidebar_open = self.sidebar_open;
        if let Err(e) = self.config.save() {
            warn!("Failed to save config: {}", e);
        }
    }

    fn set_sidebar_visible(&mut self, open: bool) {
        let w = &mut self.widgets;
        if open {
            w.sidebar.show();
            w.body.fixed(&w.sidebar, SIDEBAR_WIDTH);
        } else {
            w.sidebar.hide();
            w.body.fixed(&w.sidebar, 0);
        }
        w.wind.redraw();
    }

    fn open_portal(&self) {
        match self.config.portal_base().map(String::from) {
            Ok(url) => {
                if let Err(e) = open::that(&url) {
                    warn!("Failed to open {}: {}", url, e);
                }
            }
            Err(e) => warn!("{}", e),
        }
    }
}
