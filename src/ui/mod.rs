#[cfg(feature = "ui")]
use eframe::egui;
#[cfg(feature = "ui")]
use std::sync::Arc;
#[cfg(feature = "ui")]
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
#[cfg(feature = "ui")]
use tracing::{error, info};

#[cfg(feature = "ui")]
pub mod cards;
#[cfg(feature = "ui")]
pub mod images;
#[cfg(feature = "ui")]
pub mod state;
#[cfg(feature = "ui")]
pub mod theme;

#[cfg(feature = "ui")]
use crate::config::{QUESTION_ANSWER_STATES, SUPPORTED_PROVIDERS};
#[cfg(feature = "ui")]
use crate::core::{autopilot, AutopilotEvent, AutopilotHandle, CoreEvent, ReviewDeskStudio};
#[cfg(feature = "ui")]
use crate::i18n::{I18nManager, Language};
#[cfg(feature = "ui")]
use crate::marketplace::ItemCategory;
#[cfg(feature = "ui")]
use cards::CardAction;
#[cfg(feature = "ui")]
use images::ThumbnailCache;
#[cfg(feature = "ui")]
use state::{Toast, ToastLevel, UiState, View};
#[cfg(feature = "ui")]
use theme::Theme;

/// Main UI application. All marketplace and LLM work runs on the tokio
/// runtime; results come back over a channel and are drained at the top
/// of every frame, so the egui thread never blocks on the network.
#[cfg(feature = "ui")]
pub struct ReviewDeskUI {
    studio: Arc<ReviewDeskStudio>,
    state: UiState,
    theme: Theme,
    i18n: I18nManager,
    thumbnails: ThumbnailCache,
    events: UnboundedReceiver<CoreEvent>,
    events_tx: UnboundedSender<CoreEvent>,
    save_results: UnboundedReceiver<Result<(), String>>,
    save_results_tx: UnboundedSender<Result<(), String>>,
    autopilot: Option<AutopilotHandle>,
}

#[cfg(feature = "ui")]
impl ReviewDeskUI {
    /// Create new UI application
    pub fn new(studio: Arc<ReviewDeskStudio>) -> Self {
        let config = studio.config();
        let state = UiState::new(config);
        let theme = Theme::from_config(&config.ui.theme, config.ui.font_size);

        let mut i18n = I18nManager::new();
        if let Some(language) = Language::from_code(&config.ui.language) {
            i18n.set_language(language);
        }

        let (events_tx, events) = unbounded_channel();
        let (save_results_tx, save_results) = unbounded_channel();

        Self {
            studio,
            state,
            theme,
            i18n,
            thumbnails: ThumbnailCache::new(),
            events,
            events_tx,
            save_results,
            save_results_tx,
            autopilot: None,
        }
    }

    fn toast(&mut self, level: ToastLevel, title: String, message: String) {
        // The status bar keeps showing the latest notification after the
        // toast itself has expired
        self.state.status_line = if message.is_empty() {
            title.clone()
        } else {
            format!("{title}: {message}")
        };
        self.state.toasts.push(Toast::new(level, title, message));
    }

    fn has_work_in_flight(&self) -> bool {
        self.state.loading_feedbacks
            || self.state.loading_questions
            || !self.state.generating.is_empty()
            || !self.state.sending.is_empty()
            || self.autopilot.is_some()
    }
}

#[cfg(feature = "ui")]
impl eframe::App for ReviewDeskUI {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply(ctx);
        self.thumbnails.poll(ctx);
        self.drain_events();

        if !self.state.initial_refresh_done {
            self.state.initial_refresh_done = true;
            self.refresh_feedbacks(ctx);
            self.refresh_questions(ctx);
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            self.render_top_bar(ui);
        });
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.current_view {
                    View::Reviews => self.render_reviews_view(ui, ctx),
                    View::Questions => self.render_questions_view(ui, ctx),
                    View::Autopilot => self.render_autopilot_view(ui),
                    View::Settings => self.render_settings_view(ui, ctx),
                });
        });

        self.render_toasts(ctx);

        if self.has_work_in_flight() {
            ctx.request_repaint_after(std::time::Duration::from_millis(200));
        }
    }
}

#[cfg(feature = "ui")]
impl ReviewDeskUI {
    /// Apply results of finished background work to the session
    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        while let Ok(result) = self.save_results.try_recv() {
            match result {
                Ok(()) => {
                    let title = self.i18n.t("settings.saved");
                    self.toast(ToastLevel::Success, title, String::new());
                }
                Err(message) => {
                    let title = self.i18n.t("settings.save_failed");
                    self.toast(ToastLevel::Error, title, message);
                }
            }
        }
    }

    fn handle_event(&mut self, event: CoreEvent) {
        match event {
            CoreEvent::FeedbacksLoaded { items, archive, notice } => {
                self.state.loading_feedbacks = false;
                if let Some(message) = notice {
                    let title = self.i18n.t("toast.reviews_failed");
                    self.toast(ToastLevel::Error, title, message);
                }
                if archive {
                    self.state.archived_feedbacks = items;
                } else {
                    self.state.session.replace_feedbacks(items);
                }
            }
            CoreEvent::QuestionsLoaded { items, archive, notice } => {
                self.state.loading_questions = false;
                if let Some(message) = notice {
                    let title = self.i18n.t("toast.questions_failed");
                    self.toast(ToastLevel::Error, title, message);
                }
                if archive {
                    self.state.archived_questions = items;
                } else {
                    self.state.session.replace_questions(items);
                }
            }
            CoreEvent::DraftReady { id, text, .. } => {
                self.state.generating.remove(&id);
                self.state.session.set_draft(id, text);
            }
            CoreEvent::DraftFailed { id, message, .. } => {
                self.state.generating.remove(&id);
                let title = self.i18n.t("toast.draft_failed");
                self.toast(ToastLevel::Error, title, message);
            }
            CoreEvent::AnswerSubmitted { category, id } => {
                self.state.sending.remove(&id);
                self.state.session.mark_answered(category, &id);
                let title = self.i18n.t("toast.answer_sent");
                self.toast(ToastLevel::Success, title, String::new());
            }
            CoreEvent::SubmitFailed { id, message, .. } => {
                self.state.sending.remove(&id);
                let title = self.i18n.t("toast.submit_failed");
                self.toast(ToastLevel::Error, title, message);
            }
            CoreEvent::Autopilot(event) => self.handle_autopilot_event(event),
        }
    }

    fn handle_autopilot_event(&mut self, event: AutopilotEvent) {
        let line = match &event {
            AutopilotEvent::PassStarted { number } => {
                format!("{} #{}", self.i18n.t("autopilot.pass_started"), number)
            }
            AutopilotEvent::ItemAnswered { category, id } => {
                format!("{}: {} {}", self.i18n.t("autopilot.item_answered"), category, id)
            }
            AutopilotEvent::ItemSkipped { category, id, message } => {
                format!(
                    "{}: {} {} ({})",
                    self.i18n.t("autopilot.item_skipped"),
                    category,
                    id,
                    message
                )
            }
            AutopilotEvent::PassFinished(summary) => {
                format!(
                    "{} #{}: {}/{}",
                    self.i18n.t("autopilot.pass_finished"),
                    summary.number,
                    summary.answered,
                    summary.total
                )
            }
            AutopilotEvent::Stopped => self.i18n.t("autopilot.stopped"),
        };
        self.state
            .push_log(format!("{}  {}", chrono::Local::now().format("%H:%M:%S"), line));

        match event {
            // Keep the dashboard in sync with what the loop answered
            AutopilotEvent::ItemAnswered { category, id } => {
                self.state.session.mark_answered(category, &id);
            }
            AutopilotEvent::Stopped => {
                self.autopilot = None;
            }
            _ => {}
        }
    }

    /// Render top navigation bar
    fn render_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(self.i18n.t("app.title"));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(if self.theme.is_dark() { "🌙" } else { "☀" }).clicked() {
                    self.theme = if self.theme.is_dark() {
                        Theme::light(self.theme.font_size)
                    } else {
                        Theme::dark(self.theme.font_size)
                    };
                    self.state.settings_form.theme = self.theme.name().to_string();
                }

                ui.separator();

                self.view_tab(ui, View::Settings, "nav.settings", None);
                self.view_tab(ui, View::Autopilot, "nav.autopilot", None);
                self.view_tab(
                    ui,
                    View::Questions,
                    "nav.questions",
                    Some(self.state.session.questions().len()),
                );
                self.view_tab(
                    ui,
                    View::Reviews,
                    "nav.reviews",
                    Some(self.state.session.feedbacks().len()),
                );
            });
        });
    }

    fn view_tab(&mut self, ui: &mut egui::Ui, view: View, key: &str, count: Option<usize>) {
        let mut label = self.i18n.t(key);
        if let Some(count) = count {
            if count > 0 {
                label = format!("{label} ({count})");
            }
        }
        if ui.selectable_label(self.state.current_view == view, label).clicked() {
            self.state.current_view = view;
        }
    }

    /// Render pending reviews (or the answered archive)
    fn render_reviews_view(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            let refresh = egui::Button::new(format!("🔄 {}", self.i18n.t("list.refresh")));
            if ui.add_enabled(!self.state.loading_feedbacks, refresh).clicked() {
                self.refresh_feedbacks(ctx);
            }
            if ui
                .checkbox(
                    &mut self.state.show_feedback_archive,
                    self.i18n.t("list.show_archive"),
                )
                .changed()
            {
                self.refresh_feedbacks(ctx);
            }
            if self.state.loading_feedbacks {
                ui.spinner();
                ui.weak(self.i18n.t("list.loading"));
            }
        });
        ui.add_space(8.0);

        if self.state.show_feedback_archive {
            if self.state.archived_feedbacks.is_empty() {
                ui.weak(self.i18n.t("list.archive_empty"));
            } else {
                let items = self.state.archived_feedbacks.clone();
                for item in &items {
                    cards::feedback_archive_card(ui, ctx, &self.i18n, &mut self.thumbnails, item);
                    ui.add_space(8.0);
                }
            }
            return;
        }

        if self.state.session.feedbacks().is_empty() {
            if !self.state.loading_feedbacks {
                ui.weak(self.i18n.t("list.empty_reviews"));
            }
            return;
        }

        let items = self.state.session.feedbacks().to_vec();
        let mut actions = Vec::new();
        for item in &items {
            let generating = self.state.generating.contains(&item.id);
            let sending = self.state.sending.contains(&item.id);
            let draft = self.state.session.draft_mut(&item.id);
            if let Some(action) = cards::feedback_card(
                ui,
                ctx,
                &self.i18n,
                &mut self.thumbnails,
                item,
                draft,
                generating,
                sending,
            ) {
                actions.push((item.id.clone(), action));
            }
            ui.add_space(8.0);
        }
        for (id, action) in actions {
            match action {
                CardAction::Generate => self.generate_draft(ctx, ItemCategory::Feedback, &id),
                CardAction::Send => self.submit_draft(ctx, ItemCategory::Feedback, &id),
            }
        }
    }

    /// Render pending buyer questions (or the answered archive)
    fn render_questions_view(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            let refresh = egui::Button::new(format!("🔄 {}", self.i18n.t("list.refresh")));
            if ui.add_enabled(!self.state.loading_questions, refresh).clicked() {
                self.refresh_questions(ctx);
            }
            if ui
                .checkbox(
                    &mut self.state.show_question_archive,
                    self.i18n.t("list.show_archive"),
                )
                .changed()
            {
                self.refresh_questions(ctx);
            }
            if self.state.loading_questions {
                ui.spinner();
                ui.weak(self.i18n.t("list.loading"));
            }
        });
        ui.add_space(8.0);

        if self.state.show_question_archive {
            if self.state.archived_questions.is_empty() {
                ui.weak(self.i18n.t("list.archive_empty"));
            } else {
                let items = self.state.archived_questions.clone();
                for item in &items {
                    cards::question_archive_card(ui, &self.i18n, item);
                    ui.add_space(8.0);
                }
            }
            return;
        }

        if self.state.session.questions().is_empty() {
            if !self.state.loading_questions {
                ui.weak(self.i18n.t("list.empty_questions"));
            }
            return;
        }

        let items = self.state.session.questions().to_vec();
        let mut actions = Vec::new();
        for item in &items {
            let generating = self.state.generating.contains(&item.id);
            let sending = self.state.sending.contains(&item.id);
            let draft = self.state.session.draft_mut(&item.id);
            if let Some(action) =
                cards::question_card(ui, &self.i18n, item, draft, generating, sending)
            {
                actions.push((item.id.clone(), action));
            }
            ui.add_space(8.0);
        }
        for (id, action) in actions {
            match action {
                CardAction::Generate => self.generate_draft(ctx, ItemCategory::Question, &id),
                CardAction::Send => self.submit_draft(ctx, ItemCategory::Question, &id),
            }
        }
    }

    /// Render autopilot controls and its log
    fn render_autopilot_view(&mut self, ui: &mut egui::Ui) {
        ui.heading(self.i18n.t("autopilot.title"));
        ui.add_space(8.0);

        let running = self.autopilot.is_some();
        ui.group(|ui| {
            ui.add_enabled_ui(!running, |ui| {
                ui.checkbox(
                    &mut self.state.autopilot_form.include_questions,
                    self.i18n.t("autopilot.include_questions"),
                );
                ui.horizontal(|ui| {
                    ui.label(self.i18n.t("autopilot.item_delay"));
                    ui.add(
                        egui::DragValue::new(&mut self.state.autopilot_form.item_delay_seconds)
                            .clamp_range(0..=600),
                    );
                });
                ui.horizontal(|ui| {
                    ui.label(self.i18n.t("autopilot.pass_delay"));
                    ui.add(
                        egui::DragValue::new(&mut self.state.autopilot_form.pass_delay_seconds)
                            .clamp_range(1..=3600),
                    );
                });
            });
        });
        ui.add_space(8.0);

        ui.horizontal(|ui| match &self.autopilot {
            Some(handle) if handle.is_enabled() => {
                if ui.button(format!("⏹ {}", self.i18n.t("autopilot.stop"))).clicked() {
                    handle.stop();
                }
                ui.colored_label(
                    egui::Color32::GREEN,
                    format!("● {}", self.i18n.t("autopilot.running")),
                );
            }
            Some(_) => {
                ui.spinner();
                ui.colored_label(egui::Color32::YELLOW, self.i18n.t("autopilot.stopping"));
            }
            None => {
                if ui.button(format!("▶ {}", self.i18n.t("autopilot.start"))).clicked() {
                    self.start_autopilot();
                }
                ui.weak(self.i18n.t("autopilot.idle"));
            }
        });

        ui.add_space(8.0);
        ui.group(|ui| {
            ui.strong(self.i18n.t("autopilot.log_title"));
            ui.separator();
            egui::ScrollArea::vertical()
                .id_source("autopilot_log")
                .max_height(320.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    if self.state.autopilot_log.is_empty() {
                        ui.weak("—");
                    }
                    for line in &self.state.autopilot_log {
                        ui.monospace(line);
                    }
                });
        });
    }

    /// Render settings view
    fn render_settings_view(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.heading(self.i18n.t("settings.title"));
        ui.add_space(8.0);

        ui.group(|ui| {
            ui.strong(self.i18n.t("settings.marketplace"));
            ui.separator();

            ui.label(self.i18n.t("settings.base_url"));
            ui.add(
                egui::TextEdit::singleline(&mut self.state.settings_form.base_url)
                    .desired_width(f32::INFINITY),
            );

            ui.label(self.i18n.t("settings.token"));
            ui.add(
                egui::TextEdit::singleline(&mut self.state.settings_form.api_token)
                    .password(true)
                    .desired_width(f32::INFINITY),
            );

            ui.horizontal(|ui| {
                ui.label(self.i18n.t("settings.question_state"));
                egui::ComboBox::from_id_source("question_state")
                    .selected_text(display_state(&self.state.settings_form.question_answer_state))
                    .show_ui(ui, |ui| {
                        for state in QUESTION_ANSWER_STATES {
                            ui.selectable_value(
                                &mut self.state.settings_form.question_answer_state,
                                state.to_string(),
                                display_state(state),
                            );
                        }
                    });
            });
        });
        ui.add_space(8.0);

        ui.group(|ui| {
            ui.strong(self.i18n.t("settings.llm"));
            ui.separator();

            ui.horizontal(|ui| {
                ui.label(self.i18n.t("settings.provider"));
                egui::ComboBox::from_id_source("provider")
                    .selected_text(self.state.settings_form.provider.clone())
                    .show_ui(ui, |ui| {
                        for provider in SUPPORTED_PROVIDERS {
                            ui.selectable_value(
                                &mut self.state.settings_form.provider,
                                provider.to_string(),
                                provider,
                            );
                        }
                    });
            });

            ui.label(self.i18n.t("settings.api_key"));
            ui.add(
                egui::TextEdit::singleline(&mut self.state.settings_form.api_key)
                    .password(true)
                    .desired_width(f32::INFINITY),
            );

            ui.label(self.i18n.t("settings.model"));
            ui.add(
                egui::TextEdit::singleline(&mut self.state.settings_form.model)
                    .desired_width(f32::INFINITY),
            );

            ui.horizontal(|ui| {
                ui.label(self.i18n.t("settings.temperature"));
                ui.add(egui::Slider::new(
                    &mut self.state.settings_form.temperature,
                    0.0..=2.0,
                ));
            });
        });
        ui.add_space(8.0);

        ui.group(|ui| {
            ui.strong(self.i18n.t("settings.reply"));
            ui.separator();

            ui.label(self.i18n.t("settings.instruction"));
            ui.add(
                egui::TextEdit::multiline(&mut self.state.settings_form.instruction)
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );

            ui.label(self.i18n.t("settings.signature"));
            ui.add(
                egui::TextEdit::singleline(&mut self.state.settings_form.signature)
                    .desired_width(f32::INFINITY),
            );
        });
        ui.add_space(8.0);

        ui.group(|ui| {
            ui.strong(self.i18n.t("settings.appearance"));
            ui.separator();

            ui.horizontal(|ui| {
                ui.label(self.i18n.t("settings.font_size"));
                ui.add(egui::Slider::new(
                    &mut self.state.settings_form.font_size,
                    10.0..=24.0,
                ));
            });

            ui.horizontal(|ui| {
                ui.label(self.i18n.t("settings.language"));
                let current = Language::from_code(&self.state.settings_form.language)
                    .unwrap_or_default();
                egui::ComboBox::from_id_source("language")
                    .selected_text(current.name())
                    .show_ui(ui, |ui| {
                        for language in Language::all() {
                            ui.selectable_value(
                                &mut self.state.settings_form.language,
                                language.code().to_string(),
                                language.name(),
                            );
                        }
                    });
            });
        });
        ui.add_space(8.0);

        if ui.button(format!("💾 {}", self.i18n.t("settings.apply"))).clicked() {
            self.apply_settings(ctx);
        }
    }

    /// Render status bar
    fn render_status_bar(&mut self, ui: &mut egui::Ui) {
        let stats = self.studio.stats();
        ui.horizontal(|ui| {
            ui.label(format!(
                "{}: {}",
                self.i18n.t("status.reviews"),
                self.state.session.feedbacks().len()
            ));
            ui.separator();
            ui.label(format!(
                "{}: {}",
                self.i18n.t("status.questions"),
                self.state.session.questions().len()
            ));
            ui.separator();
            ui.label(format!(
                "{}: {}",
                self.i18n.t("status.requests"),
                stats.total_requests
            ));
            if stats.error_count > 0 {
                ui.separator();
                ui.colored_label(
                    egui::Color32::LIGHT_RED,
                    format!("{}: {}", self.i18n.t("status.errors"), stats.error_count),
                );
            }

            if !self.state.status_line.is_empty() {
                ui.separator();
                ui.weak(excerpt_line(&self.state.status_line, 80));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.weak(chrono::Local::now().format("%H:%M:%S").to_string());
                ui.separator();
                ui.weak(self.studio.provider_name());
            });
        });
    }

    /// Render corner notifications
    fn render_toasts(&mut self, ctx: &egui::Context) {
        self.state.toasts.retain(|toast| !toast.is_expired());

        let mut to_remove = Vec::new();
        for (i, toast) in self.state.toasts.iter().enumerate() {
            let mut open = true;
            let color = match toast.level {
                ToastLevel::Info => egui::Color32::LIGHT_BLUE,
                ToastLevel::Success => egui::Color32::GREEN,
                ToastLevel::Error => egui::Color32::LIGHT_RED,
            };

            egui::Window::new(toast.title.as_str())
                .id(egui::Id::new(&toast.id))
                .anchor(egui::Align2::RIGHT_TOP, [-16.0, 16.0 + (i as f32 * 80.0)])
                .title_bar(false)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(color, "●");
                        ui.vertical(|ui| {
                            ui.strong(toast.title.as_str());
                            if !toast.message.is_empty() {
                                ui.label(toast.message.as_str());
                            }
                        });
                        if ui.small_button("✕").clicked() {
                            open = false;
                        }
                    });
                });

            if !open {
                to_remove.push(toast.id.clone());
            }
        }
        for id in to_remove {
            self.state.toasts.retain(|toast| toast.id != id);
        }

        if !self.state.toasts.is_empty() {
            ctx.request_repaint_after(std::time::Duration::from_secs(1));
        }
    }

    /// Reload the review listing for the current mode
    fn refresh_feedbacks(&mut self, ctx: &egui::Context) {
        if self.state.loading_feedbacks {
            return;
        }
        self.state.loading_feedbacks = true;

        let archive = self.state.show_feedback_archive;
        let studio = self.studio.clone();
        let events = self.events_tx.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let (items, notice) = match studio.list_feedbacks(archive).await {
                Ok(items) => (items, None),
                Err(e) => (Vec::new(), Some(e.to_string())),
            };
            let _ = events.send(CoreEvent::FeedbacksLoaded { items, archive, notice });
            ctx.request_repaint();
        });
    }

    /// Reload the question listing for the current mode
    fn refresh_questions(&mut self, ctx: &egui::Context) {
        if self.state.loading_questions {
            return;
        }
        self.state.loading_questions = true;

        let archive = self.state.show_question_archive;
        let studio = self.studio.clone();
        let events = self.events_tx.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let (items, notice) = match studio.list_questions(archive).await {
                Ok(items) => (items, None),
                Err(e) => (Vec::new(), Some(e.to_string())),
            };
            let _ = events.send(CoreEvent::QuestionsLoaded { items, archive, notice });
            ctx.request_repaint();
        });
    }

    /// Ask the LLM for a draft reply to one pending item
    fn generate_draft(&mut self, ctx: &egui::Context, category: ItemCategory, id: &str) {
        if self.state.busy(id) {
            return;
        }
        self.state.generating.insert(id.to_string());

        let studio = self.studio.clone();
        let events = self.events_tx.clone();
        let ctx = ctx.clone();
        match category {
            ItemCategory::Feedback => {
                if let Some(item) = self.state.session.feedback(id).cloned() {
                    tokio::spawn(async move {
                        let event = match studio.draft_for_feedback(&item).await {
                            Ok(text) => CoreEvent::DraftReady { category, id: item.id, text },
                            Err(e) => CoreEvent::DraftFailed {
                                category,
                                id: item.id,
                                message: e.to_string(),
                            },
                        };
                        let _ = events.send(event);
                        ctx.request_repaint();
                    });
                } else {
                    self.state.generating.remove(id);
                }
            }
            ItemCategory::Question => {
                if let Some(item) = self.state.session.question(id).cloned() {
                    tokio::spawn(async move {
                        let event = match studio.draft_for_question(&item).await {
                            Ok(text) => CoreEvent::DraftReady { category, id: item.id, text },
                            Err(e) => CoreEvent::DraftFailed {
                                category,
                                id: item.id,
                                message: e.to_string(),
                            },
                        };
                        let _ = events.send(event);
                        ctx.request_repaint();
                    });
                } else {
                    self.state.generating.remove(id);
                }
            }
        }
    }

    /// Send the operator's draft to the marketplace
    fn submit_draft(&mut self, ctx: &egui::Context, category: ItemCategory, id: &str) {
        if self.state.busy(id) {
            return;
        }
        let draft = match self.state.session.draft(id) {
            Some(text) => text.to_string(),
            None => return,
        };
        self.state.sending.insert(id.to_string());

        let studio = self.studio.clone();
        let events = self.events_tx.clone();
        let ctx = ctx.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let event = match studio.submit_answer(category, &id, &draft).await {
                Ok(()) => CoreEvent::AnswerSubmitted { category, id },
                Err(e) => CoreEvent::SubmitFailed { category, id, message: e.to_string() },
            };
            let _ = events.send(event);
            ctx.request_repaint();
        });
    }

    fn start_autopilot(&mut self) {
        let settings = self.state.autopilot_form.settings();
        let handle = autopilot::start(self.studio.clone(), settings, self.events_tx.clone());
        self.autopilot = Some(handle);
    }

    /// Rebuild the core from the edited settings and persist them
    fn apply_settings(&mut self, ctx: &egui::Context) {
        let mut config = self.studio.config().clone();
        self.state.settings_form.apply_to(&mut config);

        if let Err(e) = config.validate() {
            let title = self.i18n.t("settings.apply_failed");
            self.toast(ToastLevel::Error, title, e.to_string());
            return;
        }

        match ReviewDeskStudio::new(config.clone()) {
            Ok(studio) => {
                // A running autopilot still holds the old core; let it
                // wind down instead of swapping state under it
                if let Some(handle) = &self.autopilot {
                    handle.stop();
                }

                self.studio = Arc::new(studio);
                if let Some(language) = Language::from_code(&config.ui.language) {
                    self.i18n.set_language(language);
                }
                self.theme = Theme::from_config(&config.ui.theme, config.ui.font_size);
                info!("Settings applied (provider: {})", self.studio.provider_name());

                let title = self.i18n.t("settings.applied");
                self.toast(ToastLevel::Success, title, String::new());

                let results = self.save_results_tx.clone();
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    let outcome = config.save().await.map_err(|e| e.to_string());
                    let _ = results.send(outcome);
                    ctx.request_repaint();
                });
            }
            Err(e) => {
                error!("Failed to rebuild the core from new settings: {}", e);
                let title = self.i18n.t("settings.apply_failed");
                self.toast(ToastLevel::Error, title, e.to_string());
            }
        }
    }
}

#[cfg(feature = "ui")]
fn display_state(state: &str) -> String {
    if state.is_empty() {
        "—".to_string()
    } else {
        state.to_string()
    }
}

/// Single-line excerpt for the status bar. Char-based, so Cyrillic error
/// text never gets cut mid code point.
#[cfg(feature = "ui")]
fn excerpt_line(text: &str, limit: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= limit {
        flat
    } else {
        let mut cut: String = flat.chars().take(limit).collect();
        cut.push('…');
        cut
    }
}

/// Window icon, drawn in the marketplace's palette
#[cfg(feature = "ui")]
pub fn app_icon() -> egui::IconData {
    let size = 32usize;
    let mut rgba = Vec::with_capacity(size * size * 4);

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - size as f32 / 2.0;
            let dy = y as f32 - size as f32 / 2.0;
            let distance = (dx * dx + dy * dy).sqrt();
            let t = y as f32 / size as f32;

            let inside = distance < 14.0;
            let r = if inside { (203.0 - 74.0 * t) as u8 } else { 0 };
            let g = if inside { (17.0 + 20.0 * t) as u8 } else { 0 };
            let b = if inside { (171.0 + 41.0 * t) as u8 } else { 0 };
            let a = if inside { 255 } else { 0 };

            rgba.push(r);
            rgba.push(g);
            rgba.push(b);
            rgba.push(a);
        }
    }

    egui::IconData {
        rgba,
        width: size as u32,
        height: size as u32,
    }
}

// Stub implementation when UI feature is disabled
#[cfg(not(feature = "ui"))]
pub struct ReviewDeskUI;

#[cfg(not(feature = "ui"))]
impl ReviewDeskUI {
    pub fn new(_studio: std::sync::Arc<crate::core::ReviewDeskStudio>) -> Self {
        Self
    }
}
