use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Russian,
    English,
}

impl Language {
    /// Get language code (ISO 639-1)
    pub fn code(&self) -> &'static str {
        match self {
            Language::Russian => "ru",
            Language::English => "en",
        }
    }

    /// Get language display name
    pub fn name(&self) -> &'static str {
        match self {
            Language::Russian => "Русский",
            Language::English => "English",
        }
    }

    /// Get all supported languages
    pub fn all() -> Vec<Language> {
        vec![Language::Russian, Language::English]
    }

    /// Parse language from code
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "ru" => Some(Language::Russian),
            "en" => Some(Language::English),
            _ => None,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Russian
    }
}

/// Translation map for a single language
#[derive(Debug, Clone)]
struct LanguageTranslations {
    translations: HashMap<&'static str, &'static str>,
}

impl LanguageTranslations {
    fn new() -> Self {
        Self { translations: HashMap::new() }
    }

    fn add(&mut self, key: &'static str, value: &'static str) {
        self.translations.insert(key, value);
    }

    fn get(&self, key: &str) -> Option<&'static str> {
        self.translations.get(key).copied()
    }
}

/// Internationalization manager
#[derive(Debug, Clone)]
pub struct I18nManager {
    current_language: Language,
    translations: HashMap<Language, LanguageTranslations>,
    fallback_language: Language,
}

impl I18nManager {
    /// Create new I18n manager
    pub fn new() -> Self {
        let mut manager = Self {
            current_language: Language::default(),
            translations: HashMap::new(),
            fallback_language: Language::English,
        };

        manager.load_default_translations();
        manager
    }

    /// Set current language
    pub fn set_language(&mut self, language: Language) {
        info!("Setting language to: {}", language.name());
        self.current_language = language;
    }

    /// Get current language
    pub fn current_language(&self) -> Language {
        self.current_language
    }

    /// Get translation for current language
    pub fn t(&self, key: &str) -> String {
        self.get_translation(key, self.current_language)
    }

    /// Get translation for specific language
    pub fn get_translation(&self, key: &str, language: Language) -> String {
        if let Some(translations) = self.translations.get(&language) {
            if let Some(translation) = translations.get(key) {
                return translation.to_string();
            }
        }

        // Fallback language, then the key itself
        if language != self.fallback_language {
            if let Some(translations) = self.translations.get(&self.fallback_language) {
                if let Some(translation) = translations.get(key) {
                    return translation.to_string();
                }
            }
        }

        warn!("Translation missing for key '{}'", key);
        key.to_string()
    }

    fn load_default_translations(&mut self) {
        let mut ru = LanguageTranslations::new();

        ru.add("app.title", "ReviewDesk Studio");

        // Navigation
        ru.add("nav.reviews", "Отзывы");
        ru.add("nav.questions", "Вопросы");
        ru.add("nav.autopilot", "Автопилот");
        ru.add("nav.settings", "Настройки");

        // Listings
        ru.add("list.refresh", "Обновить");
        ru.add("list.show_archive", "Показать отвеченные");
        ru.add("list.empty_reviews", "Новых отзывов нет");
        ru.add("list.empty_questions", "Новых вопросов нет");
        ru.add("list.archive_empty", "Архив пуст");
        ru.add("list.loading", "Загрузка…");

        // Item cards
        ru.add("card.rating", "Оценка");
        ru.add("card.pros", "Достоинства");
        ru.add("card.cons", "Недостатки");
        ru.add("card.no_text", "Отзыв без текста");
        ru.add("card.answer_placeholder", "Черновик ответа…");
        ru.add("card.generate", "Сгенерировать");
        ru.add("card.generating", "Генерация…");
        ru.add("card.send", "Отправить");
        ru.add("card.sending", "Отправка…");
        ru.add("card.answered_label", "Ответ продавца");
        ru.add("card.too_short", "Ответ слишком короткий");

        // Autopilot
        ru.add("autopilot.title", "Автопилот");
        ru.add("autopilot.start", "Запустить");
        ru.add("autopilot.stop", "Остановить");
        ru.add("autopilot.stopping", "Завершение прохода…");
        ru.add("autopilot.running", "Работает");
        ru.add("autopilot.idle", "Остановлен");
        ru.add("autopilot.include_questions", "Отвечать на вопросы");
        ru.add("autopilot.item_delay", "Пауза между ответами (сек)");
        ru.add("autopilot.pass_delay", "Пауза между проходами (сек)");
        ru.add("autopilot.log_title", "Журнал");
        ru.add("autopilot.pass_started", "Проход начат");
        ru.add("autopilot.pass_finished", "Проход завершён");
        ru.add("autopilot.item_answered", "Отправлен ответ");
        ru.add("autopilot.item_skipped", "Пропущено");
        ru.add("autopilot.stopped", "Автопилот остановлен");

        // Settings
        ru.add("settings.title", "Настройки");
        ru.add("settings.marketplace", "Маркетплейс");
        ru.add("settings.token", "Токен WB API");
        ru.add("settings.base_url", "Адрес API");
        ru.add("settings.question_state", "Статус вопроса при ответе");
        ru.add("settings.llm", "Генерация ответов");
        ru.add("settings.api_key", "Ключ API");
        ru.add("settings.provider", "Провайдер");
        ru.add("settings.model", "Модель");
        ru.add("settings.temperature", "Температура");
        ru.add("settings.reply", "Текст ответов");
        ru.add("settings.instruction", "Указания для модели");
        ru.add("settings.signature", "Подпись");
        ru.add("settings.appearance", "Внешний вид");
        ru.add("settings.font_size", "Размер шрифта");
        ru.add("settings.language", "Язык интерфейса");
        ru.add("settings.apply", "Применить");
        ru.add("settings.applied", "Настройки применены");
        ru.add("settings.apply_failed", "Не удалось применить настройки");
        ru.add("settings.saved", "Настройки сохранены");
        ru.add("settings.save_failed", "Не удалось сохранить настройки");

        // Status bar
        ru.add("status.reviews", "отзывов");
        ru.add("status.questions", "вопросов");
        ru.add("status.requests", "запросов");
        ru.add("status.errors", "ошибок");

        // Notifications
        ru.add("toast.reviews_failed", "Не удалось получить отзывы");
        ru.add("toast.questions_failed", "Не удалось получить вопросы");
        ru.add("toast.draft_failed", "Не удалось сгенерировать ответ");
        ru.add("toast.submit_failed", "Не удалось отправить ответ");
        ru.add("toast.answer_sent", "Ответ отправлен");

        self.translations.insert(Language::Russian, ru);

        let mut en = LanguageTranslations::new();

        en.add("app.title", "ReviewDesk Studio");

        // Navigation
        en.add("nav.reviews", "Reviews");
        en.add("nav.questions", "Questions");
        en.add("nav.autopilot", "Autopilot");
        en.add("nav.settings", "Settings");

        // Listings
        en.add("list.refresh", "Refresh");
        en.add("list.show_archive", "Show answered");
        en.add("list.empty_reviews", "No pending reviews");
        en.add("list.empty_questions", "No pending questions");
        en.add("list.archive_empty", "Archive is empty");
        en.add("list.loading", "Loading…");

        // Item cards
        en.add("card.rating", "Rating");
        en.add("card.pros", "Pros");
        en.add("card.cons", "Cons");
        en.add("card.no_text", "Review without text");
        en.add("card.answer_placeholder", "Draft reply…");
        en.add("card.generate", "Generate");
        en.add("card.generating", "Generating…");
        en.add("card.send", "Send");
        en.add("card.sending", "Sending…");
        en.add("card.answered_label", "Seller reply");
        en.add("card.too_short", "Reply is too short");

        // Autopilot
        en.add("autopilot.title", "Autopilot");
        en.add("autopilot.start", "Start");
        en.add("autopilot.stop", "Stop");
        en.add("autopilot.stopping", "Finishing the pass…");
        en.add("autopilot.running", "Running");
        en.add("autopilot.idle", "Stopped");
        en.add("autopilot.include_questions", "Answer questions too");
        en.add("autopilot.item_delay", "Delay between replies (sec)");
        en.add("autopilot.pass_delay", "Delay between passes (sec)");
        en.add("autopilot.log_title", "Log");
        en.add("autopilot.pass_started", "Pass started");
        en.add("autopilot.pass_finished", "Pass finished");
        en.add("autopilot.item_answered", "Reply sent");
        en.add("autopilot.item_skipped", "Skipped");
        en.add("autopilot.stopped", "Autopilot stopped");

        // Settings
        en.add("settings.title", "Settings");
        en.add("settings.marketplace", "Marketplace");
        en.add("settings.token", "WB API token");
        en.add("settings.base_url", "API base URL");
        en.add("settings.question_state", "Question state on submit");
        en.add("settings.llm", "Reply generation");
        en.add("settings.api_key", "API key");
        en.add("settings.provider", "Provider");
        en.add("settings.model", "Model");
        en.add("settings.temperature", "Temperature");
        en.add("settings.reply", "Reply text");
        en.add("settings.instruction", "Model instructions");
        en.add("settings.signature", "Signature");
        en.add("settings.appearance", "Appearance");
        en.add("settings.font_size", "Font size");
        en.add("settings.language", "Interface language");
        en.add("settings.apply", "Apply");
        en.add("settings.applied", "Settings applied");
        en.add("settings.apply_failed", "Could not apply settings");
        en.add("settings.saved", "Settings saved");
        en.add("settings.save_failed", "Could not save settings");

        // Status bar
        en.add("status.reviews", "reviews");
        en.add("status.questions", "questions");
        en.add("status.requests", "requests");
        en.add("status.errors", "errors");

        // Notifications
        en.add("toast.reviews_failed", "Could not load reviews");
        en.add("toast.questions_failed", "Could not load questions");
        en.add("toast.draft_failed", "Could not generate a reply");
        en.add("toast.submit_failed", "Could not send the reply");
        en.add("toast.answer_sent", "Reply sent");

        self.translations.insert(Language::English, en);

        info!("Loaded default translations for {} languages", self.translations.len());
    }
}

impl Default for I18nManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::Russian.code(), "ru");
        assert_eq!(Language::English.code(), "en");
    }

    #[test]
    fn test_language_from_code() {
        assert_eq!(Language::from_code("ru"), Some(Language::Russian));
        assert_eq!(Language::from_code("EN"), Some(Language::English));
        assert_eq!(Language::from_code("de"), None);
    }

    #[test]
    fn test_default_language_is_russian() {
        let manager = I18nManager::new();
        assert_eq!(manager.current_language(), Language::Russian);
        assert_eq!(manager.t("card.send"), "Отправить");
    }

    #[test]
    fn test_language_switch() {
        let mut manager = I18nManager::new();
        manager.set_language(Language::English);
        assert_eq!(manager.t("card.send"), "Send");
        assert_eq!(manager.t("nav.reviews"), "Reviews");
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let manager = I18nManager::new();
        assert_eq!(manager.t("no.such.key"), "no.such.key");
    }
}
