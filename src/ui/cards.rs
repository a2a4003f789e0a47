#[cfg(feature = "ui")]
use chrono::{DateTime, Utc};
#[cfg(feature = "ui")]
use eframe::egui;

#[cfg(feature = "ui")]
use crate::core::MIN_ANSWER_CHARS;
#[cfg(feature = "ui")]
use crate::i18n::I18nManager;
#[cfg(feature = "ui")]
use crate::marketplace::{FeedbackItem, ProductDetails, QuestionItem};
#[cfg(feature = "ui")]
use super::images::ThumbnailCache;

#[cfg(feature = "ui")]
const THUMBNAIL_SIZE: f32 = 72.0;
#[cfg(feature = "ui")]
const STAR_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 185, 45);

/// What the operator clicked on a card
#[cfg(feature = "ui")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Generate,
    Send,
}

/// Interactive card for one pending review
#[cfg(feature = "ui")]
pub fn feedback_card(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    i18n: &I18nManager,
    thumbnails: &mut ThumbnailCache,
    item: &FeedbackItem,
    draft: &mut String,
    generating: bool,
    sending: bool,
) -> Option<CardAction> {
    ui.push_id(item.id.as_str(), |ui| {
        card_frame(ui)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());

                ui.horizontal(|ui| {
                    thumbnail(ui, ctx, thumbnails, item.thumbnail_url());
                    ui.vertical(|ui| {
                        header_line(ui, &item.product_details, item.created_date);
                        ui.horizontal(|ui| {
                            ui.colored_label(STAR_COLOR, stars(item.product_valuation));
                            if let Some(author) = item.author() {
                                ui.weak(author);
                            }
                        });
                    });
                });

                ui.add_space(4.0);
                feedback_body(ui, i18n, item);
                ui.add_space(8.0);

                draft_editor(ui, i18n, draft, generating, sending)
            })
            .inner
    })
    .inner
}

/// Read-only card for an already answered review
#[cfg(feature = "ui")]
pub fn feedback_archive_card(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    i18n: &I18nManager,
    thumbnails: &mut ThumbnailCache,
    item: &FeedbackItem,
) {
    ui.push_id(item.id.as_str(), |ui| {
        card_frame(ui).show(ui, |ui| {
            ui.set_width(ui.available_width());

            ui.horizontal(|ui| {
                thumbnail(ui, ctx, thumbnails, item.thumbnail_url());
                ui.vertical(|ui| {
                    header_line(ui, &item.product_details, item.created_date);
                    ui.horizontal(|ui| {
                        ui.colored_label(STAR_COLOR, stars(item.product_valuation));
                        if let Some(author) = item.author() {
                            ui.weak(author);
                        }
                    });
                });
            });

            ui.add_space(4.0);
            feedback_body(ui, i18n, item);
            answer_section(ui, i18n, item.answer.as_ref().map(|a| a.text.as_str()));
        });
    });
}

/// Interactive card for one pending buyer question
#[cfg(feature = "ui")]
pub fn question_card(
    ui: &mut egui::Ui,
    i18n: &I18nManager,
    item: &QuestionItem,
    draft: &mut String,
    generating: bool,
    sending: bool,
) -> Option<CardAction> {
    ui.push_id(item.id.as_str(), |ui| {
        card_frame(ui)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());

                header_line(ui, &item.product_details, item.created_date);
                if let Some(author) = item.author() {
                    ui.weak(author);
                }

                ui.add_space(4.0);
                question_body(ui, item);
                ui.add_space(8.0);

                draft_editor(ui, i18n, draft, generating, sending)
            })
            .inner
    })
    .inner
}

/// Read-only card for an already answered question
#[cfg(feature = "ui")]
pub fn question_archive_card(ui: &mut egui::Ui, i18n: &I18nManager, item: &QuestionItem) {
    ui.push_id(item.id.as_str(), |ui| {
        card_frame(ui).show(ui, |ui| {
            ui.set_width(ui.available_width());

            header_line(ui, &item.product_details, item.created_date);
            if let Some(author) = item.author() {
                ui.weak(author);
            }

            ui.add_space(4.0);
            question_body(ui, item);
            answer_section(ui, i18n, item.answer.as_ref().map(|a| a.text.as_str()));
        });
    });
}

#[cfg(feature = "ui")]
fn card_frame(ui: &egui::Ui) -> egui::Frame {
    egui::Frame::group(ui.style())
        .rounding(egui::Rounding::same(8.0))
        .inner_margin(egui::Margin::same(12.0))
}

#[cfg(feature = "ui")]
fn header_line(ui: &mut egui::Ui, details: &ProductDetails, created: DateTime<Utc>) {
    ui.horizontal(|ui| {
        ui.strong(details.product_name.as_str());
        if !details.brand_name.trim().is_empty() {
            ui.weak(details.brand_name.as_str());
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(created.format("%d.%m.%Y %H:%M").to_string());
        });
    });
}

#[cfg(feature = "ui")]
fn thumbnail(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    thumbnails: &mut ThumbnailCache,
    url: Option<&str>,
) {
    if let Some(url) = url {
        let size = egui::vec2(THUMBNAIL_SIZE, THUMBNAIL_SIZE);
        match thumbnails.texture(ctx, url) {
            Some(texture) => {
                ui.image(egui::load::SizedTexture::new(texture.id(), size));
            }
            None => {
                ui.add_sized(size, egui::Label::new(egui::RichText::new("📦").size(32.0)));
            }
        }
    }
}

#[cfg(feature = "ui")]
fn feedback_body(ui: &mut egui::Ui, i18n: &I18nManager, item: &FeedbackItem) {
    let body = item.body();
    if body.is_empty() {
        ui.weak(i18n.t("card.no_text"));
    } else {
        ui.label(body);
    }

    if let Some(pros) = non_empty(&item.pros) {
        ui.horizontal_wrapped(|ui| {
            ui.strong(format!("{}:", i18n.t("card.pros")));
            ui.label(pros);
        });
    }
    if let Some(cons) = non_empty(&item.cons) {
        ui.horizontal_wrapped(|ui| {
            ui.strong(format!("{}:", i18n.t("card.cons")));
            ui.label(cons);
        });
    }
}

#[cfg(feature = "ui")]
fn question_body(ui: &mut egui::Ui, item: &QuestionItem) {
    let body = item.body();
    if body.is_empty() {
        ui.weak("—");
    } else {
        ui.label(body);
    }
}

#[cfg(feature = "ui")]
fn answer_section(ui: &mut egui::Ui, i18n: &I18nManager, answer: Option<&str>) {
    if let Some(text) = answer {
        ui.separator();
        ui.strong(i18n.t("card.answered_label"));
        ui.label(text);
    }
}

#[cfg(feature = "ui")]
fn draft_editor(
    ui: &mut egui::Ui,
    i18n: &I18nManager,
    draft: &mut String,
    generating: bool,
    sending: bool,
) -> Option<CardAction> {
    let mut action = None;
    let busy = generating || sending;

    ui.add_enabled(
        !busy,
        egui::TextEdit::multiline(draft)
            .hint_text(i18n.t("card.answer_placeholder"))
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    );

    ui.horizontal(|ui| {
        let generate_label = if generating {
            i18n.t("card.generating")
        } else {
            i18n.t("card.generate")
        };
        if ui.add_enabled(!busy, egui::Button::new(generate_label)).clicked() {
            action = Some(CardAction::Generate);
        }

        let chars = draft.trim().chars().count();
        let send_label = if sending {
            i18n.t("card.sending")
        } else {
            i18n.t("card.send")
        };
        let can_send = !busy && chars >= MIN_ANSWER_CHARS;
        if ui.add_enabled(can_send, egui::Button::new(send_label)).clicked() {
            action = Some(CardAction::Send);
        }

        if busy {
            ui.spinner();
        } else if chars > 0 && chars < MIN_ANSWER_CHARS {
            ui.weak(i18n.t("card.too_short"));
        }
    });

    action
}

#[cfg(feature = "ui")]
fn stars(valuation: u8) -> String {
    let filled = usize::from(valuation.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

#[cfg(feature = "ui")]
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(all(test, feature = "ui"))]
mod tests {
    use super::*;

    #[test]
    fn test_stars_rendering() {
        assert_eq!(stars(0), "☆☆☆☆☆");
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(5), "★★★★★");
        // Out-of-range valuations are clamped, not panicked on
        assert_eq!(stars(9), "★★★★★");
    }

    #[test]
    fn test_non_empty_trims_and_filters() {
        assert_eq!(non_empty(&Some("  Лёгкая  ".to_string())), Some("Лёгкая"));
        assert_eq!(non_empty(&Some("   ".to_string())), None);
        assert_eq!(non_empty(&None), None);
    }
}
