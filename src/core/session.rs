use std::collections::{HashMap, HashSet};

use crate::marketplace::{FeedbackItem, ItemCategory, QuestionItem};

/// In-memory session state: the pending queues plus the operator's draft
/// answers. The marketplace stays authoritative; every listing fully
/// replaces the matching snapshot here, and an item leaves the pending set
/// exactly when its answer was accepted.
#[derive(Debug, Default)]
pub struct SessionState {
    feedbacks: Vec<FeedbackItem>,
    questions: Vec<QuestionItem>,
    drafts: HashMap<String, String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feedbacks(&self) -> &[FeedbackItem] {
        &self.feedbacks
    }

    pub fn questions(&self) -> &[QuestionItem] {
        &self.questions
    }

    pub fn feedback(&self, id: &str) -> Option<&FeedbackItem> {
        self.feedbacks.iter().find(|item| item.id == id)
    }

    pub fn question(&self, id: &str) -> Option<&QuestionItem> {
        self.questions.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, category: ItemCategory, id: &str) -> bool {
        match category {
            ItemCategory::Feedback => self.feedback(id).is_some(),
            ItemCategory::Question => self.question(id).is_some(),
        }
    }

    /// Replace the feedback snapshot with a fresh listing
    pub fn replace_feedbacks(&mut self, items: Vec<FeedbackItem>) {
        self.feedbacks = items;
        self.prune_drafts();
    }

    /// Replace the question snapshot with a fresh listing
    pub fn replace_questions(&mut self, items: Vec<QuestionItem>) {
        self.questions = items;
        self.prune_drafts();
    }

    pub fn draft(&self, id: &str) -> Option<&str> {
        self.drafts.get(id).map(String::as_str)
    }

    pub fn set_draft(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.drafts.insert(id.into(), text.into());
    }

    /// Editable draft buffer for an item, created empty on first access
    pub fn draft_mut(&mut self, id: &str) -> &mut String {
        self.drafts.entry(id.to_string()).or_default()
    }

    pub fn clear_draft(&mut self, id: &str) {
        self.drafts.remove(id);
    }

    /// Remove the answered item from its pending queue and discard its
    /// draft. Returns false (and changes nothing) when the id is not
    /// pending, which covers the failed-submit case: the caller only
    /// invokes this after the marketplace accepted the answer.
    pub fn mark_answered(&mut self, category: ItemCategory, id: &str) -> bool {
        let removed = match category {
            ItemCategory::Feedback => {
                let before = self.feedbacks.len();
                self.feedbacks.retain(|item| item.id != id);
                self.feedbacks.len() != before
            }
            ItemCategory::Question => {
                let before = self.questions.len();
                self.questions.retain(|item| item.id != id);
                self.questions.len() != before
            }
        };

        if removed {
            self.drafts.remove(id);
        }
        removed
    }

    /// Drafts survive only while their item is still pending
    fn prune_drafts(&mut self) {
        let pending: HashSet<&str> = self
            .feedbacks
            .iter()
            .map(|item| item.id.as_str())
            .chain(self.questions.iter().map(|item| item.id.as_str()))
            .collect();
        self.drafts.retain(|id, _| pending.contains(id.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feedback(id: &str) -> FeedbackItem {
        serde_json::from_value(json!({
            "id": id,
            "text": "Отличный товар",
            "productValuation": 5,
            "createdDate": "2024-01-09T17:24:13+03:00",
            "productDetails": {"nmId": 1, "productName": "Куртка", "supplierArticle": "A", "brandName": "B"}
        }))
        .unwrap()
    }

    fn question(id: &str) -> QuestionItem {
        serde_json::from_value(json!({
            "id": id,
            "text": "Есть ли размер 46?",
            "createdDate": "2024-02-01T10:30:00+03:00",
            "productDetails": {"nmId": 1, "productName": "Куртка", "supplierArticle": "A", "brandName": "B"}
        }))
        .unwrap()
    }

    #[test]
    fn test_listing_replaces_snapshot() {
        let mut state = SessionState::new();
        state.replace_feedbacks(vec![feedback("a"), feedback("b")]);
        assert_eq!(state.feedbacks().len(), 2);

        // A fresh listing is authoritative, not merged
        state.replace_feedbacks(vec![feedback("c")]);
        assert_eq!(state.feedbacks().len(), 1);
        assert!(state.feedback("a").is_none());
        assert!(state.feedback("c").is_some());
    }

    #[test]
    fn test_replacing_with_same_listing_is_idempotent() {
        let mut state = SessionState::new();
        state.replace_feedbacks(vec![feedback("a"), feedback("b")]);
        state.set_draft("a", "Спасибо!");

        state.replace_feedbacks(vec![feedback("a"), feedback("b")]);
        assert_eq!(state.feedbacks().len(), 2);
        assert_eq!(state.draft("a"), Some("Спасибо!"));
    }

    #[test]
    fn test_snapshot_ids_distinct_and_preserved() {
        let mut state = SessionState::new();
        state.replace_feedbacks(vec![feedback("a"), feedback("b"), feedback("c")]);
        state.replace_questions(vec![question("q-1"), question("q-2")]);

        let ids: Vec<&str> = state.feedbacks().iter().map(|item| item.id.as_str()).collect();
        let distinct: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(distinct.len(), ids.len());
        // Ids and their order come through the snapshot untouched
        assert_eq!(ids, vec!["a", "b", "c"]);

        let question_ids: HashSet<&str> =
            state.questions().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(question_ids.len(), state.questions().len());
    }

    #[test]
    fn test_drafts_pruned_for_items_no_longer_pending() {
        let mut state = SessionState::new();
        state.replace_feedbacks(vec![feedback("a"), feedback("b")]);
        state.set_draft("a", "Ответ для a");
        state.set_draft("b", "Ответ для b");

        state.replace_feedbacks(vec![feedback("b")]);
        assert_eq!(state.draft("a"), None);
        assert_eq!(state.draft("b"), Some("Ответ для b"));
    }

    #[test]
    fn test_draft_for_question_survives_feedback_refresh() {
        let mut state = SessionState::new();
        state.replace_questions(vec![question("q-1")]);
        state.set_draft("q-1", "Да, есть.");

        state.replace_feedbacks(vec![feedback("a")]);
        assert_eq!(state.draft("q-1"), Some("Да, есть."));
    }

    #[test]
    fn test_mark_answered_removes_exactly_one_item() {
        let mut state = SessionState::new();
        state.replace_feedbacks(vec![feedback("a"), feedback("b"), feedback("c")]);
        state.set_draft("b", "Ответ");

        assert!(state.mark_answered(ItemCategory::Feedback, "b"));
        assert_eq!(state.feedbacks().len(), 2);
        assert!(state.feedback("a").is_some());
        assert!(state.feedback("b").is_none());
        assert!(state.feedback("c").is_some());
        assert_eq!(state.draft("b"), None);
    }

    #[test]
    fn test_mark_answered_unknown_id_changes_nothing() {
        let mut state = SessionState::new();
        state.replace_feedbacks(vec![feedback("a")]);
        state.set_draft("a", "Ответ");

        assert!(!state.mark_answered(ItemCategory::Feedback, "zzz"));
        assert_eq!(state.feedbacks().len(), 1);
        assert_eq!(state.draft("a"), Some("Ответ"));
    }

    #[test]
    fn test_categories_do_not_cross() {
        let mut state = SessionState::new();
        state.replace_feedbacks(vec![feedback("x")]);
        state.replace_questions(vec![question("y")]);

        assert!(!state.mark_answered(ItemCategory::Question, "x"));
        assert!(state.contains(ItemCategory::Feedback, "x"));
        assert!(state.mark_answered(ItemCategory::Question, "y"));
        assert!(!state.contains(ItemCategory::Question, "y"));
    }
}
