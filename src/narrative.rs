use crate::narrator::{Narration, DISABLED_MESSAGE};

/// Identifies one dispatched request. Later requests carry larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Disabled,
    Failed,
}

/// Inline message shown in place of (or next to) content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn failed(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Failed, message: message.into() }
    }

    pub fn disabled() -> Self {
        Self { kind: NoticeKind::Disabled, message: DISABLED_MESSAGE.to_string() }
    }
}

/// Settled result of a request, applied to the panel in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelUpdate<T> {
    pub content: Option<T>,
    pub notice: Option<Notice>,
}

impl<T> From<Narration<T>> for PanelUpdate<T> {
    fn from(n: Narration<T>) -> Self {
        match n {
            Narration::Ready(content) => Self { content: Some(content), notice: None },
            Narration::Disabled => Self { content: None, notice: Some(Notice::disabled()) },
            Narration::Unavailable(msg) => Self { content: None, notice: Some(Notice::failed(msg)) },
        }
    }
}

/// State of one on-demand AI panel.
///
/// Requests may overlap. Only the most recent one is allowed to land: a
/// response carrying an older token is dropped, and `loading` stays set until
/// the latest request settles.
#[derive(Debug)]
pub struct NarrativePanel<T> {
    issued: u64,
    loading: bool,
    subject: Option<String>,
    content: Option<T>,
    notice: Option<Notice>,
}

impl<T> Default for NarrativePanel<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            loading: false,
            subject: None,
            content: None,
            notice: None,
        }
    }
}

impl<T> NarrativePanel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a new request as in flight and clears the previous outcome.
    pub fn begin(&mut self, subject: impl Into<String>) -> RequestToken {
        self.issued += 1;
        self.loading = true;
        self.subject = Some(subject.into());
        self.content = None;
        self.notice = None;
        RequestToken(self.issued)
    }

    /// Applies a settled request. Returns `false` when `token` is stale.
    pub fn finish(&mut self, token: RequestToken, update: PanelUpdate<T>) -> bool {
        if token.0 != self.issued {
            tracing::debug!(token = token.0, latest = self.issued, "dropping stale response");
            return false;
        }
        self.loading = false;
        self.content = update.content;
        self.notice = update.notice;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(s: &str) -> PanelUpdate<String> {
        Narration::Ready(s.to_string()).into()
    }

    #[test]
    fn loading_spans_the_request() {
        let mut p = NarrativePanel::<String>::new();
        assert!(!p.is_loading());
        let t = p.begin("Bitcoin");
        assert!(p.is_loading());
        assert_eq!(p.subject(), Some("Bitcoin"));
        assert!(p.finish(t, ready("text")));
        assert!(!p.is_loading());
        assert_eq!(p.content().map(String::as_str), Some("text"));
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut p = NarrativePanel::<String>::new();
        let slow = p.begin("Bitcoin");
        let fast = p.begin("Ethereum");
        assert!(p.finish(fast, ready("eth")));
        assert!(!p.finish(slow, ready("btc")));
        assert_eq!(p.content().map(String::as_str), Some("eth"));
        assert_eq!(p.subject(), Some("Ethereum"));
    }

    #[test]
    fn stale_response_does_not_clear_loading() {
        let mut p = NarrativePanel::<String>::new();
        let first = p.begin("a");
        let _second = p.begin("b");
        p.finish(first, ready("a"));
        assert!(p.is_loading());
        assert!(p.content().is_none());
    }

    #[test]
    fn failure_notice_is_cleared_by_next_request() {
        let mut p = NarrativePanel::<String>::new();
        let t = p.begin("Bitcoin");
        p.finish(t, Narration::Unavailable("sorry".into()).into());
        assert_eq!(p.notice().map(|n| n.kind), Some(NoticeKind::Failed));
        let t = p.begin("Bitcoin");
        assert!(p.notice().is_none());
        p.finish(t, ready("ok"));
        assert!(p.notice().is_none());
    }

    #[test]
    fn disabled_is_its_own_notice() {
        let update: PanelUpdate<String> = Narration::Disabled.into();
        assert_eq!(update.notice, Some(Notice::disabled()));
        assert!(update.content.is_none());
    }
}
