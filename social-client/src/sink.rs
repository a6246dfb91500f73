use std::sync::{Arc, Mutex};

use tracing::info;

/// Приёмник уведомлений потока входа.
///
/// Все сообщения потока проходят через один приёмник.
pub trait NotificationSink: Send + Sync {
    /// Передаёт сообщение пользователю или разработчику.
    fn notify(&self, message: &str);
}

impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for Box<T> {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}

#[derive(Debug, Default)]
/// Дописывает `message + "<br />"` в HTML-содержимое блока страницы.
pub struct HtmlSink {
    content: Mutex<String>,
}

impl HtmlSink {
    /// Создаёт пустой блок.
    pub fn new() -> Self {
        Self::default()
    }

    /// Текущее HTML-содержимое блока.
    pub fn content(&self) -> String {
        self.content
            .lock()
            .map(|content| content.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl NotificationSink for HtmlSink {
    fn notify(&self, message: &str) {
        let mut content = self
            .content
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        content.push_str(&escape_html(message));
        content.push_str("<br />");
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[derive(Debug, Default, Clone, Copy)]
/// Консоль разработчика: сообщения уходят в `tracing`, пользователь их не видит.
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, message: &str) {
        info!(target: "social_client::console", "{message}");
    }
}

#[derive(Debug, Default, Clone, Copy)]
/// Печатает сообщения в stdout, по одному в строке.
pub struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn notify(&self, message: &str) {
        println!("{message}");
    }
}

#[derive(Debug, Default)]
/// Запоминает сообщения в порядке поступления.
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Создаёт пустой приёмник.
    pub fn new() -> Self {
        Self::default()
    }

    /// Снимок полученных сообщений.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_sink_appends_line_breaks() {
        let sink = HtmlSink::new();
        sink.notify("Welcome!");
        sink.notify("Found 3 posts");
        assert_eq!(sink.content(), "Welcome!<br />Found 3 posts<br />");
    }

    #[test]
    fn html_sink_escapes_markup() {
        let sink = HtmlSink::new();
        sink.notify("Good to see you, <b>Ada</b> & co.");
        assert_eq!(
            sink.content(),
            "Good to see you, &lt;b&gt;Ada&lt;/b&gt; &amp; co.<br />"
        );
    }

    #[test]
    fn recording_sink_keeps_order_through_arc() {
        let sink = Arc::new(RecordingSink::new());
        let shared: Arc<dyn NotificationSink> = sink.clone();
        shared.notify("one");
        shared.notify("two");
        assert_eq!(sink.messages(), vec!["one", "two"]);
    }
}
