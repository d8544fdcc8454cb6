use std::fmt::Write as _;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, EnvFilter, Layer, Registry};

const DEFAULT_FILTER: &str = "warn,prizeplay_backend=info,prizeplay_shared=info,tower_http=info";

/// Message plus any structured fields, e.g. `session=… game=…`.
#[derive(Default)]
struct EventFields {
    message: String,
    extra: Vec<(&'static str, String)>,
}

impl EventFields {
    fn push(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message.push_str(&value),
            // bridged `log` records carry their origin as fields
            name if name.starts_with("log.") => {}
            name => self.extra.push((name, value)),
        }
    }

    fn is_empty(&self) -> bool {
        self.message.is_empty() && self.extra.is_empty()
    }
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }
}

fn format_line(timestamp: &str, level: Level, target: &str, fields: &EventFields) -> String {
    let badge = match level {
        Level::ERROR => "❌ Error:",
        Level::WARN => "⚠️ Warning:",
        Level::INFO => "ℹ️",
        _ => "🔄",
    };
    let mut line = format!("[{}] {} {} - {}", timestamp, badge, target, fields.message);
    for (name, value) in &fields.extra {
        let _ = write!(line, " {}={}", name, value);
    }
    line
}

struct HostLayer;

impl<S: Subscriber> Layer<S> for HostLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut fields = EventFields::default();
        event.record(&mut fields);
        if fields.is_empty() {
            return;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        let line = format_line(&timestamp, *metadata.level(), metadata.target(), &fields);
        if *metadata.level() <= Level::WARN {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Installs the global subscriber. `log` records from the game library are
/// routed through it as well.
pub fn setup() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = Registry::default().with(env_filter).with(HostLayer);
    if let Err(e) = subscriber.try_init() {
        eprintln!("Failed to set subscriber: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(message: &str, extra: &[(&'static str, &str)]) -> EventFields {
        EventFields {
            message: message.to_string(),
            extra: extra.iter().map(|(k, v)| (*k, v.to_string())).collect(),
        }
    }

    #[test]
    fn test_line_carries_level_badge_and_fields() {
        let line = format_line(
            "2024-01-01 00:00:00.000",
            Level::INFO,
            "prizeplay_backend::games",
            &fields("Opened session", &[("game", "plinko")]),
        );
        assert_eq!(line, "[2024-01-01 00:00:00.000] ℹ️ prizeplay_backend::games - Opened session game=plinko");

        let line = format_line("t", Level::WARN, "prizeplay_shared::config", &fields("fallback", &[]));
        assert_eq!(line, "[t] ⚠️ Warning: prizeplay_shared::config - fallback");
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_empty_event_is_skipped() {
        assert!(EventFields::default().is_empty());
        assert!(!fields("", &[("status", "500")]).is_empty());
    }
}
