//! Example parsing a chat stream into typed messages and writing a reply.
//!
//! Run with: `cargo run --example chat_stream`

use ironxso::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

const CLIENT: &str = "jabber:client";

const STREAM: &str = r#"
<message xmlns="jabber:client" from="romeo@example.net" xml:lang="en">
  <body>Art thou not Romeo, and a Montague?</body>
  <active xmlns="http://jabber.org/protocol/chatstates"/>
</message>
<message xmlns="jabber:client" from="juliet@example.com" xml:lang="it">
  <body>Neither, fair saint, if either thee dislike.</body>
</message>
"#;

/// Prints every message and counts them.
struct PrintHandler {
    message_count: AtomicU64,
}

impl PrintHandler {
    fn new() -> Self {
        Self {
            message_count: AtomicU64::new(0),
        }
    }
}

impl XsoHandler for PrintHandler {
    fn on_xso(&self, xso: Xso) {
        let count = self.message_count.fetch_add(1, Ordering::Relaxed) + 1;
        let from = xso.get_by_name("from").unwrap_or(Value::None);
        let body = xso.get_by_name("body").unwrap_or(Value::None);
        let lang = xso
            .lang()
            .map_or_else(|| "-".to_string(), |l| l.to_string());
        let extensions = xso
            .field("extensions")
            .and_then(|f| xso.collected(&f).map(<[_]>::len))
            .unwrap_or(0);

        println!(
            "[Stream] Message #{} from {} ({}): {:?}, {} extension(s)",
            count, from, lang, body, extensions
        );
    }

    fn on_error(&self, error: &ParseError) {
        eprintln!("[Stream] Failed to parse message: {}", error);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let message = XsoTypeBuilder::new("Message")
        .tag((CLIENT, "message"))
        .field(Field::attr("from", "from").default(Value::None).build())
        .field(Field::attr("to", "to").default(Value::None).build())
        .field(Field::lang_attr("lang").build())
        .field(Field::child_text("body", (CLIENT, "body")).default("").build())
        .field(Field::collector("extensions").build())
        .build()?;

    let mut parser = XsoParserBuilder::new()
        .handle(&message, PrintHandler::new())
        .lang(LanguageTag::parse("en")?)
        .build()?;

    parser.feed_str(STREAM)?;
    parser.close();

    let mut reply = Xso::new(&message);
    reply.set_by_name("to", "romeo@example.net")?;
    reply.set_by_name("body", "Wherefore art thou?")?;
    println!("[Stream] Reply: {}", to_string(&reply)?);

    Ok(())
}
