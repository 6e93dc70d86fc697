//! Serialize/parse round trips through XML text.

use ironxso::prelude::*;
use ironxso::stream::parse_events;

const NS: &str = "urn:example:roster";

struct Roster {
    item: XsoType,
    query: XsoType,
}

fn roster() -> Roster {
    let item = XsoTypeBuilder::new("Item")
        .tag((NS, "item"))
        .field(Field::attr("jid", "jid").build())
        .field(
            Field::attr("priority", "priority")
                .value_type(IntegerType)
                .default(0)
                .build(),
        )
        .field(Field::text("note").default("").build())
        .build()
        .unwrap();
    let query = XsoTypeBuilder::new("Query")
        .tag((NS, "query"))
        .field(Field::attr("ver", "ver").default(Value::None).build())
        .field(Field::lang_attr("lang").build())
        .field(Field::child_list("items", &[&item]).build())
        .field(Field::child_flag("approved", (NS, "approved")).build())
        .field(Field::child_text("status", (NS, "status")).default("").build())
        .field(
            Field::child_tag("show", Some(NS), &["away", "dnd"])
                .allow_none()
                .build(),
        )
        .build()
        .unwrap();
    Roster { item, query }
}

fn item(ty: &XsoType, jid: &str, priority: i64, note: &str) -> Xso {
    let mut xso = Xso::new(ty);
    xso.set_by_name("jid", jid).unwrap();
    xso.set_by_name("priority", priority).unwrap();
    xso.set_by_name("note", note).unwrap();
    xso
}

#[test]
fn test_full_instance_round_trips() {
    let roster = roster();
    let mut query = Xso::new(&roster.query);
    query.set_by_name("ver", "v7").unwrap();
    query
        .set_by_name("lang", LanguageTag::parse("en-GB").unwrap())
        .unwrap();
    query.set_by_name("approved", true).unwrap();
    query.set_by_name("status", "Busy & away").unwrap();
    query
        .set_by_name("show", Tag::qualified(NS, "dnd"))
        .unwrap();
    let items = query.field("items").unwrap();
    let list = query.children_mut(&items).unwrap();
    list.push(item(&roster.item, "romeo@example.net", 5, "friend"));
    list.push(item(&roster.item, "juliet@example.com", 0, ""));

    let xml = to_string(&query).unwrap();
    let parsed = parse_one(&roster.query, &xml).unwrap();
    assert_eq!(parsed, query);
    assert_eq!(parsed.children(&items).unwrap().len(), 2);
}

#[test]
fn test_defaults_are_not_written() {
    let roster = roster();
    let query = Xso::new(&roster.query);
    assert_eq!(
        to_string(&query).unwrap(),
        r#"<query xmlns="urn:example:roster"/>"#
    );
    let parsed = parse_one(&roster.query, &to_string(&query).unwrap()).unwrap();
    assert_eq!(parsed, query);
    assert_eq!(parsed.get_by_name("show").unwrap(), Value::None);
    assert_eq!(parsed.get_by_name("approved").unwrap(), Value::Bool(false));
}

#[test]
fn test_collected_subtree_is_reproduced() {
    let body = Field::child_text("body", ("urn:m", "body")).default("").build();
    let any = Field::collector("any").build();
    let msg = XsoTypeBuilder::new("Msg")
        .tag(("urn:m", "msg"))
        .fields([body, any.clone()])
        .build()
        .unwrap();

    let input = r#"<msg xmlns="urn:m"><body>hi</body><x xmlns="urn:ext" xmlns:p="urn:p" p:a="1"><y>t &amp; u</y></x></msg>"#;
    let parsed = parse_one(&msg, input).unwrap();
    assert_eq!(parsed.collected(&any).unwrap().len(), 1);

    let output = to_string(&parsed).unwrap();
    assert_eq!(parse_events(&output).unwrap(), parse_events(input).unwrap());
}

#[test]
fn test_capturing_type_keeps_raw_events() {
    let ty = XsoTypeBuilder::new("Raw")
        .tag("raw")
        .capturing()
        .build()
        .unwrap();
    let input = r#"<raw a="1"><child>text</child><other/></raw>"#;
    let parsed = parse_one(&ty, input).unwrap();
    assert_eq!(
        parsed.captured_events().unwrap(),
        parse_events(input).unwrap().as_slice()
    );
}

#[test]
fn test_declared_prefixes_name_attributes() {
    let flag = Field::attr("flag", ("urn:x", "flag"))
        .value_type(IntegerType)
        .build();
    let ty = XsoTypeBuilder::new("T")
        .tag(("urn:t", "t"))
        .declare_ns(Some("x"), "urn:x")
        .field(flag.clone())
        .build()
        .unwrap();
    let mut xso = Xso::new(&ty);
    xso.set(&flag, 1).unwrap();

    let xml = to_string(&xso).unwrap();
    assert_eq!(xml, r#"<t xmlns="urn:t" xmlns:x="urn:x" x:flag="1"/>"#);
    assert_eq!(parse_one(&ty, &xml).unwrap(), xso);
}

#[test]
fn test_text_map_round_trips() {
    let bodies = Field::child_text_map("bodies", "body").unwrap().build();
    let ty = XsoTypeBuilder::new("Message")
        .tag("message")
        .field(bodies.clone())
        .build()
        .unwrap();
    let mut xso = Xso::new(&ty);
    let map = xso.value_map_mut(&bodies).unwrap();
    map.insert(Value::None, Value::from("plain"));
    map.insert(
        Value::Lang(LanguageTag::parse("de").unwrap()),
        Value::from("Hallo"),
    );

    let parsed = parse_one(&ty, &to_string(&xso).unwrap()).unwrap();
    assert_eq!(parsed, xso);
}

#[test]
fn test_empty_text_survives_round_trip() {
    let text = Field::text("t").default("x").build();
    let ty = XsoTypeBuilder::new("Note")
        .tag("note")
        .field(text.clone())
        .build()
        .unwrap();
    let mut xso = Xso::new(&ty);
    xso.set(&text, "").unwrap();

    let xml = to_string(&xso).unwrap();
    assert_eq!(xml, "<note/>");
    let parsed = parse_one(&ty, &xml).unwrap();
    assert_eq!(parsed.get(&text).unwrap(), Value::from(""));
    assert_eq!(parsed, xso);
}

#[test]
fn test_pretty_printed_leaves_parse() {
    let r = roster();
    let xml = "<query xmlns=\"urn:example:roster\">\n  <approved>\n  </approved>\n  <away> </away>\n</query>";
    let parsed = parse_one(&r.query, xml).unwrap();
    assert_eq!(parsed.get_by_name("approved").unwrap(), Value::Bool(true));
    assert_eq!(
        parsed.get_by_name("show").unwrap(),
        Value::Tag(Tag::qualified(NS, "away"))
    );
}
