//! Serialization of instances into event sinks.
//!
//! Output order is fixed: namespace declarations, the start event with all
//! non-default attributes, the text, child fields in merged declaration
//! order, collected subtrees, and the end event.

use crate::error::SerializeError;
use crate::field::{Field, FieldKind, Scalar};
use crate::xso::Xso;
use ironxso_core::{Attributes, Event, EventSink, Tag, Value, replay};

fn format(field: &Field, scalar: &Scalar, value: &Value) -> Result<String, SerializeError> {
    scalar
        .format(value)
        .map_err(|e| SerializeError::Format {
            field: field.name().to_string(),
            reason: e.message,
        })
}

/// Returns true if a scalar value is left out of the output.
fn omitted(field: &Field, value: &Value) -> bool {
    value.is_none() || field.default_value().as_ref() == Some(value)
}

fn empty_element<S: EventSink + ?Sized>(sink: &mut S, tag: &Tag) -> Result<(), SerializeError> {
    sink.start(tag, &Attributes::new())?;
    sink.end()?;
    Ok(())
}

impl Xso {
    /// Writes the instance as one element.
    ///
    /// # Errors
    /// Returns [`SerializeError::Untagged`] for tagless types,
    /// [`SerializeError::Access`] if a field without a default is unset or
    /// incomplete, or the sink's error.
    pub fn serialize<S: EventSink + ?Sized>(&self, sink: &mut S) -> Result<(), SerializeError> {
        let ty = self.xso_type();
        let tag = ty.tag().ok_or_else(|| SerializeError::Untagged {
            type_name: ty.name().to_string(),
        })?;

        if let Some(namespaces) = ty.declare_ns() {
            for (prefix, namespace) in namespaces {
                sink.declare_prefix(prefix.as_deref(), namespace)?;
            }
        }

        let mut attrs = Attributes::new();
        for field in ty.attr_fields() {
            let (Some(attr), Some(scalar)) = (field.attr_tag(), field.scalar()) else {
                continue;
            };
            let value = self.get(&field)?;
            if omitted(&field, &value) {
                continue;
            }
            attrs.insert(attr.clone(), format(&field, scalar, &value)?);
        }
        sink.start(tag, &attrs)?;

        if let Some(field) = ty.text_field()
            && let Some(scalar) = field.scalar()
        {
            let value = self.get(&field)?;
            if !value.is_none() {
                let text = format(&field, scalar, &value)?;
                if !text.is_empty() {
                    sink.text(&text)?;
                }
            }
        }

        for field in ty.child_fields() {
            self.serialize_child_field(&field, sink)?;
        }

        if let Some(field) = ty.collector_field() {
            for subtree in self.collected(&field)? {
                replay(subtree, sink)?;
            }
        }

        sink.end()?;
        Ok(())
    }

    fn serialize_child_field<S: EventSink + ?Sized>(
        &self,
        field: &Field,
        sink: &mut S,
    ) -> Result<(), SerializeError> {
        match field.kind() {
            FieldKind::Child { .. } => {
                if let Some(child) = self.child(field)? {
                    child.serialize(sink)?;
                }
            }
            FieldKind::ChildList { .. } => {
                for child in self.children(field)?.iter() {
                    child.serialize(sink)?;
                }
            }
            FieldKind::ChildMap { .. } => {
                for child in self.child_map(field)?.values().flat_map(|l| l.iter()) {
                    child.serialize(sink)?;
                }
            }
            FieldKind::ChildFlag { tag, .. } => {
                if self.get(field)?.as_bool() == Some(true) {
                    empty_element(sink, tag)?;
                }
            }
            FieldKind::ChildText { tag, scalar, .. } => {
                let value = self.get(field)?;
                if !omitted(field, &value) {
                    sink.start(tag, &Attributes::new())?;
                    let text = format(field, scalar, &value)?;
                    if !text.is_empty() {
                        sink.text(&text)?;
                    }
                    sink.end()?;
                }
            }
            FieldKind::ChildTag { choices, .. } => {
                let value = self.get(field)?;
                if !value.is_none() {
                    let tag = choices
                        .tag_for(&value)
                        .ok_or_else(|| SerializeError::Format {
                            field: field.name().to_string(),
                            reason: format!("{} has no tag", value),
                        })?;
                    empty_element(sink, tag)?;
                }
            }
            FieldKind::ChildValueList { adapter } => {
                for value in self.values(field)? {
                    adapter.pack(value)?.serialize(sink)?;
                }
            }
            FieldKind::ChildValueMap { adapter } => {
                for (key, value) in self.value_map(field)? {
                    adapter.pack(key, value)?.serialize(sink)?;
                }
            }
            FieldKind::ChildValueMultiMap { adapter } => {
                for (key, values) in self.multi_map(field)? {
                    for value in values {
                        adapter.pack(key, value)?.serialize(sink)?;
                    }
                }
            }
            FieldKind::Attr { .. } | FieldKind::Text { .. } | FieldKind::Collector => {}
        }
        Ok(())
    }

    /// Serializes the instance into an event list.
    ///
    /// # Errors
    /// See [`Xso::serialize`].
    pub fn to_events(&self) -> Result<Vec<Event>, SerializeError> {
        let mut events = Vec::new();
        self.serialize(&mut events)?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::XsoTypeBuilder;
    use crate::error::AccessError;
    use crate::types::IntegerType;

    fn start(tag: &str, attrs: &[(&str, &str)]) -> Event {
        Event::start(tag, attrs.iter().copied().collect())
    }

    #[derive(Default)]
    struct Recorder {
        declared: Vec<(Option<String>, String)>,
        events: Vec<Event>,
    }

    impl EventSink for Recorder {
        fn start(&mut self, tag: &Tag, attrs: &Attributes) -> ironxso_core::Result<()> {
            self.events.start(tag, attrs)
        }

        fn text(&mut self, text: &str) -> ironxso_core::Result<()> {
            self.events.text(text)
        }

        fn end(&mut self) -> ironxso_core::Result<()> {
            self.events.end()
        }

        fn declare_prefix(&mut self, prefix: Option<&str>, namespace: &str) -> ironxso_core::Result<()> {
            self.declared
                .push((prefix.map(str::to_string), namespace.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_default_attributes_are_omitted() {
        let a = Field::attr("a", "a").default("x").build();
        let n = Field::attr("n", "n").value_type(IntegerType).build();
        let ty = XsoTypeBuilder::new("T")
            .tag("t")
            .fields([a.clone(), n.clone()])
            .build()
            .unwrap();
        let mut xso = Xso::new(&ty);
        xso.set(&n, 5).unwrap();
        assert_eq!(
            xso.to_events().unwrap(),
            vec![start("t", &[("n", "5")]), Event::End]
        );
        xso.set(&a, "y").unwrap();
        assert_eq!(
            xso.to_events().unwrap(),
            vec![start("t", &[("a", "y"), ("n", "5")]), Event::End]
        );
    }

    #[test]
    fn test_unset_attribute_fails() {
        let ty = XsoTypeBuilder::new("T")
            .tag("t")
            .field(Field::attr("a", "a").build())
            .build()
            .unwrap();
        assert!(matches!(
            Xso::new(&ty).to_events(),
            Err(SerializeError::Access(AccessError::Unset { .. }))
        ));
    }

    #[test]
    fn test_untagged_type_cannot_serialize() {
        let ty = XsoTypeBuilder::new("T").build().unwrap();
        assert!(matches!(
            Xso::new(&ty).to_events(),
            Err(SerializeError::Untagged { .. })
        ));
    }

    #[test]
    fn test_leaf_children_and_order() {
        let flag = Field::child_flag("flag", "flag").build();
        let body = Field::child_text("body", "body").default("").build();
        let cond = Field::child_tag("cond", None, &["a", "b"]).allow_none().build();
        let any = Field::collector("any").build();
        let text = Field::text("text").default("").build();
        let ty = XsoTypeBuilder::new("T")
            .tag("t")
            .fields([any.clone(), flag.clone(), body.clone(), cond.clone(), text.clone()])
            .build()
            .unwrap();

        let mut xso = Xso::new(&ty);
        assert_eq!(
            xso.to_events().unwrap(),
            vec![start("t", &[]), Event::End]
        );

        xso.set(&flag, true).unwrap();
        xso.set(&body, "hi").unwrap();
        xso.set(&cond, Tag::local("b")).unwrap();
        xso.set(&text, "content").unwrap();
        xso.push_collected(&any, vec![start("extra", &[]), Event::End])
            .unwrap();
        assert_eq!(
            xso.to_events().unwrap(),
            vec![
                start("t", &[]),
                Event::text("content"),
                start("flag", &[]),
                Event::End,
                start("body", &[]),
                Event::text("hi"),
                Event::End,
                start("b", &[]),
                Event::End,
                start("extra", &[]),
                Event::End,
                Event::End,
            ]
        );
    }

    #[test]
    fn test_namespace_declarations_are_announced() {
        let ty = XsoTypeBuilder::new("T")
            .tag(("uri:t", "t"))
            .build()
            .unwrap();
        let mut sink = Recorder::default();
        Xso::new(&ty).serialize(&mut sink).unwrap();
        assert_eq!(sink.declared, vec![(None, "uri:t".to_string())]);
        assert_eq!(sink.events.len(), 2);
    }

    #[test]
    fn test_child_value_map_packs_entries() {
        let field = Field::child_text_map("bodies", "body").unwrap().build();
        let ty = XsoTypeBuilder::new("Msg")
            .tag("msg")
            .field(field.clone())
            .build()
            .unwrap();
        let mut xso = Xso::new(&ty);
        xso.value_map_mut(&field)
            .unwrap()
            .insert(Value::None, Value::from("plain"));
        assert_eq!(
            xso.to_events().unwrap(),
            vec![
                start("msg", &[]),
                start("body", &[]),
                Event::text("plain"),
                Event::End,
                Event::End,
            ]
        );
    }
}
