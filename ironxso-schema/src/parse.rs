//! Incremental parsing of elements into instances.
//!
//! [`XsoProcess`] consumes the events of one element. Attributes are settled
//! when the start event arrives; child elements are handed to nested
//! processes wrapped in a [`Guard`], so a failing child never desynchronises
//! the parent; text is accumulated and applied when the element ends.

use crate::error::{AccessError, ParseError};
use crate::field::{Field, FieldKind};
use crate::handler::{Failure, Outcome, Raw};
use crate::schema::{Policies, Policy, XsoType};
use crate::xso::Xso;
use ironxso_core::{
    Attributes, CaptureRelay, Context, DropConsumer, Event, Guard, Process, Step, Tag, Value,
};

/// Offers an error to the type's handler. Returns true if it was suppressed.
fn offer(
    ty: &XsoType,
    ctx: &Context,
    field: Option<&Field>,
    raw: Raw<'_>,
    error: Option<&ParseError>,
) -> bool {
    let Some(handler) = &ty.hooks().error_handler else {
        return false;
    };
    let failure = Failure {
        field,
        raw,
        error,
        context: ctx,
    };
    let suppressed = handler.on_error(&failure) == Outcome::Suppress;
    if suppressed {
        tracing::debug!(
            "suppressed parse error in '{}' on {}",
            ty.name(),
            field.map_or("<element>", Field::name)
        );
    }
    suppressed
}

/// Parses one element into an instance of a type.
///
/// Must be fed the element's start event first; completes on the matching
/// end event. Capturing types additionally record the raw events.
#[derive(Debug)]
pub enum XsoProcess {
    /// Parses without recording.
    Plain(ElementProcess),
    /// Parses and records the raw events.
    Capturing(CaptureRelay<ElementProcess>),
}

impl XsoProcess {
    /// Creates a process for `ty`, parsing under the parent context `ctx`.
    #[must_use]
    pub fn new(ty: &XsoType, ctx: &Context) -> Self {
        let inner = ElementProcess::new(ty, ctx);
        if ty.is_capturing() {
            Self::Capturing(CaptureRelay::new(inner))
        } else {
            Self::Plain(inner)
        }
    }
}

impl Process for XsoProcess {
    type Output = Xso;
    type Error = ParseError;

    fn feed(&mut self, event: Event) -> Result<Step<Xso>, ParseError> {
        match self {
            Self::Plain(inner) => inner.feed(event),
            Self::Capturing(relay) => Ok(relay.feed(event)?.map(|(mut xso, events)| {
                xso.set_captured(events);
                xso
            })),
        }
    }

    fn close(&mut self) {
        match self {
            Self::Plain(inner) => inner.close(),
            Self::Capturing(relay) => relay.close(),
        }
    }
}

/// The parse of one element, without capture.
#[derive(Debug)]
pub struct ElementProcess {
    ty: XsoType,
    ctx: Context,
    builder: Option<Box<XsoBuilder>>,
}

impl ElementProcess {
    /// Creates a process for `ty`, parsing under the parent context `ctx`.
    #[must_use]
    pub fn new(ty: &XsoType, ctx: &Context) -> Self {
        Self {
            ty: ty.clone(),
            ctx: ctx.clone(),
            builder: None,
        }
    }
}

impl Process for ElementProcess {
    type Output = Xso;
    type Error = ParseError;

    fn feed(&mut self, event: Event) -> Result<Step<Xso>, ParseError> {
        let Some(builder) = self.builder.as_mut() else {
            let Event::Start { tag, attrs } = event else {
                return Err(ironxso_core::Error::xml("expected element start").into());
            };
            let builder = XsoBuilder::start(&self.ty, &self.ctx, tag, &attrs)?;
            self.builder = Some(Box::new(builder));
            return Ok(Step::Continue);
        };
        if !builder.feed(event)?.is_done() {
            return Ok(Step::Continue);
        }
        match self.builder.take() {
            Some(builder) => builder.finish().map(Step::Done),
            None => Ok(Step::Continue),
        }
    }

    fn close(&mut self) {
        if let Some(mut builder) = self.builder.take()
            && let Some(active) = builder.active.as_mut()
        {
            active.close();
        }
    }
}

/// The nested parse currently receiving events.
#[derive(Debug)]
enum Active {
    Child {
        field: Field,
        tag: Tag,
        attrs: Attributes,
        guard: Guard<XsoProcess>,
    },
    Leaf {
        field: Field,
        tag: Tag,
        attrs: Attributes,
        guard: Guard<LeafProcess>,
    },
    Collect {
        field: Field,
        relay: CaptureRelay<DropConsumer>,
    },
    Drop(DropConsumer),
}

impl Active {
    fn close(&mut self) {
        match self {
            Self::Child { guard, .. } => guard.close(),
            Self::Leaf { guard, .. } => guard.close(),
            Self::Collect { relay, .. } => relay.close(),
            Self::Drop(consumer) => consumer.close(),
        }
    }
}

/// State of an element between its start and end events.
#[derive(Debug)]
struct XsoBuilder {
    xso: Xso,
    tag: Tag,
    ctx: Context,
    text: String,
    active: Option<Active>,
}

impl XsoBuilder {
    /// Creates the instance and settles all attribute fields.
    fn start(
        ty: &XsoType,
        parent: &Context,
        tag: Tag,
        attrs: &Attributes,
    ) -> Result<Self, ParseError> {
        let mut ctx = parent.enter();
        let mut xso = Xso::new(ty);
        let mut pending = ty.attr_fields();

        for (attr, raw) in attrs.iter() {
            let Some(field) = ty.attr_field(attr) else {
                if ty.policies().unknown_attr == Policy::Fail {
                    return Err(ParseError::UnknownAttribute {
                        tag: attr.clone(),
                        element: tag,
                    });
                }
                continue;
            };
            let Some(scalar) = field.scalar() else {
                continue;
            };
            match scalar.parse_recv(field.name(), raw) {
                Ok(Some(value)) => {
                    pending.retain(|f| *f != field);
                    xso.store(&field, value);
                }
                // erroneous values are handled like absent ones
                Ok(None) => {}
                Err(e) => {
                    pending.retain(|f| *f != field);
                    xso.mark_incomplete(&field);
                    for rest in &pending {
                        xso.mark_incomplete(rest);
                    }
                    if !offer(ty, &ctx, Some(&field), Raw::Attr(Some(raw)), Some(&e)) {
                        return Err(e);
                    }
                }
            }
        }

        for field in pending {
            let Some(scalar) = field.scalar() else {
                continue;
            };
            if let Some(missing) = scalar.missing()
                && let Some(value) = missing(&xso, &ctx)
            {
                match scalar.coerce_code(field.name(), value.clone()) {
                    Ok(value) => xso.store(&field, value),
                    Err(e) => {
                        let e = ParseError::InvalidValue {
                            field: field.name().to_string(),
                            value: value.to_string(),
                            reason: e.to_string(),
                        };
                        xso.mark_incomplete(&field);
                        if !offer(ty, &ctx, Some(&field), Raw::Attr(None), Some(&e)) {
                            return Err(e);
                        }
                    }
                }
                continue;
            }
            if scalar.default().is_some() {
                continue;
            }
            let Some(attr) = field.attr_tag() else {
                continue;
            };
            let e = ParseError::MissingAttribute { tag: attr.clone() };
            if !offer(ty, &ctx, Some(&field), Raw::Attr(None), Some(&e)) {
                return Err(e);
            }
        }

        if let Some(lang) = xso.lang() {
            ctx.lang = Some(lang);
        }
        tracing::trace!("started element {} as '{}'", tag, ty.name());

        Ok(Self {
            xso,
            tag,
            ctx,
            text: String::new(),
            active: None,
        })
    }

    /// Feeds one event of the element's content. Returns `Done` on the
    /// element's own end event.
    fn feed(&mut self, event: Event) -> Result<Step<()>, ParseError> {
        if self.active.is_some() {
            self.feed_active(event)?;
            return Ok(Step::Continue);
        }
        match event {
            Event::Start { tag, attrs } => {
                let active = self.open_child(tag.clone(), attrs.clone())?;
                self.active = Some(active);
                self.feed_active(Event::Start { tag, attrs })?;
                Ok(Step::Continue)
            }
            Event::Text(text) => {
                self.text_event(text)?;
                Ok(Step::Continue)
            }
            Event::End => Ok(Step::Done(())),
        }
    }

    /// Chooses how a child element is consumed.
    fn open_child(&self, tag: Tag, attrs: Attributes) -> Result<Active, ParseError> {
        let ty = self.xso.xso_type();
        if let Some(field) = ty.child_field(&tag) {
            let leaf = matches!(
                field.kind(),
                FieldKind::ChildFlag { .. } | FieldKind::ChildText { .. } | FieldKind::ChildTag { .. }
            );
            return Ok(if leaf {
                Active::Leaf {
                    guard: Guard::new(LeafProcess::new(&field)),
                    field,
                    tag,
                    attrs,
                }
            } else {
                match field.element_type_for(&tag) {
                    Some(child_ty) => Active::Child {
                        guard: Guard::new(XsoProcess::new(&child_ty, &self.ctx)),
                        field,
                        tag,
                        attrs,
                    },
                    None => Active::Drop(DropConsumer::new()),
                }
            });
        }
        if let Some(field) = ty.collector_field() {
            return Ok(Active::Collect {
                field,
                relay: CaptureRelay::new(DropConsumer::new()),
            });
        }
        if ty.policies().unknown_child == Policy::Fail
            && !offer(
                ty,
                &self.ctx,
                None,
                Raw::Start {
                    tag: &tag,
                    attrs: &attrs,
                },
                None,
            )
        {
            return Err(ParseError::UnknownChild {
                tag,
                element: self.tag.clone(),
            });
        }
        tracing::trace!("dropping child {} of {}", tag, self.tag);
        Ok(Active::Drop(DropConsumer::new()))
    }

    fn text_event(&mut self, text: String) -> Result<(), ParseError> {
        let ty = self.xso.xso_type();
        if ty.text_field().is_some() {
            self.text.push_str(&text);
            return Ok(());
        }
        if text.trim().is_empty() || ty.policies().unknown_text == Policy::Drop {
            return Ok(());
        }
        if offer(ty, &self.ctx, None, Raw::Text(&text), None) {
            return Ok(());
        }
        Err(ParseError::UnexpectedText {
            element: self.tag.clone(),
        })
    }

    /// Feeds the active nested parse and settles its outcome.
    fn feed_active(&mut self, event: Event) -> Result<(), ParseError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        match active {
            Active::Drop(consumer) => {
                if consumer.feed(event)?.is_done() {
                    self.active = None;
                }
            }
            Active::Collect { field, relay } => {
                if let Step::Done(((), events)) = relay.feed(event)? {
                    let field = field.clone();
                    self.active = None;
                    self.xso
                        .push_collected(&field, events)
                        .map_err(|e| self.access_error(e))?;
                }
            }
            Active::Child { guard, .. } => {
                let outcome = guard.feed(event);
                if !matches!(outcome, Ok(Step::Continue)) {
                    self.settle_child(outcome.map(|step| match step {
                        Step::Done(xso) => Some(xso),
                        Step::Continue => None,
                    }))?;
                }
            }
            Active::Leaf { guard, .. } => {
                let outcome = guard.feed(event);
                if !matches!(outcome, Ok(Step::Continue)) {
                    self.settle_leaf(outcome.map(|step| match step {
                        Step::Done(value) => value,
                        Step::Continue => None,
                    }))?;
                }
            }
        }
        Ok(())
    }

    fn settle_child(&mut self, outcome: Result<Option<Xso>, ParseError>) -> Result<(), ParseError> {
        let Some(Active::Child {
            field, tag, attrs, ..
        }) = self.active.take()
        else {
            return Ok(());
        };
        let error = match outcome {
            Ok(Some(child)) => match self.store_child(&field, child) {
                Ok(()) => return Ok(()),
                Err(e) => self.access_error(e),
            },
            Ok(None) => return Ok(()),
            Err(e) => e,
        };
        let raw = Raw::Start {
            tag: &tag,
            attrs: &attrs,
        };
        if offer(self.xso.xso_type(), &self.ctx, Some(&field), raw, Some(&error)) {
            return Ok(());
        }
        Err(error)
    }

    fn settle_leaf(
        &mut self,
        outcome: Result<Option<Value>, ParseError>,
    ) -> Result<(), ParseError> {
        let Some(Active::Leaf {
            field, tag, attrs, ..
        }) = self.active.take()
        else {
            return Ok(());
        };
        match outcome {
            Ok(Some(value)) => {
                self.xso.store(&field, value);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                let raw = Raw::Start {
                    tag: &tag,
                    attrs: &attrs,
                };
                if offer(self.xso.xso_type(), &self.ctx, Some(&field), raw, Some(&e)) {
                    self.xso.mark_incomplete(&field);
                    Ok(())
                } else {
                    Err(e)
                }
            }
        }
    }

    fn store_child(&mut self, field: &Field, child: Xso) -> Result<(), AccessError> {
        match field.kind() {
            FieldKind::Child { .. } => self.xso.set_child(field, Some(child))?,
            FieldKind::ChildList { .. } => self.xso.children_mut(field)?.push(child),
            FieldKind::ChildMap { key, .. } => {
                let key = key.key_of(&child);
                self.xso
                    .child_map_mut(field)?
                    .entry(key)
                    .or_default()
                    .push(child);
            }
            FieldKind::ChildValueList { adapter } => {
                let value = adapter.unpack(&child)?;
                self.xso.values_mut(field)?.push(value);
            }
            FieldKind::ChildValueMap { adapter } => {
                let (key, value) = adapter.unpack(&child)?;
                self.xso.value_map_mut(field)?.insert(key, value);
            }
            FieldKind::ChildValueMultiMap { adapter } => {
                let (key, value) = adapter.unpack(&child)?;
                self.xso
                    .multi_map_mut(field)?
                    .entry(key)
                    .or_default()
                    .push(value);
            }
            _ => {}
        }
        Ok(())
    }

    fn access_error(&self, e: AccessError) -> ParseError {
        match e {
            AccessError::MissingMember { field } => ParseError::MissingMember { field },
            AccessError::Invalid { type_name, reason } => ParseError::Invalid { type_name, reason },
            other => ParseError::Invalid {
                type_name: self.xso.xso_type().name().to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Applies the text, validates and runs the post-construction hook.
    fn finish(mut self) -> Result<Xso, ParseError> {
        let ty = self.xso.xso_type().clone();

        if let Some(field) = ty.text_field()
            && let Some(scalar) = field.scalar()
        {
            match scalar.parse_recv(field.name(), &self.text) {
                Ok(Some(value)) => self.xso.store(&field, value),
                Ok(None) => {}
                // empty content the value type cannot read keeps the default
                Err(_) if self.text.is_empty() && scalar.default().is_some() => {}
                Err(e) => {
                    if !offer(&ty, &self.ctx, Some(&field), Raw::Text(&self.text), Some(&e)) {
                        return Err(e);
                    }
                    self.xso.mark_incomplete(&field);
                }
            }
        }

        if let Err(e) = self.xso.validate_fields(false) {
            let e = self.access_error(e);
            if !offer(&ty, &self.ctx, None, Raw::None, Some(&e)) {
                return Err(e);
            }
        }

        if let Some(hook) = ty.hooks().after_load.clone()
            && let Err(e) = hook(&mut self.xso, &self.ctx)
        {
            let e = ParseError::Hook {
                type_name: ty.name().to_string(),
                reason: e.message,
            };
            if !offer(&ty, &self.ctx, None, Raw::None, Some(&e)) {
                return Err(e);
            }
        }

        tracing::trace!("finished element {} as '{}'", self.tag, ty.name());
        Ok(self.xso)
    }
}

/// Parses the single child element of a flag, child-text or
/// tag-enumeration field.
///
/// Completes with the value to store, or `None` if an erroneous child text
/// is treated as absent.
#[derive(Debug)]
struct LeafProcess {
    field: Field,
    tag: Option<Tag>,
    text: String,
    nested: Option<DropConsumer>,
}

impl LeafProcess {
    fn new(field: &Field) -> Self {
        Self {
            field: field.clone(),
            tag: None,
            text: String::new(),
            nested: None,
        }
    }

    fn element(&self) -> Tag {
        self.tag.clone().unwrap_or_else(|| Tag::local(""))
    }

    fn policies(&self) -> Policies {
        match self.field.kind() {
            FieldKind::ChildFlag { leaf, .. }
            | FieldKind::ChildText { leaf, .. }
            | FieldKind::ChildTag { leaf, .. } => *leaf,
            _ => Policies::strict(),
        }
    }

    fn value(&self) -> Result<Option<Value>, ParseError> {
        match self.field.kind() {
            FieldKind::ChildFlag { .. } => Ok(Some(Value::Bool(true))),
            FieldKind::ChildTag { choices, .. } => {
                Ok(self.tag.as_ref().and_then(|t| choices.value_for(t)).cloned())
            }
            FieldKind::ChildText { scalar, .. } => scalar.parse_recv(self.field.name(), &self.text),
            _ => Ok(None),
        }
    }
}

impl Process for LeafProcess {
    type Output = Option<Value>;
    type Error = ParseError;

    fn feed(&mut self, event: Event) -> Result<Step<Self::Output>, ParseError> {
        if let Some(nested) = self.nested.as_mut() {
            if nested.feed(event)?.is_done() {
                self.nested = None;
            }
            return Ok(Step::Continue);
        }
        let policies = self.policies();
        match event {
            Event::Start { tag, attrs } if self.tag.is_none() => {
                if policies.unknown_attr == Policy::Fail
                    && let Some((attr, _)) = attrs.iter().next()
                {
                    return Err(ParseError::UnknownAttribute {
                        tag: attr.clone(),
                        element: tag,
                    });
                }
                self.tag = Some(tag);
                Ok(Step::Continue)
            }
            Event::Start { tag, attrs } => {
                if policies.unknown_child == Policy::Fail {
                    return Err(ParseError::UnknownChild {
                        tag,
                        element: self.element(),
                    });
                }
                let mut nested = DropConsumer::new();
                nested.feed(Event::Start { tag, attrs })?;
                self.nested = Some(nested);
                Ok(Step::Continue)
            }
            Event::Text(text) => {
                if matches!(self.field.kind(), FieldKind::ChildText { .. }) {
                    self.text.push_str(&text);
                } else if !text.trim().is_empty() && policies.unknown_text == Policy::Fail {
                    return Err(ParseError::UnexpectedText {
                        element: self.element(),
                    });
                }
                Ok(Step::Continue)
            }
            Event::End => self.value().map(Step::Done),
        }
    }
}
