//! The platform's standard block set.
//!
//! [`standard_registry`] covers every block the event pages ship with:
//! layout containers, the two-column layout, plain content blocks, and the
//! data-bound event blocks that read from the [`EventContext`]. The legacy
//! dialect's block kinds upgrade onto these type names, so any page the
//! platform has ever saved renders through this one set.

use std::sync::Arc;

use folio_core::{
    BlockContext, BlockRender, CapabilityDescriptor, ContainerRules, ContextField, PropBinding,
    RegionSlotRules, RenderElement, RenderNode, SettingKind, SettingsField, TwoRegionRules,
    TypeRegistry,
};

/// Type name of the two-region layout container.
pub const COLUMNS_TYPE: &str = "Columns";

/// Type name of a reserved column slot.
pub const COLUMN_TYPE: &str = "Column";

fn width_style(ctx: &BlockContext<'_>) -> Option<String> {
    ctx.text_prop("width").map(|w| format!("width: {w}"))
}

/// Generic layout container.
struct ContainerBlock;

impl BlockRender for ContainerBlock {
    fn render(&self, ctx: &BlockContext<'_>, children: Vec<RenderNode>) -> RenderNode {
        let mut element = RenderElement::new("div", ctx.node_id).with_class("page-container");
        if let Some(style) = width_style(ctx) {
            element = element.with_attribute("style", style);
        }
        RenderNode::Element(element.with_children(children))
    }
}

/// Two-region layout container; its children are the two column slots.
struct ColumnsBlock;

impl BlockRender for ColumnsBlock {
    fn render(&self, ctx: &BlockContext<'_>, children: Vec<RenderNode>) -> RenderNode {
        RenderNode::Element(
            RenderElement::new("div", ctx.node_id)
                .with_class("page-columns")
                .with_children(children),
        )
    }
}

/// One reserved column slot.
struct ColumnBlock;

impl BlockRender for ColumnBlock {
    fn render(&self, ctx: &BlockContext<'_>, children: Vec<RenderNode>) -> RenderNode {
        let mut element = RenderElement::new("div", ctx.node_id).with_class("page-column");
        if let Some(style) = width_style(ctx) {
            element = element.with_attribute("style", style);
        }
        RenderNode::Element(element.with_children(children))
    }
}

/// Heading text with a configurable level.
struct HeadingBlock;

impl BlockRender for HeadingBlock {
    fn render(&self, ctx: &BlockContext<'_>, _children: Vec<RenderNode>) -> RenderNode {
        let level = ctx.int_prop("level").unwrap_or(2).clamp(1, 6);
        let tag = format!("h{level}");
        let text = ctx.text_prop("text").unwrap_or_default();
        RenderNode::Element(RenderElement::new(tag, ctx.node_id).with_child(RenderNode::text(text)))
    }
}

/// Body text.
struct ParagraphBlock;

impl BlockRender for ParagraphBlock {
    fn render(&self, ctx: &BlockContext<'_>, _children: Vec<RenderNode>) -> RenderNode {
        let text = ctx.text_prop("text").unwrap_or_default();
        RenderNode::Element(RenderElement::new("p", ctx.node_id).with_child(RenderNode::text(text)))
    }
}

/// Call-to-action link.
struct ButtonBlock;

impl BlockRender for ButtonBlock {
    fn render(&self, ctx: &BlockContext<'_>, _children: Vec<RenderNode>) -> RenderNode {
        let label = ctx.text_prop("label").unwrap_or("Register");
        let mut element = RenderElement::new("a", ctx.node_id).with_class("page-button");
        if let Some(href) = ctx.text_prop("href") {
            element = element.with_attribute("href", href);
        }
        RenderNode::Element(element.with_child(RenderNode::text(label)))
    }
}

/// Static image. Renders nothing without a source, never a broken image.
struct ImageBlock;

impl BlockRender for ImageBlock {
    fn render(&self, ctx: &BlockContext<'_>, _children: Vec<RenderNode>) -> RenderNode {
        let Some(src) = ctx.text_prop("src") else {
            return RenderNode::empty();
        };
        let mut element = RenderElement::new("img", ctx.node_id).with_attribute("src", src);
        if let Some(alt) = ctx.text_prop("alt") {
            element = element.with_attribute("alt", alt);
        }
        RenderNode::Element(element)
    }
}

/// Hero banner: title over subtitle, bound to the event summary.
struct HeroBlock;

impl BlockRender for HeroBlock {
    fn render(&self, ctx: &BlockContext<'_>, _children: Vec<RenderNode>) -> RenderNode {
        let title = ctx.text_prop("title").unwrap_or_default();
        let mut element = RenderElement::new("section", ctx.node_id)
            .with_class("page-hero")
            .with_child(RenderNode::Element(
                RenderElement::new("h1", "").with_child(RenderNode::text(title)),
            ));
        if let Some(subtitle) = ctx.text_prop("subtitle") {
            element = element.with_child(RenderNode::Element(
                RenderElement::new("p", "").with_child(RenderNode::text(subtitle)),
            ));
        }
        RenderNode::Element(element)
    }
}

/// The event name as a heading.
struct EventTitleBlock;

impl BlockRender for EventTitleBlock {
    fn render(&self, ctx: &BlockContext<'_>, _children: Vec<RenderNode>) -> RenderNode {
        let text = ctx.text_prop("text").unwrap_or_default();
        RenderNode::Element(
            RenderElement::new("h1", ctx.node_id)
                .with_class("event-title")
                .with_child(RenderNode::text(text)),
        )
    }
}

/// The event description as body text.
struct EventDescriptionBlock;

impl BlockRender for EventDescriptionBlock {
    fn render(&self, ctx: &BlockContext<'_>, _children: Vec<RenderNode>) -> RenderNode {
        let text = ctx.text_prop("text").unwrap_or_default();
        RenderNode::Element(
            RenderElement::new("p", ctx.node_id)
                .with_class("event-description")
                .with_child(RenderNode::text(text)),
        )
    }
}

/// The event logo. The omit-when-absent binding means this render only runs
/// when a source exists.
struct EventLogoBlock;

impl BlockRender for EventLogoBlock {
    fn render(&self, ctx: &BlockContext<'_>, _children: Vec<RenderNode>) -> RenderNode {
        let Some(src) = ctx.text_prop("src") else {
            return RenderNode::empty();
        };
        RenderNode::Element(
            RenderElement::new("img", ctx.node_id)
                .with_class("event-logo")
                .with_attribute("src", src)
                .with_attribute("alt", "Event logo"),
        )
    }
}

/// The agenda: one entry per session record in the context.
struct AgendaBlock;

impl BlockRender for AgendaBlock {
    fn render(&self, ctx: &BlockContext<'_>, _children: Vec<RenderNode>) -> RenderNode {
        let mut element = RenderElement::new("section", ctx.node_id).with_class("page-agenda");
        if ctx.event.sessions.is_empty() {
            return RenderNode::Element(
                element.with_child(RenderNode::text("No sessions scheduled yet.")),
            );
        }
        for session in &ctx.event.sessions {
            let mut entry = RenderElement::new("div", "")
                .with_class("agenda-session")
                .with_child(RenderNode::Element(
                    RenderElement::new("h3", "").with_child(RenderNode::text(&session.title)),
                ));
            let when = [&session.date, &session.start_time, &session.end_time]
                .into_iter()
                .filter(|part| !part.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(" ");
            if !when.is_empty() {
                entry = entry.with_child(RenderNode::Element(
                    RenderElement::new("p", "")
                        .with_class("agenda-when")
                        .with_child(RenderNode::text(when)),
                ));
            }
            if !session.speaker.is_empty() {
                entry = entry.with_child(RenderNode::Element(
                    RenderElement::new("p", "")
                        .with_class("agenda-speaker")
                        .with_child(RenderNode::text(&session.speaker)),
                ));
            }
            if !session.description.is_empty() {
                entry = entry.with_child(RenderNode::Element(
                    RenderElement::new("p", "").with_child(RenderNode::text(&session.description)),
                ));
            }
            element = element.with_child(RenderNode::Element(entry));
        }
        RenderNode::Element(element)
    }
}

/// The speaker wall: one card per speaker record in the context.
struct SpeakersBlock;

impl BlockRender for SpeakersBlock {
    fn render(&self, ctx: &BlockContext<'_>, _children: Vec<RenderNode>) -> RenderNode {
        let mut element = RenderElement::new("section", ctx.node_id).with_class("page-speakers");
        if ctx.event.speakers.is_empty() {
            return RenderNode::Element(
                element.with_child(RenderNode::text("Speakers to be announced.")),
            );
        }
        for speaker in &ctx.event.speakers {
            let mut card = RenderElement::new("div", "").with_class("speaker-card");
            if let Some(photo) = speaker.photo_url.as_deref().filter(|p| !p.is_empty()) {
                card = card.with_child(RenderNode::Element(
                    RenderElement::new("img", "")
                        .with_attribute("src", photo)
                        .with_attribute("alt", &speaker.name),
                ));
            }
            card = card.with_child(RenderNode::Element(
                RenderElement::new("h3", "").with_child(RenderNode::text(&speaker.name)),
            ));
            let role = match (speaker.title.is_empty(), speaker.company.is_empty()) {
                (false, false) => format!("{}, {}", speaker.title, speaker.company),
                (false, true) => speaker.title.clone(),
                (true, false) => speaker.company.clone(),
                (true, true) => String::new(),
            };
            if !role.is_empty() {
                card = card.with_child(RenderNode::Element(
                    RenderElement::new("p", "")
                        .with_class("speaker-role")
                        .with_child(RenderNode::text(role)),
                ));
            }
            if !speaker.bio.is_empty() {
                card = card.with_child(RenderNode::Element(
                    RenderElement::new("p", "").with_child(RenderNode::text(&speaker.bio)),
                ));
            }
            element = element.with_child(RenderNode::Element(card));
        }
        RenderNode::Element(element)
    }
}

/// Build the registry covering the platform's standard block set.
#[must_use]
pub fn standard_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();

    registry.register(
        "Container",
        CapabilityDescriptor::canvas(Arc::new(ContainerBlock), Arc::new(ContainerRules))
            .with_default_prop("width", "100%")
            .with_setting(SettingsField::new("width", "Width", SettingKind::Text)),
    );
    registry.register(
        COLUMNS_TYPE,
        CapabilityDescriptor::canvas(Arc::new(ColumnsBlock), Arc::new(TwoRegionRules))
            .with_reserved_slots(COLUMN_TYPE),
    );
    registry.register(
        COLUMN_TYPE,
        CapabilityDescriptor::canvas(Arc::new(ColumnBlock), Arc::new(RegionSlotRules))
            .with_default_prop("width", "50%")
            .with_setting(SettingsField::new("width", "Width", SettingKind::Text)),
    );

    registry.register(
        "Heading",
        CapabilityDescriptor::leaf(Arc::new(HeadingBlock))
            .with_default_prop("text", "")
            .with_default_prop("level", 2)
            .with_setting(SettingsField::new("text", "Text", SettingKind::Text))
            .with_setting(SettingsField::new("level", "Level", SettingKind::Number)),
    );
    registry.register(
        "Paragraph",
        CapabilityDescriptor::leaf(Arc::new(ParagraphBlock))
            .with_default_prop("text", "")
            .with_setting(SettingsField::new("text", "Text", SettingKind::Text)),
    );
    registry.register(
        "Button",
        CapabilityDescriptor::leaf(Arc::new(ButtonBlock))
            .with_default_prop("label", "Register")
            .with_setting(SettingsField::new("label", "Label", SettingKind::Text))
            .with_setting(SettingsField::new("href", "Link", SettingKind::Text)),
    );
    registry.register(
        "Image",
        CapabilityDescriptor::leaf(Arc::new(ImageBlock))
            .with_setting(SettingsField::new("src", "Source", SettingKind::Text))
            .with_setting(SettingsField::new("alt", "Alt text", SettingKind::Text)),
    );

    registry.register(
        "Hero",
        CapabilityDescriptor::leaf(Arc::new(HeroBlock))
            .with_binding(PropBinding::new("title", ContextField::EventName).with_fallback("Welcome"))
            .with_binding(PropBinding::new("subtitle", ContextField::EventDescription))
            .with_setting(SettingsField::new("title", "Title", SettingKind::Text))
            .with_setting(SettingsField::new("subtitle", "Subtitle", SettingKind::Text)),
    );
    registry.register(
        "EventTitle",
        CapabilityDescriptor::leaf(Arc::new(EventTitleBlock)).with_binding(
            PropBinding::new("text", ContextField::EventName).with_fallback("Untitled event"),
        ),
    );
    registry.register(
        "EventDescription",
        CapabilityDescriptor::leaf(Arc::new(EventDescriptionBlock)).with_binding(
            PropBinding::new("text", ContextField::EventDescription).omit_when_absent(),
        ),
    );
    registry.register(
        "EventLogo",
        CapabilityDescriptor::leaf(Arc::new(EventLogoBlock)).with_binding(
            PropBinding::new("src", ContextField::EventLogoUrl).omit_when_absent(),
        ),
    );

    registry.register("Agenda", CapabilityDescriptor::leaf(Arc::new(AgendaBlock)));
    registry.register(
        "Speakers",
        CapabilityDescriptor::leaf(Arc::new(SpeakersBlock)),
    );

    registry
}

#[cfg(test)]
mod tests {
    use folio_core::{
        Document, EventContext, EventSummary, Node, NodeId, SessionRecord, SpeakerRecord,
    };

    use super::*;
    use crate::html::render_to_string;
    use crate::tree::RenderSession;

    fn render_block(node: Node, context: &EventContext) -> String {
        let mut doc = Document::new(Node::canvas(NodeId::new("root"), "Container"));
        doc.add_child(&NodeId::new("root"), node).expect("should attach");
        let registry = standard_registry();
        let session = RenderSession::new(&registry, context);
        render_to_string(&session.render(Some(&doc)))
    }

    #[test]
    fn test_heading_levels_clamp() {
        let context = EventContext::default();
        let html = render_block(
            Node::new(NodeId::new("h"), "Heading")
                .with_prop("text", "Big")
                .with_prop("level", 9),
            &context,
        );
        assert!(html.contains("<h6"));
        assert!(html.contains("Big"));
    }

    #[test]
    fn test_button_defaults_and_href() {
        let context = EventContext::default();
        let html = render_block(
            Node::new(NodeId::new("b"), "Button").with_prop("href", "/tickets"),
            &context,
        );
        assert!(html.contains("href=\"/tickets\""));
        assert!(html.contains("Register"));
    }

    #[test]
    fn test_image_without_src_renders_nothing() {
        let context = EventContext::default();
        let html = render_block(Node::new(NodeId::new("i"), "Image"), &context);
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_hero_prefers_own_props_over_context() {
        let context = EventContext {
            event: EventSummary {
                name: "RustConf".to_string(),
                ..EventSummary::default()
            },
            ..EventContext::default()
        };
        let html = render_block(
            Node::new(NodeId::new("hero"), "Hero").with_prop("title", "Custom welcome"),
            &context,
        );
        assert!(html.contains("Custom welcome"));
        assert!(!html.contains("RustConf"));
    }

    #[test]
    fn test_hero_falls_back_to_event_then_literal() {
        let context = EventContext {
            event: EventSummary {
                name: "RustConf".to_string(),
                ..EventSummary::default()
            },
            ..EventContext::default()
        };
        let html = render_block(Node::new(NodeId::new("hero"), "Hero"), &context);
        assert!(html.contains("RustConf"));

        let html = render_block(Node::new(NodeId::new("hero"), "Hero"), &EventContext::default());
        assert!(html.contains("Welcome"));
    }

    #[test]
    fn test_event_logo_omitted_without_url() {
        let html = render_block(
            Node::new(NodeId::new("logo"), "EventLogo"),
            &EventContext::default(),
        );
        assert!(!html.contains("<img"));

        let context = EventContext {
            event: EventSummary {
                logo_url: Some("https://example.com/logo.png".to_string()),
                ..EventSummary::default()
            },
            ..EventContext::default()
        };
        let html = render_block(Node::new(NodeId::new("logo"), "EventLogo"), &context);
        assert!(html.contains("https://example.com/logo.png"));
    }

    #[test]
    fn test_agenda_lists_sessions_from_context() {
        let context = EventContext {
            sessions: vec![
                SessionRecord {
                    title: "Opening keynote".to_string(),
                    date: "2026-09-01".to_string(),
                    start_time: "09:00".to_string(),
                    end_time: "10:00".to_string(),
                    speaker: "Ada".to_string(),
                    description: String::new(),
                },
                SessionRecord {
                    title: "Workshops".to_string(),
                    ..SessionRecord::default()
                },
            ],
            ..EventContext::default()
        };
        let html = render_block(Node::new(NodeId::new("a"), "Agenda"), &context);
        assert!(html.contains("Opening keynote"));
        assert!(html.contains("Workshops"));
        assert!(html.contains("Ada"));
    }

    #[test]
    fn test_agenda_empty_state() {
        let html = render_block(Node::new(NodeId::new("a"), "Agenda"), &EventContext::default());
        assert!(html.contains("No sessions scheduled yet."));
    }

    #[test]
    fn test_speakers_cards() {
        let context = EventContext {
            speakers: vec![SpeakerRecord {
                name: "Grace".to_string(),
                title: "CTO".to_string(),
                company: "Navy".to_string(),
                bio: "Compiler pioneer".to_string(),
                photo_url: Some("grace.jpg".to_string()),
            }],
            ..EventContext::default()
        };
        let html = render_block(Node::new(NodeId::new("s"), "Speakers"), &context);
        assert!(html.contains("Grace"));
        assert!(html.contains("CTO, Navy"));
        assert!(html.contains("grace.jpg"));
    }

    #[test]
    fn test_container_width_reaches_style() {
        let context = EventContext::default();
        let mut doc = Document::new(
            Node::canvas(NodeId::new("root"), "Container"),
        );
        doc.get_mut(&NodeId::new("root"))
            .expect("root exists")
            .props
            .insert("width".to_string(), "50%".into());
        let registry = standard_registry();
        let session = RenderSession::new(&registry, &context);
        let html = render_to_string(&session.render(Some(&doc)));
        assert!(html.contains("width: 50%"));
    }
}
