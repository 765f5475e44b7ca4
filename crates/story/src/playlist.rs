use gpui::*;
use gpui_component::button::{Button, ButtonVariants as _};
use gpui_component::{ActiveTheme as _, Sizable as _, h_flex, v_flex};
use playlist_action_core::{
    ActionEditorConfig, ActionRecord, EditorId, NodeType, RegisteredAction,
};
use playlist_action_editor::{ActionEditorEvent, ActionEditorView};
use serde_json::json;
use tracing::{info, warn};

struct EditorPane {
    title: &'static str,
    view: Entity<ActionEditorView>,
}

/// One playlist editor and two item editors. Actions can be dragged between
/// the item editors; the story hands each drop to its target editor.
pub struct PlaylistActionsStory {
    panes: Vec<EditorPane>,
    errors: Vec<String>,
    last_event: Option<String>,
    _subscriptions: Vec<Subscription>,
}

impl PlaylistActionsStory {
    pub fn view(window: &mut Window, cx: &mut App) -> Entity<Self> {
        let mut panes = Vec::new();
        let mut errors = Vec::new();
        for (title, config) in demo_configs() {
            match config.and_then(|config| Ok(ActionEditorView::view(config, window, cx)?)) {
                Ok(view) => panes.push(EditorPane { title, view }),
                Err(err) => {
                    warn!(title, "failed to create action editor: {err:#}");
                    errors.push(format!("{title}: {err:#}"));
                }
            }
        }

        cx.new(|cx| {
            let mut subscriptions = Vec::new();
            for pane in &panes {
                subscriptions.push(cx.subscribe(&pane.view, Self::on_editor_event));
                subscriptions.push(cx.observe(&pane.view, |_, _, cx| cx.notify()));
            }
            Self {
                panes,
                errors,
                last_event: None,
                _subscriptions: subscriptions,
            }
        })
    }

    fn find_editor(&self, id: &EditorId, cx: &App) -> Option<Entity<ActionEditorView>> {
        self.panes
            .iter()
            .find(|pane| pane.view.read(cx).editor_id() == id)
            .map(|pane| pane.view.clone())
    }

    fn on_editor_event(
        &mut self,
        editor: Entity<ActionEditorView>,
        event: &ActionEditorEvent,
        cx: &mut Context<Self>,
    ) {
        let editor_id = editor.read(cx).editor_id().clone();
        info!(editor = %editor_id, ?event, "action editor event");
        self.last_event = Some(format!("{editor_id}: {event:?}"));

        if let ActionEditorEvent::Dropped {
            item,
            target,
            index,
        } = event
        {
            let Some(target_view) = self.find_editor(target, cx) else {
                warn!(target = %target, "drop routed to unknown editor");
                return;
            };
            let accepted =
                target_view.update(cx, |this, cx| this.accept_transfer(item, *index, cx));
            if !accepted {
                warn!(target = %target, id = %item.record.id, "transfer refused");
            }
        }
        cx.notify();
    }

    fn render_pane(&self, ix: usize, pane: &EditorPane, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let view = pane.view.clone();
        let suggestion = pane
            .view
            .read(cx)
            .editor()
            .registered_actions()
            .first()
            .map(|action| action.word.clone());

        v_flex()
            .gap_y_1()
            .child(
                h_flex()
                    .justify_between()
                    .items_center()
                    .child(
                        div()
                            .text_sm()
                            .font_weight(FontWeight::MEDIUM)
                            .child(pane.title),
                    )
                    .children(suggestion.map(|word| {
                        Button::new(("add-action", ix))
                            .ghost()
                            .xsmall()
                            .label(format!("Add {word}"))
                            .on_click(move |_, _window, cx| {
                                view.update(cx, |this, cx| {
                                    this.add_action(&word, "incoming", cx);
                                });
                            })
                    })),
            )
            .child(
                div()
                    .rounded(px(8.))
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.background)
                    .child(pane.view.clone()),
            )
            .into_any_element()
    }

    fn dump(&self, cx: &App) -> String {
        self.panes
            .iter()
            .map(|pane| {
                let view = pane.view.read(cx);
                let json = view
                    .action_list()
                    .to_json_pretty()
                    .unwrap_or_else(|err| format!("<{err}>"));
                format!("// {}\n{json}", view.editor_id())
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Render for PlaylistActionsStory {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let dump = self.dump(cx);
        let panes = self
            .panes
            .iter()
            .enumerate()
            .map(|(ix, pane)| self.render_pane(ix, pane, cx))
            .collect::<Vec<_>>();

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(
                        div()
                            .text_xl()
                            .font_weight(FontWeight::BOLD)
                            .child("Playlist Actions"),
                    )
                    .child(div().text_sm().text_color(theme.muted_foreground).child(
                        "Type a registered word, then Space or Enter turns it into an action. \
                         Drag actions between the two item editors.",
                    ))
                    .children(self.last_event.clone().map(|event| {
                        div()
                            .text_xs()
                            .text_color(theme.muted_foreground)
                            .child(event)
                    }))
                    .children(self.errors.iter().map(|err| {
                        div().text_sm().text_color(theme.red).child(err.clone())
                    })),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .items_start()
                    .child(v_flex().w(px(520.)).gap_y_3().children(panes))
                    .child(
                        div()
                            .id("action-dump")
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .overflow_y_scroll()
                            .rounded(px(12.))
                            .border_1()
                            .border_color(theme.border)
                            .bg(theme.background)
                            .p(px(12.))
                            .font_family("monospace")
                            .text_xs()
                            .child(dump),
                    ),
            )
    }
}

fn demo_configs() -> Vec<(&'static str, anyhow::Result<ActionEditorConfig>)> {
    let item_actions = vec![
        RegisteredAction::new("Play", "start the item"),
        RegisteredAction::new("Pause", "hold the current frame"),
        RegisteredAction::new("Seek", "jump to a position"),
        RegisteredAction::new("Mute", ""),
    ];

    let playlist = ActionEditorConfig::new("playlist", NodeType::PlaylistActionNode)
        .registered_actions(vec![
            RegisteredAction::new("Start", "begin the playlist"),
            RegisteredAction::new("Stop", "end the playlist"),
            RegisteredAction::new("Shuffle", "randomize order"),
        ])
        .initial_actions(vec![
            ActionRecord::new("Start", "incoming", NodeType::PlaylistActionNode)
                .with_id("playlist-start"),
        ]);

    let intro = ActionEditorConfig::new("item-intro", NodeType::ItemActionNode)
        .registered_actions(item_actions.clone())
        .initial_actions(vec![
            ActionRecord::new("Play", "incoming", NodeType::ItemActionNode)
                .with_id("intro-play"),
            ActionRecord::new("Seek", "scheduled", NodeType::ItemActionNode)
                .with_id("intro-seek")
                .with_action_id("seek")
                .with_equation(">12.5"),
        ]);

    // Hosts may hand over the same shape as JSON.
    let outro = serde_json::from_value::<ActionEditorConfig>(json!({
        "editorId": "item-outro",
        "nodeType": "ItemActionNode",
        "initialActions": [{
            "id": "outro-mute",
            "word": "Mute",
            "qualifier": "outgoing",
            "actionNodeType": "ItemActionNode",
            "actionId": "mute"
        }]
    }))
    .map(|config| config.registered_actions(item_actions))
    .map_err(anyhow::Error::from);

    vec![
        ("Playlist", Ok(playlist)),
        ("Intro item", Ok(intro)),
        ("Outro item", outro),
    ]
}
