use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::button::{Button, ButtonVariants as _};
use gpui_component::input::{Input, InputState};
use gpui_component::menu::{ContextMenuExt as _, PopupMenu, PopupMenuItem};
use gpui_component::tooltip::Tooltip;
use gpui_component::{ActiveTheme as _, Icon, IconName, Sizable as _, h_flex};
use playlist_action_core::{ActionNodeView, DragItem};

use crate::view::ActionEditorView;

/// Drag payload carried between editors. Holds the view it came from so
/// the drop target can end the drag there too.
#[derive(Clone)]
pub struct ActionDrag {
    pub item: DragItem,
    pub(crate) origin: WeakEntity<ActionEditorView>,
}

impl ActionDrag {
    pub(crate) fn new(item: DragItem, origin: WeakEntity<ActionEditorView>) -> Self {
        Self { item, origin }
    }
}

impl std::fmt::Debug for ActionDrag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDrag")
            .field("item", &self.item)
            .finish_non_exhaustive()
    }
}

struct DragGhost {
    label: SharedString,
}

impl DragGhost {
    fn new(label: SharedString) -> Self {
        Self { label }
    }
}

impl Render for DragGhost {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        div()
            .px(px(10.))
            .py(px(4.))
            .rounded(px(6.))
            .bg(theme.popover)
            .border_1()
            .border_color(theme.border)
            .shadow_md()
            .text_color(theme.popover_foreground)
            .text_sm()
            .child(self.label.clone())
    }
}

/// Inline widget for one action record.
#[derive(IntoElement)]
pub(crate) struct ActionChip {
    view: ActionNodeView,
    editor: Entity<ActionEditorView>,
    store_index: Option<usize>,
    inline_query: Option<String>,
    equation: Option<Entity<InputState>>,
    drag: Option<ActionDrag>,
    selected: bool,
}

impl ActionChip {
    pub(crate) fn new(view: ActionNodeView, editor: Entity<ActionEditorView>) -> Self {
        Self {
            view,
            editor,
            store_index: None,
            inline_query: None,
            equation: None,
            drag: None,
            selected: false,
        }
    }

    pub(crate) fn store_index(mut self, store_index: Option<usize>) -> Self {
        self.store_index = store_index;
        self
    }

    pub(crate) fn inline_query(mut self, query: Option<String>) -> Self {
        self.inline_query = query;
        self
    }

    pub(crate) fn equation(mut self, input: Option<Entity<InputState>>) -> Self {
        self.equation = input;
        self
    }

    pub(crate) fn drag(mut self, drag: Option<ActionDrag>) -> Self {
        self.drag = drag;
        self
    }

    pub(crate) fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    fn render_word(&self, cx: &App) -> AnyElement {
        let theme = cx.theme();
        let editing = self.inline_query.is_some();
        let word: SharedString = self
            .inline_query
            .clone()
            .unwrap_or_else(|| self.view.word.clone())
            .into();
        let hint = self.view.hint.clone();
        let editor = self.editor.clone();
        let id = self.view.id.clone();
        let read_only = self.view.read_only;

        div()
            .id(("action-word", self.view.index))
            .px(px(4.))
            .rounded(px(4.))
            .font_weight(FontWeight::MEDIUM)
            .when(editing, |this| {
                this.border_1()
                    .border_color(theme.primary)
                    .bg(theme.background)
            })
            .child(word)
            .when(!read_only, |this| {
                this.on_mouse_down(MouseButton::Left, move |event, window, cx| {
                    if event.click_count < 2 {
                        return;
                    }
                    cx.stop_propagation();
                    editor.update(cx, |this, cx| {
                        this.begin_inline_edit(&id, event.position, window, cx);
                    });
                })
            })
            .when_some(hint, |this, hint| {
                this.tooltip(move |window, cx| Tooltip::new(hint.clone()).build(window, cx))
            })
            .into_any_element()
    }

    fn render_qualifier(&self) -> AnyElement {
        let view = &self.view;
        let editor = self.editor.clone();
        let id = view.id.clone();
        let next = view
            .qualifier_options
            .iter()
            .position(|option| option.id == view.qualifier)
            .map(|ix| (ix + 1) % view.qualifier_options.len().max(1))
            .and_then(|ix| view.qualifier_options.get(ix))
            .or_else(|| view.qualifier_options.first())
            .map(|option| option.id.clone());
        let options = view.qualifier_options.clone();
        let current = view.qualifier.clone();
        let menu_editor = self.editor.clone();
        let menu_id = view.id.clone();

        div()
            .id(("action-qualifier-menu", view.index))
            .child(
                Button::new(("action-qualifier", view.index))
                    .ghost()
                    .xsmall()
                    .label(view.qualifier_label().to_string())
                    .tooltip("Qualifier (right-click for all)")
                    .on_click(move |_, _window, cx| {
                        let Some(next) = next.clone() else {
                            return;
                        };
                        editor.update(cx, |this, cx| {
                            this.update_node(cx, |api| api.update_qualifier(&id, &next));
                        });
                    }),
            )
            .context_menu(move |menu: PopupMenu, _window: &mut Window, _cx| {
                let mut menu = menu;
                for option in &options {
                    let editor = menu_editor.clone();
                    let id = menu_id.clone();
                    let qualifier = option.id.clone();
                    let mut item = PopupMenuItem::new(option.label.clone()).on_click(
                        move |_, _window, cx| {
                            editor.update(cx, |this, cx| {
                                this.update_node(cx, |api| api.update_qualifier(&id, &qualifier));
                            });
                        },
                    );
                    if option.id == current {
                        item = item.icon(Icon::new(IconName::Check).xsmall());
                    }
                    menu = menu.item(item);
                }
                menu
            })
            .into_any_element()
    }

    fn render_action_id(&self) -> AnyElement {
        let view = &self.view;
        let options = view.action_id_options;
        let current = view.action_id.clone();
        let menu_editor = self.editor.clone();
        let menu_id = view.id.clone();

        div()
            .id(("action-id-menu", view.index))
            .child(
                Button::new(("action-id", view.index))
                    .ghost()
                    .xsmall()
                    .label(view.action_id_label().to_string())
                    .tooltip("Action (right-click to change)"),
            )
            .context_menu(move |menu: PopupMenu, _window: &mut Window, _cx| {
                let mut menu = menu;
                for option in options {
                    let editor = menu_editor.clone();
                    let id = menu_id.clone();
                    let action_id = option.id;
                    let mut item =
                        PopupMenuItem::new(option.label).on_click(move |_, _window, cx| {
                            editor.update(cx, |this, cx| {
                                this.update_node(cx, |api| api.update_action_id(&id, action_id));
                            });
                        });
                    if option.id == current {
                        item = item.icon(Icon::new(IconName::Check).xsmall());
                    }
                    menu = menu.item(item);
                }
                menu
            })
            .into_any_element()
    }
}

impl RenderOnce for ActionChip {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let theme = cx.theme().clone();
        let view = self.view.clone();
        let read_only = view.read_only;
        let border = if self.selected {
            theme.primary
        } else {
            theme.border
        };
        let bg = if self.selected {
            theme.accent
        } else {
            theme.muted
        };

        let select_editor = self.editor.clone();
        let select_id = view.id.clone();
        let remove_editor = self.editor.clone();
        let remove_id = view.id.clone();
        let layout_editor = self.editor.clone();

        let word = self.render_word(cx);
        let equation = self.equation.clone().map(|input| {
            div()
                .w(px(64.))
                .rounded(px(4.))
                .border_1()
                .border_color(if view.equation_valid {
                    theme.border
                } else {
                    theme.red
                })
                .child(Input::new(&input).xsmall())
        });
        let controls = (!read_only).then(|| {
            h_flex()
                .gap_x_0p5()
                .items_center()
                .on_mouse_down(MouseButton::Left, |_, _window, cx| cx.stop_propagation())
                .child(self.render_qualifier())
                .child(self.render_action_id())
                .children(equation)
                .child(
                    Button::new(("action-remove", view.index))
                        .ghost()
                        .xsmall()
                        .icon(IconName::Close)
                        .tooltip("Remove")
                        .on_click(move |_, _window, cx| {
                            remove_editor.update(cx, |this, cx| {
                                this.update_node(cx, |api| api.remove_action(&remove_id));
                            });
                        }),
                )
        });

        h_flex()
            .id(("action-node", view.index))
            .items_center()
            .gap_x_1()
            .mx(px(2.))
            .px(px(6.))
            .py(px(2.))
            .rounded(px(6.))
            .border_1()
            .border_color(border)
            .bg(bg)
            .text_sm()
            .on_click(move |_, window, cx| {
                select_editor.update(cx, |this, cx| this.select_node(&select_id, window, cx));
            })
            .when_some(self.store_index, |this, index| {
                this.on_drag_move::<ActionDrag>(move |event, _window, cx| {
                    layout_editor.update(cx, |this, _| this.record_node_box(index, event.bounds));
                })
            })
            .when_some(self.drag, |this, drag| {
                this.cursor(CursorStyle::OpenHand)
                    .on_drag(drag, |drag, _offset, _window, cx| {
                        let label = drag.item.record.word.clone();
                        cx.new(|_| DragGhost::new(label.into()))
                    })
            })
            .child(word)
            .children(controls)
            .when(read_only && !view.equation.is_empty(), |this| {
                this.child(
                    div()
                        .text_xs()
                        .text_color(if view.equation_valid {
                            theme.muted_foreground
                        } else {
                            theme.red
                        })
                        .child(view.equation.clone()),
                )
            })
    }
}
