use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{Theme, h_flex, v_flex};
use playlist_action_core::SuggestionState;

use crate::view::ActionEditorView;

const MAX_MENU_HEIGHT: f32 = 220.;

pub(crate) fn render_suggestion_menu(
    state: &SuggestionState,
    editor: Entity<ActionEditorView>,
    theme: &Theme,
) -> AnyElement {
    let rows = state.items.iter().enumerate().map(|(ix, item)| {
        let selected = state.selected_index == Some(ix);
        let editor = editor.clone();
        h_flex()
            .id(("action-suggestion", ix))
            .justify_between()
            .gap_x_3()
            .px(px(8.))
            .py(px(4.))
            .rounded(px(4.))
            .cursor_pointer()
            .when(selected, |this| {
                this.bg(theme.accent).text_color(theme.accent_foreground)
            })
            .hover(|this| this.bg(theme.accent.alpha(0.5)))
            // Mouse down, not click: the choice must land before the editor blurs.
            .on_mouse_down(MouseButton::Left, move |_, _window, cx| {
                cx.stop_propagation();
                editor.update(cx, |this, cx| this.select_suggestion(ix, cx));
            })
            .child(div().text_sm().child(item.word.clone()))
            .when(!item.hint.is_empty(), |this| {
                this.child(
                    div()
                        .text_xs()
                        .text_color(theme.muted_foreground)
                        .child(item.hint.clone()),
                )
            })
    });

    v_flex()
        .id("action-suggestions")
        .min_w(px(180.))
        .max_h(px(MAX_MENU_HEIGHT))
        .overflow_y_scroll()
        .p(px(4.))
        .gap_y_0p5()
        .rounded(px(8.))
        .border_1()
        .border_color(theme.border)
        .bg(theme.popover)
        .text_color(theme.popover_foreground)
        .shadow_md()
        .children(rows)
        .when(state.items.is_empty(), |this| {
            this.child(
                div()
                    .px(px(8.))
                    .py(px(4.))
                    .text_sm()
                    .text_color(theme.muted_foreground)
                    .child("No matching actions"),
            )
        })
        .into_any_element()
}
