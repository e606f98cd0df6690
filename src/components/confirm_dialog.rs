use crate::components::ui::{Button, ButtonSize, ButtonVariant, Spinner};
use crate::flows::{FlowState, Prompt};
use crate::state::AppContext;
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;

fn active_prompt(state: &FlowState) -> Option<Prompt> {
    match state {
        FlowState::Idle => None,
        FlowState::Confirming(m) | FlowState::Committing(m) => Some(m.prompt()),
    }
}

/// Modal prompt for the pending confirmed mutation.
#[component]
pub fn ConfirmDialog() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let confirm = app_state.0.confirm;

    let prompt = Memo::new(move |_| confirm.with(|f| active_prompt(f.state())));
    let committing = Memo::new(move |_| confirm.with(|f| f.is_committing()));

    let on_cancel = {
        let state = app_state.0.clone();
        move |_: ev::MouseEvent| state.dismiss_confirmation()
    };

    let on_confirm = {
        let state = app_state.0.clone();
        move |_: ev::MouseEvent| {
            let state = state.clone();
            spawn_local(async move {
                state.confirm_pending().await;
            });
        }
    };

    view! {
        <Show when=move || prompt.get().is_some() fallback=|| ().into_view()>
            <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                <div
                    role="alertdialog"
                    class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg"
                >
                    <div class="mb-3 space-y-1">
                        <div class="text-sm font-medium text-destructive">
                            {move || prompt.get().map(|p| p.title).unwrap_or_default()}
                        </div>
                        <div class="text-xs text-muted-foreground">
                            {move || prompt.get().map(|p| p.message).unwrap_or_default()}
                        </div>
                    </div>

                    <div class="flex items-center justify-end gap-2 pt-2">
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || committing.get()
                            on:click=on_cancel.clone()
                        >
                            "Cancel"
                        </Button>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            class="border-destructive/40 text-destructive"
                            attr:disabled=move || committing.get()
                            on:click=on_confirm.clone()
                        >
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || committing.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || prompt.get().map(|p| p.confirm_label).unwrap_or_default()}
                            </span>
                        </Button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
