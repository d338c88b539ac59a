//! Marcus Chat Page

use leptos::prelude::*;

use crate::api;
use crate::components::{ChatLine, MessageBubble};

#[component]
pub fn MarcusPage() -> impl IntoView {
    let (messages, set_messages) = signal(Vec::<ChatLine>::new());
    let (input, set_input) = signal(String::new());
    let (loading, set_loading) = signal(false);
    let (authed, set_authed) = signal(true);

    // Seed the thread from persisted history, oldest first
    leptos::task::spawn_local(async move {
        if api::me().await.is_none() {
            set_authed.set(false);
            return;
        }

        if let Ok(history) = api::chat_history(10).await {
            let mut lines = Vec::new();
            for exchange in history.into_iter().rev() {
                lines.push(ChatLine {
                    role: "user".into(),
                    content: exchange.user_message,
                });
                lines.push(ChatLine {
                    role: "assistant".into(),
                    content: exchange.ai_response,
                });
            }
            set_messages.set(lines);
        }
    });

    let send = move |_| {
        let msg = input.get();
        if msg.trim().is_empty() || loading.get() {
            return;
        }

        set_messages.update(|msgs| {
            msgs.push(ChatLine {
                role: "user".into(),
                content: msg.clone(),
            });
        });

        set_input.set(String::new());
        set_loading.set(true);

        leptos::task::spawn_local(async move {
            match api::send_chat(&msg).await {
                Ok(reply) => {
                    set_messages.update(|msgs| {
                        msgs.push(ChatLine {
                            role: "assistant".into(),
                            content: reply,
                        });
                    });
                }
                Err(e) => {
                    set_messages.update(|msgs| {
                        msgs.push(ChatLine {
                            role: "error".into(),
                            content: e,
                        });
                    });
                }
            }
            set_loading.set(false);
        });
    };

    view! {
        <div class="chat">
            <Show
                when=move || authed.get()
                fallback=|| {
                    view! {
                        <div class="chat-guard">
                            <p>"Sign in to speak with Marcus."</p>
                            <a href="/" class="btn">"Back to start"</a>
                        </div>
                    }
                }
            >
                <main class="chat-main">
                    <header class="chat-header">
                        <h1>"Marcus"</h1>
                        <a href="/dashboard" class="btn-link">"Back to dashboard"</a>
                    </header>

                    <div class="messages">
                        <For
                            each=move || messages.get().into_iter().enumerate()
                            key=|(index, _)| *index
                            children=move |(_, line)| view! { <MessageBubble line=line /> }
                        />
                        <Show when=move || loading.get()>
                            <div class="message loading">"..."</div>
                        </Show>
                    </div>

                    <div class="input-area">
                        <textarea
                            placeholder="Ask Marcus anything..."
                            prop:value=move || input.get()
                            on:input=move |ev| set_input.set(event_target_value(&ev))
                            on:keydown=move |ev| {
                                if ev.key() == "Enter" && !ev.shift_key() {
                                    ev.prevent_default();
                                    send(());
                                }
                            }
                        />
                        <button on:click=send disabled=move || loading.get()>
                            {move || if loading.get() { "..." } else { "Send" }}
                        </button>
                    </div>
                </main>
            </Show>
        </div>
    }
}
