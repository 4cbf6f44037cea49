use dioxus::prelude::*;
use post_client::{DetailView, Post, PostsSync, QueryStore};

use crate::client::PostsWeb;
use crate::components::{ErrorState, PageSizePicker, PostList, SearchBar, ToastStack, Toasts};
use crate::compose::CreatePostModal;
use crate::storage::LocalPageSize;

mod client;
mod components;
mod compose;
mod storage;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const API_URL: &str = match option_env!("POSTS_API_URL") {
    Some(url) => url,
    None => DEFAULT_API_URL,
};
const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

/// Bumped after a successful create so every list query re-runs.
#[derive(Clone, Copy)]
pub struct ListEpoch(pub Signal<u64>);

#[derive(Clone, Routable, Debug, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Navbar)]
        #[route("/")]
        Home {},
        #[route("/posts/:id")]
        PostPage { id: String },
}

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let store = use_signal(|| QueryStore::new(LocalPageSize));
    let epoch = use_signal(|| 0u64);
    let toasts = use_signal(Toasts::default);

    use_context_provider(|| store);
    use_context_provider(|| ListEpoch(epoch));
    use_context_provider(|| toasts);
    use_context_provider(|| PostsSync::new(PostsWeb::new(API_URL)));

    rsx! {
        document::Script { src: TAILWIND_CDN }
        Router::<Route> {}
        ToastStack {}
    }
}

#[component]
fn Navbar() -> Element {
    rsx! {
        nav { class: "bg-white/80 backdrop-blur-md border-b border-gray-200 sticky top-0 z-40 shadow-sm",
            div { class: "max-w-7xl mx-auto px-6 py-4 flex justify-between items-center",
                Link { to: Route::Home {}, class: "text-2xl font-bold text-indigo-600 hover:text-indigo-700 transition", "Nerd Blog Explorer" }
                p { class: "hidden md:block text-gray-500 text-sm", "Discover amazing tech stories and insights" }
            }
        }
        Outlet::<Route> {}
    }
}

#[component]
fn Home() -> Element {
    let mut composing = use_signal(|| false);

    rsx! {
        main { class: "min-h-screen bg-gradient-to-br from-slate-50 via-blue-50/30 to-indigo-50/30",
            header { class: "max-w-7xl mx-auto px-6 pt-10 pb-6",
                div { class: "flex flex-col sm:flex-row items-start sm:items-center justify-between gap-6 mb-8",
                    h1 { class: "text-4xl font-bold text-gray-900", "Latest posts" }
                    button {
                        onclick: move |_| composing.set(true),
                        class: "px-6 py-3 bg-indigo-600 text-white font-medium rounded-xl hover:bg-indigo-700 shadow-lg transition",
                        "Create Post"
                    }
                }
                div { class: "flex flex-col md:flex-row md:items-center gap-4 justify-between",
                    SearchBar {}
                    PageSizePicker {}
                }
            }
            div { class: "max-w-7xl mx-auto px-6 py-8",
                PostList {}
            }
        }

        if composing() {
            CreatePostModal { on_close: move |_| composing.set(false) }
        }
    }
}

#[component]
fn PostPage(id: String) -> Element {
    let sync = use_context::<PostsSync<PostsWeb>>();
    let mut retries = use_signal(|| 0u32);

    let fetch = use_resource({
        let sync = sync.clone();
        let id = id.clone();
        move || {
            let sync = sync.clone();
            let id = id.clone();
            let _ = retries.read();
            async move { sync.fetch_post(&id).await }
        }
    });
    let _ = fetch.read();

    let view = DetailView::derive(&sync.post_snapshot(&id));

    rsx! {
        article { class: "max-w-4xl mx-auto px-6 py-12",
            Link { to: Route::Home {}, class: "inline-block mb-8 text-indigo-600 hover:text-indigo-700 font-medium", "← Back to posts" }
            match view {
                DetailView::Loading => rsx! {
                    div { class: "flex justify-center items-center py-32",
                        div { class: "animate-spin rounded-full h-16 w-16 border-4 border-indigo-600 border-t-transparent" }
                    }
                },
                DetailView::Failed { message } => rsx! {
                    ErrorState {
                        title: "Failed to load post",
                        message,
                        on_retry: move |_| *retries.write() += 1,
                    }
                },
                DetailView::Loaded(post) => rsx! { PostDetail { key: "{post.id}", post } },
            }
        }
    }
}

#[component]
fn PostDetail(post: Post) -> Element {
    let mut selected = use_signal(|| 0usize);
    let gallery: Vec<String> = post.gallery().into_iter().map(str::to_string).collect();
    let total = gallery.len();
    let current = selected().min(total.saturating_sub(1));
    let main_image = gallery.get(current).cloned().unwrap_or_else(|| post.cover_url().to_string());
    let initials = post.author_initials();
    let published = post.published_on();

    rsx! {
        div { class: "bg-white rounded-2xl shadow-xl overflow-hidden",
            div { class: "relative bg-gray-100",
                img { class: "w-full max-h-[480px] object-cover", src: "{main_image}", alt: "{post.title}" }
                if total > 1 {
                    span { class: "absolute bottom-4 right-4 px-3 py-1 bg-black/60 text-white text-sm rounded-full",
                        "{current + 1} / {total}"
                    }
                }
            }
            if total > 1 {
                div { class: "flex gap-3 p-4 overflow-x-auto",
                    for (i, url) in gallery.into_iter().enumerate() {
                        button {
                            key: "{i}",
                            onclick: move |_| selected.set(i),
                            class: if i == current {
                                "w-20 h-20 flex-shrink-0 rounded-lg overflow-hidden ring-2 ring-indigo-600"
                            } else {
                                "w-20 h-20 flex-shrink-0 rounded-lg overflow-hidden opacity-70 hover:opacity-100"
                            },
                            img { class: "w-full h-full object-cover", src: "{url}", alt: "Image {i + 1}" }
                        }
                    }
                }
            }

            div { class: "p-10 md:p-14",
                if !post.tags.is_empty() {
                    div { class: "flex flex-wrap gap-2 mb-6",
                        for tag in post.tags.iter() {
                            span { class: "px-3 py-1 bg-indigo-50 text-indigo-700 text-sm font-medium rounded-full", "{tag}" }
                        }
                    }
                }
                h1 { class: "text-4xl md:text-5xl font-bold text-gray-900 mb-6", "{post.title}" }
                div { class: "flex items-center gap-3 mb-10",
                    div { class: "w-11 h-11 rounded-full bg-gradient-to-br from-blue-500 to-indigo-600 text-white font-semibold flex items-center justify-center",
                        "{initials}"
                    }
                    div {
                        p { class: "font-medium text-gray-900", "{post.author}" }
                        p { class: "text-sm text-gray-500", "{published}" }
                    }
                }
                p { class: "text-gray-700 text-lg leading-relaxed whitespace-pre-wrap", "{post.content}" }
            }
        }
    }
}
