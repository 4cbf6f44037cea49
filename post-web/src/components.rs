use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use post_client::pagination::{is_paginated, page_numbers, range_label, PageItem};
use post_client::view::empty_message;
use post_client::{
    ListQuery, ListView, Notification, NotificationKind, PaginationInfo, Post, PostsSync,
    QueryStore, SearchInput, SEARCH_DEBOUNCE,
};

use crate::client::PostsWeb;
use crate::{ListEpoch, Route};

const PAGE_SIZES: [u32; 4] = [6, 9, 12, 24];
const TOAST_MILLIS: u32 = 4_000;

/// Toasts on screen, each with an id so its timer can dismiss exactly that one.
#[derive(Debug, Default)]
pub struct Toasts {
    next_id: u64,
    items: Vec<(u64, Notification)>,
}

impl Toasts {
    fn push(&mut self, note: Notification) -> u64 {
        self.next_id += 1;
        self.items.push((self.next_id, note));
        self.next_id
    }

    fn dismiss(&mut self, id: u64) {
        self.items.retain(|(i, _)| *i != id);
    }
}

pub fn show_notifications(mut toasts: Signal<Toasts>, notes: Vec<Notification>) {
    for note in notes {
        let id = toasts.write().push(note);
        spawn(async move {
            TimeoutFuture::new(TOAST_MILLIS).await;
            toasts.write().dismiss(id);
        });
    }
}

#[component]
pub fn ToastStack() -> Element {
    let mut toasts = use_context::<Signal<Toasts>>();
    let items: Vec<(u64, Notification)> = toasts.read().items.clone();

    rsx! {
        div { class: "fixed bottom-6 right-6 z-[60] flex flex-col gap-3 w-80",
            for (id, note) in items {
                div {
                    key: "{id}",
                    class: match note.kind {
                        NotificationKind::Success => "p-4 rounded-xl shadow-lg bg-green-600 text-white",
                        NotificationKind::Error => "p-4 rounded-xl shadow-lg bg-red-600 text-white",
                    },
                    div { class: "flex justify-between items-start gap-3",
                        div {
                            p { class: "font-semibold", "{note.title}" }
                            p { class: "text-sm opacity-90", "{note.description}" }
                        }
                        button {
                            class: "text-white/80 hover:text-white",
                            onclick: move |_| toasts.write().dismiss(id),
                            "×"
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn SearchBar() -> Element {
    let mut store = use_context::<Signal<QueryStore>>();
    let mut input = use_signal(|| SearchInput::new(store.peek().search_query()));

    let committed = store.read().search_query().to_string();
    let text = input.read().text().to_string();
    let searching = input.read().is_searching(&committed);

    let on_input = move |evt: FormEvent| {
        let committed = store.peek().search_query().to_string();
        let Some(ticket) = input.write().input(evt.value(), &committed) else {
            return;
        };
        spawn(async move {
            TimeoutFuture::new(SEARCH_DEBOUNCE.as_millis() as u32).await;
            input.peek().fire(ticket, &mut store.write());
        });
    };

    rsx! {
        div { class: "relative max-w-2xl",
            input {
                r#type: "text",
                placeholder: "Search posts by title, content, or tags...",
                value: "{text}",
                oninput: on_input,
                class: "w-full pl-5 pr-24 py-4 bg-white border border-gray-300 rounded-xl shadow-sm focus:outline-none focus:ring-2 focus:ring-indigo-500 focus:border-indigo-500 transition text-black"
            }
            div { class: "absolute right-4 top-1/2 -translate-y-1/2 flex items-center gap-3",
                if searching {
                    div { class: "animate-spin rounded-full h-5 w-5 border-2 border-indigo-600 border-t-transparent" }
                }
                if !text.is_empty() {
                    button {
                        r#type: "button",
                        class: "text-gray-400 hover:text-gray-600 transition",
                        onclick: move |_| input.write().clear(&mut store.write()),
                        "Clear"
                    }
                }
            }
        }
    }
}

#[component]
pub fn PageSizePicker() -> Element {
    let mut store = use_context::<Signal<QueryStore>>();
    let limit = store.read().limit();

    rsx! {
        label { class: "flex items-center gap-2 text-sm text-gray-600",
            "Per page"
            select {
                class: "px-3 py-2 bg-white border border-gray-300 rounded-lg text-black",
                onchange: move |evt| {
                    if let Ok(limit) = evt.value().parse::<u32>() {
                        store.write().set_limit(limit);
                    }
                },
                for size in PAGE_SIZES {
                    option { value: "{size}", selected: size == limit, "{size}" }
                }
            }
        }
    }
}

#[component]
pub fn PostList() -> Element {
    let sync = use_context::<PostsSync<PostsWeb>>();
    let store = use_context::<Signal<QueryStore>>();
    let ListEpoch(epoch) = use_context::<ListEpoch>();
    let mut retries = use_signal(|| 0u32);

    let fetch = use_resource({
        let sync = sync.clone();
        move || {
            let sync = sync.clone();
            let query = ListQuery::from(store.read().state());
            let _ = epoch.read();
            let _ = retries.read();
            async move { sync.fetch_list(&query).await }
        }
    });
    let _ = fetch.read();

    let query = ListQuery::from(store.read().state());
    let current_page = query.page;
    let view = ListView::derive(&sync.list_snapshot(&query), &query.search);

    match view {
        ListView::Loading => rsx! { LoadingGrid {} },
        ListView::Failed { message } => rsx! {
            ErrorState {
                title: "Failed to load posts",
                message,
                on_retry: move |_| *retries.write() += 1,
            }
        },
        ListView::Empty { search } => rsx! { EmptyState { search } },
        ListView::Page { posts, is_placeholder } => rsx! {
            div { class: if is_placeholder { "opacity-60 transition-opacity" } else { "transition-opacity" },
                div { class: "grid gap-8 md:grid-cols-2 lg:grid-cols-3",
                    for post in posts.data.iter().cloned() {
                        PostCard { key: "{post.id}", post }
                    }
                }
            }
            Pagination { current_page, info: posts.pagination.clone() }
        },
    }
}

#[component]
fn PostCard(post: Post) -> Element {
    let (tags, hidden) = post.card_tags();
    let tags = tags.to_vec();
    let initials = post.author_initials();
    let published = post.published_on();
    let images = post.image_count();

    rsx! {
        article { class: "bg-white rounded-2xl shadow-lg hover:shadow-2xl transition overflow-hidden",
            Link { to: Route::PostPage { id: post.id.clone() },
                div { class: "relative h-52 overflow-hidden bg-gray-100",
                    img { class: "w-full h-full object-cover", src: "{post.cover_url()}", alt: "{post.title}" }
                    if images > 1 {
                        span { class: "absolute top-3 right-3 px-2.5 py-1 bg-black/60 text-white text-xs rounded-full",
                            "{images} images"
                        }
                    }
                }
                div { class: "p-6",
                    if !tags.is_empty() {
                        div { class: "flex flex-wrap gap-2 mb-3",
                            for tag in tags {
                                span { class: "px-2.5 py-1 bg-indigo-50 text-indigo-700 text-xs font-medium rounded-full", "{tag}" }
                            }
                            if hidden > 0 {
                                span { class: "px-2.5 py-1 bg-gray-100 text-gray-600 text-xs font-medium rounded-full", "+{hidden}" }
                            }
                        }
                    }
                    h2 { class: "text-xl font-bold text-gray-900 mb-2 line-clamp-2", "{post.title}" }
                    p { class: "text-gray-600 line-clamp-3", "{post.excerpt}" }
                    div { class: "mt-5 flex items-center gap-3",
                        div { class: "w-9 h-9 rounded-full bg-gradient-to-br from-blue-500 to-indigo-600 text-white text-sm font-semibold flex items-center justify-center",
                            "{initials}"
                        }
                        div { class: "text-sm",
                            p { class: "font-medium text-gray-900", "{post.author}" }
                            p { class: "text-gray-500", "{published}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn Pagination(current_page: u32, info: PaginationInfo) -> Element {
    let mut store = use_context::<Signal<QueryStore>>();
    if !is_paginated(&info) {
        return rsx! {};
    }

    let total = u32::try_from(info.total_pages).unwrap_or(u32::MAX);
    let label = range_label(current_page, &info);
    let mut go_to = move |page: u32| {
        store.write().set_current_page(page);
        let _ = document::eval("window.scrollTo({ top: 0, behavior: 'smooth' })");
    };

    rsx! {
        div { class: "mt-12 flex flex-col items-center gap-4",
            p { class: "text-sm text-gray-500", "{label}" }
            nav { class: "flex items-center gap-2",
                button {
                    class: "px-4 py-2 border border-gray-300 rounded-lg text-gray-700 hover:bg-gray-50 disabled:opacity-50 disabled:cursor-not-allowed",
                    disabled: !info.has_prev_page,
                    onclick: move |_| go_to(current_page.saturating_sub(1).max(1)),
                    "Previous"
                }
                for (i, item) in page_numbers(current_page, total).into_iter().enumerate() {
                    match item {
                        PageItem::Page(n) => rsx! {
                            button {
                                key: "{i}",
                                class: if n == current_page {
                                    "w-10 h-10 rounded-lg bg-indigo-600 text-white font-semibold shadow-md"
                                } else {
                                    "w-10 h-10 rounded-lg border border-gray-300 text-gray-700 hover:bg-gray-50"
                                },
                                onclick: move |_| go_to(n),
                                "{n}"
                            }
                        },
                        PageItem::Ellipsis => rsx! {
                            span { key: "{i}", class: "px-2 text-gray-400", "..." }
                        },
                    }
                }
                button {
                    class: "px-4 py-2 border border-gray-300 rounded-lg text-gray-700 hover:bg-gray-50 disabled:opacity-50 disabled:cursor-not-allowed",
                    disabled: !info.has_next_page,
                    onclick: move |_| go_to(current_page + 1),
                    "Next"
                }
            }
        }
    }
}

#[component]
fn LoadingGrid() -> Element {
    rsx! {
        div { class: "grid gap-8 md:grid-cols-2 lg:grid-cols-3",
            for i in 0..9 {
                div { key: "{i}", class: "bg-white rounded-2xl shadow-lg overflow-hidden animate-pulse",
                    div { class: "h-52 bg-gray-200" }
                    div { class: "p-6 space-y-3",
                        div { class: "h-4 bg-gray-200 rounded w-1/3" }
                        div { class: "h-6 bg-gray-200 rounded w-3/4" }
                        div { class: "h-4 bg-gray-200 rounded" }
                        div { class: "h-4 bg-gray-200 rounded w-5/6" }
                    }
                }
            }
        }
    }
}

#[component]
fn EmptyState(search: String) -> Element {
    let (title, body) = empty_message(&search);
    rsx! {
        div { class: "text-center py-20",
            h3 { class: "text-2xl font-bold text-gray-900 mb-2", "{title}" }
            p { class: "text-gray-500", "{body}" }
        }
    }
}

#[component]
pub fn ErrorState(title: String, message: String, on_retry: EventHandler<MouseEvent>) -> Element {
    rsx! {
        div { class: "max-w-md mx-auto text-center py-20",
            h3 { class: "text-2xl font-bold text-gray-900 mb-2", "{title}" }
            p { class: "text-red-600 mb-6", "{message}" }
            button {
                class: "px-6 py-3 bg-indigo-600 text-white rounded-xl hover:bg-indigo-700 transition shadow-md",
                onclick: move |evt| on_retry.call(evt),
                "Try again"
            }
        }
    }
}
