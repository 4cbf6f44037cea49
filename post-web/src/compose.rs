use async_trait::async_trait;
use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use post_client::model::{EXCERPT_MAX_CHARS, TITLE_MAX_CHARS};
use post_client::upload::{MAX_IMAGES, MAX_IMAGE_MB};
use post_client::{
    read_batch, CreatePostDraft, DataUriPreview, DraftErrors, DraftField, FileMeta, FileSource,
    PostsSync,
};
use tracing::warn;

use crate::client::PostsWeb;
use crate::components::{show_notifications, Toasts};
use crate::ListEpoch;

const INPUT_CLASS: &str = "w-full px-5 py-3 border border-gray-300 rounded-xl shadow-sm focus:outline-none focus:ring-2 focus:ring-indigo-500 focus:border-indigo-500 transition text-black disabled:bg-gray-100";

#[component]
pub fn CreatePostModal(on_close: EventHandler<()>) -> Element {
    let sync = use_context::<PostsSync<PostsWeb>>();
    let toasts = use_context::<Signal<Toasts>>();
    let ListEpoch(mut epoch) = use_context::<ListEpoch>();

    let mut draft = use_signal(CreatePostDraft::new);
    let mut errors = use_signal(DraftErrors::default);
    let mut submitting = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if *submitting.peek() {
            return;
        }
        let payload = match draft.peek().to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                errors.set(e);
                return;
            }
        };
        errors.set(DraftErrors::default());
        submitting.set(true);

        let sync = sync.clone();
        spawn(async move {
            let result = sync.create_post(payload).await;
            show_notifications(toasts, sync.take_notifications());
            submitting.set(false);
            // on failure the draft stays as typed
            if result.is_ok() {
                draft.write().reset();
                *epoch.write() += 1;
                on_close.call(());
            }
        });
    };

    let busy = *submitting.read();
    let field_error = move |field: DraftField| errors.read().get(field);

    rsx! {
        div { class: "fixed inset-0 z-50 bg-black/50 backdrop-blur-sm flex items-center justify-center p-4",
            div { class: "bg-white rounded-2xl shadow-xl w-full max-w-3xl max-h-[90vh] overflow-y-auto p-8",
                div { class: "flex justify-between items-center mb-8",
                    h2 { class: "text-3xl font-bold text-gray-900", "Create New Post" }
                    button {
                        r#type: "button",
                        class: "text-gray-400 hover:text-gray-600 text-2xl",
                        disabled: busy,
                        onclick: move |_| on_close.call(()),
                        "×"
                    }
                }

                form { class: "space-y-6", onsubmit: on_submit,
                    div {
                        div { class: "flex justify-between mb-2",
                            label { class: "block text-sm font-medium text-gray-700", "Title" }
                            span { class: "text-xs text-gray-500", "{draft.read().title_len()}/{TITLE_MAX_CHARS}" }
                        }
                        input {
                            r#type: "text",
                            placeholder: "Enter a catchy title...",
                            value: "{draft.read().title}",
                            disabled: busy,
                            oninput: move |evt| draft.write().title = evt.value(),
                            class: INPUT_CLASS,
                        }
                        FieldMessage { message: field_error(DraftField::Title) }
                    }

                    div {
                        label { class: "block text-sm font-medium text-gray-700 mb-2", "Author" }
                        input {
                            r#type: "text",
                            placeholder: "Your name",
                            value: "{draft.read().author}",
                            disabled: busy,
                            oninput: move |evt| draft.write().author = evt.value(),
                            class: INPUT_CLASS,
                        }
                        FieldMessage { message: field_error(DraftField::Author) }
                    }

                    div {
                        div { class: "flex justify-between mb-2",
                            label { class: "block text-sm font-medium text-gray-700", "Excerpt" }
                            span { class: "text-xs text-gray-500", "{draft.read().excerpt_len()}/{EXCERPT_MAX_CHARS}" }
                        }
                        textarea {
                            placeholder: "A short summary shown on the card",
                            value: "{draft.read().excerpt}",
                            disabled: busy,
                            oninput: move |evt| draft.write().excerpt = evt.value(),
                            class: "{INPUT_CLASS} h-24 resize-none",
                        }
                        FieldMessage { message: field_error(DraftField::Excerpt) }
                    }

                    div {
                        label { class: "block text-sm font-medium text-gray-700 mb-2", "Content" }
                        textarea {
                            placeholder: "Write your post here...",
                            value: "{draft.read().content}",
                            disabled: busy,
                            oninput: move |evt| draft.write().content = evt.value(),
                            class: "{INPUT_CLASS} h-64 resize-none",
                        }
                        FieldMessage { message: field_error(DraftField::Content) }
                    }

                    div {
                        label { class: "block text-sm font-medium text-gray-700 mb-2", "Tags" }
                        input {
                            r#type: "text",
                            placeholder: "rust, web, tutorial",
                            value: "{draft.read().tags}",
                            disabled: busy,
                            oninput: move |evt| draft.write().tags = evt.value(),
                            class: INPUT_CLASS,
                        }
                        p { class: "mt-1 text-xs text-gray-500", "Separate tags with commas" }
                    }

                    div {
                        label { class: "block text-sm font-medium text-gray-700 mb-2", "Images" }
                        ImageUpload { draft, disabled: busy }
                        FieldMessage { message: field_error(DraftField::Images) }
                    }

                    div { class: "flex justify-end gap-4 pt-4",
                        button {
                            r#type: "button",
                            disabled: busy,
                            onclick: move |_| on_close.call(()),
                            class: "px-8 py-3.5 border border-gray-300 text-gray-700 rounded-xl hover:bg-gray-50 transition font-medium",
                            "Cancel"
                        }
                        button {
                            r#type: "submit",
                            disabled: busy,
                            class: "px-10 py-3.5 bg-indigo-600 text-white rounded-xl hover:bg-indigo-700 transition shadow-md font-medium disabled:opacity-50 disabled:cursor-not-allowed",
                            if busy { "Creating..." } else { "Create Post" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn FieldMessage(#[props(!optional)] message: Option<&'static str>) -> Element {
    match message {
        Some(message) => rsx! { p { class: "mt-1 text-sm text-red-600", "{message}" } },
        None => rsx! {},
    }
}

/// A browser file seen through the intake's metadata-first checks.
struct Picked(FileData);

#[async_trait(?Send)]
impl FileSource for Picked {
    fn meta(&self) -> FileMeta {
        FileMeta {
            name: self.0.name(),
            content_type: self.0.content_type().unwrap_or_default(),
            size: self.0.size(),
        }
    }

    async fn read(&self) -> Result<Vec<u8>, String> {
        self.0
            .read_bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| e.to_string())
    }
}

/// Picker and drop zone feeding the draft's images. Slot 0 is the cover.
#[component]
fn ImageUpload(draft: Signal<CreatePostDraft>, disabled: bool) -> Element {
    let mut dragging = use_signal(|| false);

    let intake = move |files: Vec<FileData>| {
        spawn(async move {
            if files.is_empty() {
                return;
            }
            let picked: Vec<Picked> = files.into_iter().map(Picked).collect();
            let metas: Vec<FileMeta> = picked.iter().map(FileSource::meta).collect();
            // nothing is read until the whole batch passes on metadata
            if draft.write().images.check_batch(&metas).is_err() {
                return;
            }
            let files = match read_batch(&picked).await {
                Ok(files) => files,
                Err(e) => {
                    draft.write().images.fail(e);
                    return;
                }
            };
            let Ok(batch) = draft.write().images.validate_batch(files) else {
                return;
            };
            let previewed = batch.render_previews(&DataUriPreview).await;
            if let Err(e) = draft.write().images.commit(previewed) {
                warn!(error = %e, "image batch dropped at commit");
            }
        });
    };

    let (full, count, epoch, error, previews) = {
        let draft = draft.read();
        let images = &draft.images;
        (
            images.is_full(),
            images.len(),
            images.picker_epoch(),
            images.error().map(str::to_string),
            images.previews().to_vec(),
        )
    };
    let blocked = disabled || full;

    rsx! {
        div { class: "space-y-4",
            div {
                class: if dragging() {
                    "relative border-2 border-dashed rounded-xl p-8 transition border-blue-500 bg-blue-50"
                } else if blocked {
                    "relative border-2 border-dashed rounded-xl p-8 transition border-gray-300 bg-gray-50 opacity-50 cursor-not-allowed"
                } else {
                    "relative border-2 border-dashed rounded-xl p-8 transition border-gray-300 bg-gray-50 hover:border-gray-400 hover:bg-gray-100"
                },
                ondragenter: move |evt| {
                    evt.prevent_default();
                    dragging.set(true);
                },
                ondragover: move |evt| {
                    evt.prevent_default();
                    dragging.set(true);
                },
                ondragleave: move |evt| {
                    evt.prevent_default();
                    dragging.set(false);
                },
                ondrop: move |evt: DragEvent| {
                    evt.prevent_default();
                    dragging.set(false);
                    if !blocked {
                        intake(evt.files());
                    }
                },

                div { class: "flex flex-col items-center justify-center text-center",
                    label { class: "text-sm text-gray-600 mb-2",
                        span { class: "text-blue-600 hover:text-blue-700 font-medium cursor-pointer", "Click to upload" }
                        " or drag and drop"
                        input {
                            key: "{epoch}",
                            r#type: "file",
                            multiple: true,
                            accept: "image/*",
                            class: "hidden",
                            disabled: blocked,
                            onchange: move |evt: FormEvent| intake(evt.files()),
                        }
                    }
                    p { class: "text-xs text-gray-500",
                        "PNG, JPG, GIF, WEBP up to {MAX_IMAGE_MB}MB (Max {MAX_IMAGES} images)"
                    }
                    if count > 0 {
                        p { class: "text-xs text-blue-600 mt-2 font-medium", "{count} / {MAX_IMAGES} images uploaded" }
                    }
                }
            }

            if let Some(error) = error {
                div { class: "p-3 bg-red-50 border border-red-200 rounded-xl text-sm text-red-600", "{error}" }
            }

            if !previews.is_empty() {
                div { class: "grid grid-cols-2 sm:grid-cols-3 md:grid-cols-5 gap-4",
                    for (index, preview) in previews.into_iter().enumerate() {
                        div {
                            key: "{index}",
                            class: "relative aspect-square rounded-xl overflow-hidden border-2 border-gray-200",
                            img { class: "w-full h-full object-cover", src: "{preview}", alt: "Preview {index + 1}" }
                            if index == 0 {
                                div { class: "absolute top-2 left-2 bg-blue-600 text-white text-xs font-semibold px-2 py-1 rounded-full shadow-lg",
                                    "Cover"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
