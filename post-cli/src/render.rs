use post_client::pagination::{PageItem, is_paginated, page_numbers, range_label};
use post_client::view::empty_message;
use post_client::{DetailView, ListView, Notification, NotificationKind, PaginatedPosts, Post};

pub fn print_list(view: &ListView, current_page: u32) {
    match view {
        ListView::Loading => println!("Loading posts..."),
        ListView::Failed { message } => {
            println!("Error: {message}");
            println!("Run the command again to retry.");
        }
        ListView::Empty { search } => {
            let (title, body) = empty_message(search);
            println!("{title}");
            println!("{body}");
        }
        ListView::Page { posts, .. } => print_page(posts, current_page),
    }
}

fn print_page(page: &PaginatedPosts, current_page: u32) {
    for post in &page.data {
        print_card(post);
        println!();
    }

    let info = &page.pagination;
    if !is_paginated(info) {
        return;
    }
    println!("{}", range_label(current_page, info));
    let total = u32::try_from(info.total_pages).unwrap_or(u32::MAX);
    let buttons: Vec<String> = page_numbers(current_page, total)
        .into_iter()
        .map(|item| match item {
            PageItem::Page(n) if n == current_page => format!("[{n}]"),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "...".to_string(),
        })
        .collect();
    let prev = if info.has_prev_page { "<" } else { " " };
    let next = if info.has_next_page { ">" } else { " " };
    println!("{prev} {} {next}", buttons.join(" "));
}

fn print_card(post: &Post) {
    println!("[{}] {}", post.id, post.title);
    println!(
        "  by {} ({}) on {}",
        post.author,
        post.author_initials(),
        post.published_on()
    );
    println!("  {}", post.excerpt);

    let (tags, hidden) = post.card_tags();
    if !tags.is_empty() {
        let mut line = tags.join(", ");
        if hidden > 0 {
            line.push_str(&format!(" +{hidden}"));
        }
        println!("  tags: {line}");
    }

    match post.image_count() {
        0 | 1 => println!("  cover: {}", post.cover_url()),
        n => println!("  cover: {} ({n} images)", post.cover_url()),
    }
}

pub fn print_detail(view: &DetailView) {
    match view {
        DetailView::Loading => println!("Loading..."),
        DetailView::Failed { message } => {
            println!("Error: {message}");
            println!("Run the command again to retry.");
        }
        DetailView::Loaded(post) => {
            println!("{}", post.title);
            println!("by {} on {}", post.author, post.published_on());
            if !post.tags.is_empty() {
                println!("tags: {}", post.tags.join(", "));
            }

            let gallery = post.gallery();
            for (i, url) in gallery.iter().enumerate() {
                println!("image {} / {}: {url}", i + 1, gallery.len());
            }
            println!();
            println!("{}", post.content);
        }
    }
}

pub fn print_notification(note: &Notification) {
    let mark = match note.kind {
        NotificationKind::Success => "ok",
        NotificationKind::Error => "error",
    };
    println!("[{mark}] {}: {}", note.title, note.description);
}
