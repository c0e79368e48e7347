//! Template engine setup and HTML templates.

use once_cell::sync::Lazy;
use tera::{Context, Tera};

/// Global template engine instance with embedded templates.
pub static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();

    // Embed templates directly in the binary (no external files needed)
    tera.add_raw_templates(vec![
        ("base.html", BASE_TEMPLATE),
        ("images/create.html", CREATE_TEMPLATE),
        ("images/detail.html", DETAIL_TEMPLATE),
        ("images/list.html", LIST_TEMPLATE),
        ("images/list_ajax.html", LIST_AJAX_TEMPLATE),
        ("images/ranking.html", RANKING_TEMPLATE),
        ("account/login.html", LOGIN_TEMPLATE),
        ("account/register.html", REGISTER_TEMPLATE),
        ("error.html", ERROR_TEMPLATE),
    ])
    .expect("Failed to load templates");

    tera
});

/// Render a template with context
pub fn render(template: &str, context: &Context) -> Result<String, tera::Error> {
    TEMPLATES.render(template, context)
}

// =============================================================================
// Embedded Templates
// =============================================================================

const BASE_TEMPLATE: &str = r##"{% set current_section = section | default(value="") %}<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{% block title %}Imagemarks{% endblock %}</title>
    <style>
        :root {
            --bg: #0a0a0a;
            --bg-secondary: #141414;
            --foreground: #fafafa;
            --foreground-secondary: rgba(250, 250, 250, 0.7);
            --foreground-tertiary: rgba(250, 250, 250, 0.4);
            --border: #262626;
            --border-subtle: #1a1a1a;
        }

        * { box-sizing: border-box; margin: 0; padding: 0; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--foreground);
            line-height: 1.6;
            -webkit-font-smoothing: antialiased;
        }

        a { color: var(--foreground); text-decoration: none; transition: opacity 0.15s; }
        a:hover { opacity: 0.7; }

        /* Header */
        .header { border-bottom: 1px solid var(--border-subtle); padding: 20px 32px; }
        .header-content {
            max-width: 1200px;
            margin: 0 auto;
            display: flex;
            align-items: center;
            justify-content: space-between;
        }
        .logo { font-size: 18px; font-weight: 600; letter-spacing: -0.02em; }
        .nav { display: flex; gap: 32px; }
        .nav a { color: var(--foreground-secondary); font-size: 14px; }
        .nav a.selected, .nav a:hover { color: var(--foreground); opacity: 1; }

        /* Layout */
        .container { max-width: 1200px; margin: 0 auto; padding: 48px 32px; }

        h1 { font-size: 32px; font-weight: 600; letter-spacing: -0.02em; margin-bottom: 32px; }
        h2 {
            font-size: 14px;
            font-weight: 500;
            color: var(--foreground-secondary);
            text-transform: uppercase;
            letter-spacing: 0.05em;
            margin-bottom: 16px;
        }

        .card {
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 16px;
            overflow: hidden;
        }

        /* Image grid */
        .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 24px; }
        .grid .card img { width: 100%; height: 200px; object-fit: cover; display: block; }
        .card-body { padding: 16px 20px; }
        .card-body .title { font-weight: 500; }
        .detail img { max-width: 100%; border-radius: 16px; }

        /* Lists */
        .list { list-style: none; }
        .list-item {
            padding: 16px 20px;
            border-bottom: 1px solid var(--border-subtle);
            display: flex;
            align-items: center;
            gap: 16px;
        }
        .list-item:last-child { border-bottom: none; }

        .badge {
            font-size: 11px;
            font-weight: 500;
            padding: 4px 10px;
            border-radius: 100px;
            background: var(--border);
            color: var(--foreground-secondary);
            text-transform: uppercase;
        }

        /* Forms */
        .field { margin-bottom: 20px; }
        .field label { display: block; font-size: 13px; color: var(--foreground-secondary); margin-bottom: 6px; }
        .field input, .field textarea {
            width: 100%;
            padding: 10px 14px;
            border-radius: 8px;
            border: 1px solid var(--border);
            background: var(--bg);
            color: var(--foreground);
            font-size: 14px;
        }
        .errorlist { list-style: none; color: #f87171; font-size: 13px; margin-top: 6px; }
        .message { padding: 12px 20px; border-radius: 8px; background: rgba(34, 197, 94, 0.15); color: #4ade80; margin-bottom: 24px; }
        .error { padding: 12px 20px; border-radius: 8px; background: rgba(239, 68, 68, 0.15); color: #f87171; margin-bottom: 24px; }

        .btn {
            display: inline-flex;
            align-items: center;
            gap: 8px;
            padding: 10px 20px;
            border-radius: 100px;
            font-size: 14px;
            font-weight: 500;
            border: none;
            cursor: pointer;
        }
        .btn-primary { background: var(--foreground); color: var(--bg); }
        .btn-secondary { background: transparent; border: 1px solid var(--border); color: var(--foreground); }

        .text-secondary { color: var(--foreground-secondary); }
        .text-tertiary { color: var(--foreground-tertiary); }
        .text-sm { font-size: 13px; }
        .mt-4 { margin-top: 16px; }
        .mt-6 { margin-top: 24px; }
        .empty { text-align: center; padding: 64px 32px; color: var(--foreground-tertiary); }

        @media (max-width: 768px) {
            .header { padding: 16px 20px; }
            .container { padding: 32px 20px; }
            h1 { font-size: 24px; }
            .nav { gap: 20px; }
        }
    </style>
</head>
<body>
    <header class="header">
        <div class="header-content">
            <a href="/images/" class="logo">Imagemarks</a>
            <nav class="nav">
                <a href="/images/" {% if current_section == "images" %}class="selected"{% endif %}>Images</a>
                <a href="/images/ranking/" {% if current_section == "ranking" %}class="selected"{% endif %}>Ranking</a>
                <a href="/images/create/">Bookmark</a>
                {% if current_user %}
                <span class="text-tertiary">{{ current_user }}</span>
                <a href="/account/logout/">Log out</a>
                {% else %}
                <a href="/account/login/">Log in</a>
                {% endif %}
            </nav>
        </div>
    </header>
    <main class="container">
        {% if message %}<div class="message">{{ message }}</div>{% endif %}
        {% block content %}{% endblock %}
    </main>
</body>
</html>"##;

const CREATE_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Bookmark an image - Imagemarks{% endblock %}
{% block content %}
<h1>Bookmark an image</h1>
{% if form.url %}
<div class="card mt-4" style="max-width: 320px; margin-bottom: 24px;">
    <img src="{{ form.url }}" alt="" style="width: 100%; display: block;">
</div>
{% endif %}
<form method="post" action="/images/create/" class="card" style="padding: 24px; max-width: 640px;">
    <div class="field">
        <label for="title">Title</label>
        <input id="title" name="title" value="{{ form.title }}" maxlength="200">
        {% if errors.title %}<ul class="errorlist">{% for e in errors.title %}<li>{{ e }}</li>{% endfor %}</ul>{% endif %}
    </div>
    <div class="field">
        <label for="url">Image URL</label>
        <input id="url" name="url" value="{{ form.url }}">
        {% if errors.url %}<ul class="errorlist">{% for e in errors.url %}<li>{{ e }}</li>{% endfor %}</ul>{% endif %}
    </div>
    <div class="field">
        <label for="description">Description</label>
        <textarea id="description" name="description" rows="4">{{ form.description }}</textarea>
    </div>
    <button type="submit" class="btn btn-primary">Bookmark it</button>
</form>
{% endblock %}"##;

const DETAIL_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}{{ image.title }} - Imagemarks{% endblock %}
{% block content %}
<h1>{{ image.title }}</h1>
<div class="detail">
    <img src="{{ image.url }}" alt="{{ image.title }}">
    {% if image.description %}<p class="mt-4">{{ image.description }}</p>{% endif %}
    <p class="text-sm text-tertiary mt-4">Bookmarked by {{ owner }} {{ created_ago }}</p>

    <div class="mt-6" style="display: flex; gap: 24px; align-items: center;">
        <span><span id="like-count">{{ like_count }}</span> like{{ like_count | pluralize }}</span>
        <span>{% if total_views is number %}{{ total_views }} view{{ total_views | pluralize }}{% else %}views unavailable{% endif %}</span>
        {% if current_user %}
        <button id="like-button" class="btn btn-secondary" data-id="{{ image.id }}" data-action="{% if liked %}unlike{% else %}like{% endif %}">
            {% if liked %}Unlike{% else %}Like{% endif %}
        </button>
        {% endif %}
    </div>

    <h2 class="mt-6">Liked by</h2>
    {% if liked_by %}
    <ul class="card list">
        {% for name in liked_by %}<li class="list-item">{{ name }}</li>{% endfor %}
    </ul>
    {% else %}
    <p class="text-tertiary">Nobody likes this image yet.</p>
    {% endif %}
</div>
<script>
const button = document.getElementById("like-button");
if (button) {
    button.addEventListener("click", async () => {
        const action = button.dataset.action;
        const body = new URLSearchParams({ id: button.dataset.id, action: action });
        const response = await fetch("/images/like/", {
            method: "POST",
            headers: { "X-Requested-With": "XMLHttpRequest" },
            body: body,
        });
        const data = await response.json();
        if (data.status === "ok") {
            const count = document.getElementById("like-count");
            const current = parseInt(count.textContent, 10);
            count.textContent = action === "like" ? current + 1 : current - 1;
            button.dataset.action = action === "like" ? "unlike" : "like";
            button.textContent = action === "like" ? "Unlike" : "Like";
        }
    });
}
</script>
{% endblock %}"##;

const LIST_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Images - Imagemarks{% endblock %}
{% block content %}
<h1>Images bookmarked</h1>
<div id="image-list" class="grid">
    {% include "images/list_ajax.html" %}
</div>
{% if recent_actions %}
<h2 class="mt-6">Recent activity</h2>
<ul class="card list">
    {% for a in recent_actions %}
    <li class="list-item text-sm">{{ a.username }} {{ a.verb }}</li>
    {% endfor %}
</ul>
{% endif %}
<script>
let page = {{ page }};
let emptyPage = {% if has_next %}false{% else %}true{% endif %};
let blockRequest = false;
window.addEventListener("scroll", async () => {
    const margin = document.body.scrollHeight - window.innerHeight - 200;
    if (window.pageYOffset > margin && !emptyPage && !blockRequest) {
        blockRequest = true;
        page += 1;
        const response = await fetch("/images/?page=" + page, {
            headers: { "X-Requested-With": "XMLHttpRequest" },
        });
        const html = await response.text();
        if (html.trim() === "") {
            emptyPage = true;
        } else {
            document.getElementById("image-list").insertAdjacentHTML("beforeend", html);
            blockRequest = false;
        }
    }
});
</script>
{% endblock %}"##;

const LIST_AJAX_TEMPLATE: &str = r##"{% for image in images %}
<div class="card">
    <a href="{{ image.absolute_url }}"><img src="{{ image.url }}" alt="{{ image.title }}"></a>
    <div class="card-body"><a href="{{ image.absolute_url }}" class="title">{{ image.title }}</a></div>
</div>
{% endfor %}"##;

const RANKING_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Most viewed - Imagemarks{% endblock %}
{% block content %}
<h1>Images ranking</h1>
{% if most_viewed %}
<ol class="card list">
    {% for entry in most_viewed %}
    <li class="list-item">
        <span class="badge">#{{ loop.index }}</span>
        <a href="/images/{{ entry.image.id }}/{{ entry.image.slug }}/">{{ entry.image.title }}</a>
        <span class="text-tertiary text-sm">{{ entry.views }} view{{ entry.views | pluralize }}</span>
    </li>
    {% endfor %}
</ol>
{% else %}
<div class="card empty"><p>No views recorded yet</p></div>
{% endif %}
{% endblock %}"##;

const LOGIN_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Log in - Imagemarks{% endblock %}
{% block content %}
<h1>Log in</h1>
{% if error %}<div class="error">{{ error }}</div>{% endif %}
<form method="post" action="/account/login/" class="card" style="padding: 24px; max-width: 420px;">
    <input type="hidden" name="next" value="{{ next | default(value='') }}">
    <div class="field"><label for="username">Username</label><input id="username" name="username"></div>
    <div class="field"><label for="password">Password</label><input id="password" name="password" type="password"></div>
    <button type="submit" class="btn btn-primary">Log in</button>
</form>
<p class="text-secondary text-sm mt-4">No account? <a href="/account/register/">Register</a></p>
{% endblock %}"##;

const REGISTER_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Register - Imagemarks{% endblock %}
{% block content %}
<h1>Create an account</h1>
{% if error %}<div class="error">{{ error }}</div>{% endif %}
<form method="post" action="/account/register/" class="card" style="padding: 24px; max-width: 420px;">
    <div class="field"><label for="username">Username</label><input id="username" name="username"></div>
    <div class="field"><label for="email">Email</label><input id="email" name="email" type="email"></div>
    <div class="field"><label for="password">Password</label><input id="password" name="password" type="password"></div>
    <button type="submit" class="btn btn-primary">Register</button>
</form>
{% endblock %}"##;

const ERROR_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Error - Imagemarks{% endblock %}
{% block content %}
<div class="card">
    <div style="padding: 48px; text-align: center;">
        <h1 style="margin-bottom: 16px;">Something went wrong</h1>
        <p class="text-secondary">{{ message }}</p>
        <a href="/images/" class="btn btn-secondary mt-6">Back to images</a>
    </div>
</div>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_load() {
        let names: Vec<&str> = TEMPLATES.get_template_names().collect();
        assert!(names.contains(&"images/detail.html"));
        assert!(names.contains(&"images/list_ajax.html"));
    }

    #[test]
    fn test_list_fragment_escapes_titles() {
        let mut context = Context::new();
        context.insert(
            "images",
            &vec![serde_json::json!({
                "absolute_url": "/images/1/x/",
                "url": "https://example.com/x.jpg",
                "title": "<b>bold</b>",
            })],
        );
        let html = render("images/list_ajax.html", &context).unwrap();
        assert!(html.contains("&lt;b&gt;bold&lt;&#x2F;b&gt;"));
        assert!(!html.contains("<b>bold</b>"));
    }

    #[test]
    fn test_error_page() {
        let mut context = Context::new();
        context.insert("message", "Image not found");
        let html = render("error.html", &context).unwrap();
        assert!(html.contains("Image not found"));
    }
}
