//! Full-page documents: the shell and the login form.

use crate::orgs::model::Org;
use crate::store::User;
use crate::ui::html::escape;

/// The page shell. The root element carries the class attribute the busy
/// indicator mutates; the stylesheet keys the cursor off the busy class.
pub fn shell(title: &str, busy_class: &str, root_classes: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html class="{root}">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="https://unpkg.com/htmx.org@1.9.12"></script>
<style>
html.{busy} {{ cursor: progress; }}
.flash-error {{ color: #b00020; }}
.flash-ok {{ color: #1b5e20; }}
td.timer.overdue {{ color: #b00020; font-weight: bold; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        root = escape(root_classes),
        title = escape(title),
        busy = escape(busy_class),
        body = body
    )
}

/// Landing page: the user's orgs, or a pointer at the login form.
pub fn home_body(user: Option<&User>, orgs: &[Org]) -> String {
    let mut out = String::new();
    match user {
        None => {
            out.push_str(r#"<p><a href="/login">Sign in</a> to see your organisations.</p>"#);
        }
        Some(user) => {
            out.push_str(&format!("<h1>Organisations for {}</h1><ul>", escape(user.display())));
            for org in orgs {
                out.push_str(&format!(
                    r#"<li><a href="/orgs/{}/members" hx-boost="true">{}</a></li>"#,
                    org.id,
                    escape(&org.name)
                ));
            }
            out.push_str("</ul>");
            out.push_str(
                r#"<form hx-post="/orgs" hx-swap="none">
<input name="name" placeholder="New organisation" required>
<input name="description" placeholder="Description">
<button type="submit">Create</button>
</form>"#,
            );
        }
    }
    out
}

/// The login form.
pub fn login_body(error: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(error) = error {
        out.push_str(&format!(r#"<div class="flash flash-error">{}</div>"#, escape(error)));
    }
    out.push_str(
        r#"<form method="post" action="/login">
<input name="username" placeholder="username" required>
<input name="password" type="password" placeholder="password" required>
<button type="submit">Sign in</button>
</form>"#,
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_wires_busy_class_into_stylesheet() {
        let page = shell("Wire Console", "hx-busy", "", "<p>hi</p>");
        assert!(page.contains("html.hx-busy { cursor: progress; }"));
        assert!(page.contains(r#"<html class="">"#));
        assert!(page.contains("<p>hi</p>"));
    }

    #[test]
    fn test_home_body_lists_orgs() {
        let user = User {
            id: 1,
            username: "owner".into(),
            email: String::new(),
            display_name: String::new(),
            password_sha256: String::new(),
        };
        let orgs = vec![Org {
            id: 4,
            name: "Grid North".into(),
            description: String::new(),
            created_by: 1,
            created_at: chrono::Utc::now(),
        }];
        let body = home_body(Some(&user), &orgs);
        assert!(body.contains("/orgs/4/members"));
        assert!(body.contains("Grid North"));
    }
}
