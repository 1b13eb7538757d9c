//! Index page: users with delete buttons, an add-user form, the upload
//! form and the stored files.

use crate::{responses::AppError, state::AppState};
use axum::{extract::State, response::Html, routing::get, Router};
use cachet_core::UserRecord;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write;
use tracing::warn;

/// Creates the index router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    // The page stays usable for uploads while the store is down.
    let users = match state.user_gateway.list().await {
        Ok(list) => list.users,
        Err(e) => {
            warn!("Rendering index without users: {}", e);
            Vec::new()
        }
    };
    let files = state.upload_gateway.list_files().await?;
    let field_name = &state.upload_gateway.limits().field_name;

    Ok(Html(render_index(&users, &files, field_name)))
}

/// Renders the page. Every interpolated value is escaped.
#[must_use]
pub fn render_index(users: &[UserRecord], files: &[String], field_name: &str) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Cachet</title>\n</head>\n<body>\n<h1>Users</h1>\n",
    );

    if users.is_empty() {
        html.push_str("<p>No users.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for user in users {
            let _ = writeln!(
                html,
                "<li>{} &lt;{}&gt; <form method=\"post\" action=\"/users/delete/{}\" \
                 style=\"display:inline\"><button type=\"submit\">Delete</button></form></li>",
                escape_html(&user.name),
                escape_html(&user.email),
                user.id
            );
        }
        html.push_str("</ul>\n");
    }

    html.push_str(
        "<form method=\"post\" action=\"/users\">\n\
         <input name=\"name\" placeholder=\"Name\" required>\n\
         <input name=\"email\" type=\"email\" placeholder=\"Email\" required>\n\
         <button type=\"submit\">Add user</button>\n</form>\n<h1>Files</h1>\n",
    );

    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"{}\">\n<button type=\"submit\">Upload</button>\n</form>",
        escape_html(field_name)
    );

    if files.is_empty() {
        html.push_str("<p>No files.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for file in files {
            let _ = writeln!(
                html,
                "<li><a href=\"/download/{}\">{}</a></li>",
                encode_path_segment(file),
                escape_html(file)
            );
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Everything outside the RFC 3986 unreserved set.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachet_core::UserId;

    #[test]
    fn test_user_text_is_escaped() {
        let users = vec![UserRecord {
            id: UserId(1),
            name: "<script>alert(1)</script>".to_string(),
            email: "a&b@example.com".to_string(),
        }];

        let html = render_index(&users, &[], "myFile");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a&amp;b@example.com"));
        assert!(html.contains("action=\"/users/delete/1\""));
    }

    #[test]
    fn test_files_link_to_download() {
        let files = vec!["myFile-1.png".to_string(), "odd name#1.pdf".to_string()];

        let html = render_index(&[], &files, "myFile");
        assert!(html.contains("href=\"/download/myFile-1.png\""));
        assert!(html.contains("href=\"/download/odd%20name%231.pdf\""));
        assert!(html.contains("name=\"myFile\""));
        assert!(html.contains("No users."));
    }

    #[test]
    fn test_path_segment_keeps_unreserved_characters() {
        assert_eq!(encode_path_segment("myFile-1_a.b~c"), "myFile-1_a.b~c");
        assert_eq!(encode_path_segment("../x y"), "..%2Fx%20y");
        assert_eq!(encode_path_segment("é.png"), "%C3%A9.png");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"'"<&>"#), "&#39;&quot;&lt;&amp;&gt;");
    }
}
