use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::auth::repo::User;

pub const DISCUSSIONS_TEMPLATE: &str = "discussions/discussions.html";

const CURRENT_USER_SLOT: &str = "{{ current_user }}";
const USERS_LIST_SLOT: &str = "{{ users_list }}";

/// Served when the discussions template cannot be read.
pub const DISCUSSIONS_FALLBACK: &str =
    "<html><body><h2>Discussions are temporarily unavailable</h2></body></html>";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

pub fn timestamp(at: &OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}

/// Fills the `{{ current_user }}` and `{{ users_list }}` slots. Only the
/// template text is searched for slots, never the inserted user data.
pub fn discussions(template: &str, current: Option<&User>, users: &[User]) -> String {
    let greeting = match current {
        Some(u) => format!(
            "<p>Signed in as <strong>{}</strong> ({}). <a href=\"/logout\">Log out</a></p>",
            escape(&u.username),
            escape(&u.email)
        ),
        None => "<p>You are browsing as a guest. <a href=\"/login\">Log in</a> or \
                 <a href=\"/register\">register</a>.</p>"
            .to_string(),
    };

    let rows: String = users
        .iter()
        .map(|u| format!("<li data-user-id=\"{}\">{}</li>", u.id, escape(&u.username)))
        .collect();

    template
        .split(CURRENT_USER_SLOT)
        .map(|part| part.replace(USERS_LIST_SLOT, &rows))
        .collect::<Vec<_>>()
        .join(greeting.as_str())
}

pub fn users_table(users: &[User]) -> String {
    let rows: String = users
        .iter()
        .map(|u| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                u.id,
                escape(&u.username),
                escape(&u.email),
                timestamp(&u.created_at)
            )
        })
        .collect();
    format!(
        r#"<html><head><meta charset="utf-8"><title>Users</title></head>
<body style="font-family:Inter,Arial,Helvetica,sans-serif;padding:20px">
  <h2>Users</h2>
  <table border="1" cellpadding="6" cellspacing="0">
    <thead><tr><th>id</th><th>username</th><th>email</th><th>created_at</th></tr></thead>
    <tbody>{rows}</tbody>
  </table>
  <p><a href="/">Home</a></p>
</body></html>"#
    )
}
