use std::collections::BTreeMap;
use std::fmt::Write;

use crate::generator::GenerationForm;
use crate::report::ReportRow;

const HEADING: &str = "Generate test users";
const DESCRIPTION: &str = "Creates confirmed accounts with random names, unique \
    email addresses and a profile picture. Usernames are the prefix followed by \
    consecutive numbers starting at the index.";

/// Everything the generator page shows
pub struct PageView<'a> {
    pub form: &'a GenerationForm,
    pub errors: &'a BTreeMap<String, String>,
    pub report: Option<&'a [ReportRow]>,
    pub max_batch_size: u32,
}

impl PageView<'_> {
    pub fn render(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>");
        html.push_str(HEADING);
        html.push_str("</title></head>\n<body>\n");
        let _ = writeln!(html, "<h1>{}</h1>", HEADING);
        let _ = writeln!(html, "<p>{}</p>", DESCRIPTION);

        if let Some(rows) = self.report {
            self.render_report(&mut html, rows);
        }
        self.render_form(&mut html);

        html.push_str("</body>\n</html>\n");
        html
    }

    fn render_report(&self, html: &mut String, rows: &[ReportRow]) {
        html.push_str("<table class=\"generated-users\">\n");
        html.push_str("<tr><th>Full name</th><th>Username</th><th>Email</th></tr>\n");
        for row in rows {
            html.push_str("<tr><td>");
            if let Some(picture) = &row.picture {
                let _ = write!(
                    html,
                    "<img src=\"{}\" alt=\"\" width=\"35\" height=\"35\"> ",
                    escape(picture)
                );
            }
            let _ = writeln!(
                html,
                "{}</td><td>{}</td><td>{}</td></tr>",
                escape(&row.full_name),
                escape(&row.username),
                escape(&row.email)
            );
        }
        if rows.is_empty() {
            html.push_str("<tr><td colspan=\"3\">No accounts in this range</td></tr>\n");
        }
        html.push_str("</table>\n");
    }

    fn render_form(&self, html: &mut String) {
        html.push_str("<form method=\"post\" action=\"/\">\n");
        self.render_field(
            html,
            "usercount",
            &format!("Number of users (1 to {})", self.max_batch_size),
            "text",
            &self.form.usercount,
        );
        self.render_field(
            html,
            "usernameprefix",
            "Username prefix",
            "text",
            &self.form.usernameprefix,
        );
        self.render_field(
            html,
            "usernameindex",
            "First index",
            "text",
            &self.form.usernameindex,
        );
        self.render_field(html, "password", "Password", "text", &self.form.password);
        html.push_str("<button type=\"submit\">Generate</button>\n</form>\n");
    }

    fn render_field(&self, html: &mut String, name: &str, label: &str, kind: &str, value: &str) {
        let _ = writeln!(
            html,
            "<p><label for=\"{name}\">{label}</label> \
             <input type=\"{kind}\" id=\"{name}\" name=\"{name}\" value=\"{value}\">",
            name = name,
            label = escape(label),
            kind = kind,
            value = escape(value)
        );
        if let Some(message) = self.errors.get(name) {
            let _ = writeln!(html, "<span class=\"error\">{}</span>", escape(message));
        }
        html.push_str("</p>\n");
    }
}

/// Minimal HTML escaping for text and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
