use std::fmt::Write;

use crate::entity::Entity;

/// Escape text for insertion into HTML element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Website links only keep their scheme when it is http(s); anything else
/// (`javascript:` and friends) is treated as a bare host.
fn website_href(website: &str) -> String {
    let lower = website.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        website.to_string()
    } else {
        let bare = website
            .split_once(':')
            .filter(|(scheme, _)| !scheme.contains('.') && !scheme.contains('/'))
            .map(|(_, rest)| rest.trim_start_matches('/'))
            .unwrap_or(website);
        format!("https://{bare}")
    }
}

/// Info popup body for a map marker. Every dataset field is escaped.
pub fn popup_html(entity: &Entity) -> String {
    let mut html = String::with_capacity(256);
    html.push_str(r#"<div class="infoWindow">"#);
    let _ = write!(html, "<h3>{}</h3>", escape_html(&entity.name));
    if let Some(nipt) = &entity.nipt {
        let _ = write!(
            html,
            r#"<p class="mb-1"><small class="text-muted">NIPT: {}</small></p>"#,
            escape_html(nipt)
        );
    }
    if let Some(city) = &entity.city {
        let _ = write!(
            html,
            r#"<p class="mb-1"><span class="popup-city">{}</span></p>"#,
            escape_html(city)
        );
    }
    html.push_str(r#"<div class="popup-links">"#);
    if let Some(website) = &entity.website {
        let _ = write!(
            html,
            r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="btn btn-sm btn-link">WEBSITE →</a>"#,
            escape_html(&website_href(website))
        );
    }
    if let Some(email) = &entity.email {
        let email = escape_html(email);
        let _ = write!(
            html,
            r#"<a href="mailto:{email}" class="btn btn-sm btn-link">{email}</a>"#
        );
    }
    if let Some(phone) = &entity.phone {
        let phone = escape_html(phone);
        let _ = write!(
            html,
            r#"<a href="tel:{phone}" class="btn btn-sm btn-link">{phone}</a>"#
        );
    }
    html.push_str("</div></div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::entity;

    #[test]
    fn escapes_all_markup_significant_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;"
        );
        assert_eq!(escape_html(""), "");
        assert_eq!(escape_html("Durrës"), "Durrës");
    }

    #[test]
    fn popup_renders_script_name_as_text() {
        let mut e = entity(1, "<script>alert(1)</script>", "software", None);
        e.city = Some("<img src=x onerror=alert(2)>".into());
        let html = popup_html(&e);
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<img"));
        assert!(html.contains("<h3>&lt;script&gt;alert(1)&lt;/script&gt;</h3>"));
    }

    #[test]
    fn popup_includes_optional_fields_only_when_present() {
        let bare = popup_html(&entity(1, "Alpha", "software", None));
        assert!(!bare.contains("NIPT"));
        assert!(!bare.contains("mailto:"));
        assert!(!bare.contains("tel:"));
        assert!(!bare.contains("target=\"_blank\""));

        let mut full = entity(2, "Beta", "software", Some("Tirana"));
        full.nipt = Some("L123".into());
        full.website = Some("https://beta.al".into());
        full.email = Some("info@beta.al".into());
        full.phone = Some("+355 69 000 0000".into());
        let html = popup_html(&full);
        assert!(html.contains("NIPT: L123"));
        assert!(html.contains("Tirana"));
        assert!(html.contains(
            r#"href="https://beta.al" target="_blank" rel="noopener noreferrer""#
        ));
        assert!(html.contains(r#"href="mailto:info@beta.al""#));
        assert!(html.contains(r#"href="tel:+355 69 000 0000""#));
    }

    #[test]
    fn attribute_injection_is_neutralized() {
        let mut e = entity(3, "Gamma", "software", None);
        e.email = Some(r#"x" onmouseover="alert(1)"#.into());
        let html = popup_html(&e);
        assert!(!html.contains(r#"" onmouseover=""#));
        assert!(html.contains("&quot; onmouseover=&quot;"));
    }

    #[test]
    fn website_without_http_scheme_is_forced_to_https() {
        assert_eq!(website_href("beta.al"), "https://beta.al");
        assert_eq!(website_href("HTTP://beta.al"), "HTTP://beta.al");
        assert_eq!(website_href("javascript:alert(1)"), "https://alert(1)");
        assert_eq!(website_href("beta.al:8080/x"), "https://beta.al:8080/x");
    }
}
