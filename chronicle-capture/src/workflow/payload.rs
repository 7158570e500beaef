//! Publish payload assembly
//!
//! Pure functions from session state to the outbound event entity. The
//! description markup differs by compose mode: manual mode wraps the
//! narrative and appends media markup, assisted mode trusts the selected
//! generation variant when it already carries markup.

use crate::models::{EntryForm, MediaKind, MediaView, PublishPayload};
use crate::story::DescriptionVariant;

/// Assemble the outbound payload from the current session state
///
/// `description_html` is the pre-assembled markup from
/// [`manual_description`] or [`assisted_description`]. An empty title
/// falls back to the entry date; the cover is the first ready image in
/// selection order.
pub fn assemble_payload(
    form: &EntryForm,
    description_html: String,
    media: &[MediaView],
) -> PublishPayload {
    let title = if form.title.trim().is_empty() {
        form.date.to_string()
    } else {
        form.title.trim().to_string()
    };
    let cover_url = media
        .iter()
        .filter(|view| view.kind == MediaKind::Image)
        .find_map(|view| view.remote_url.clone());
    let category = if form.category.trim().is_empty() {
        None
    } else {
        Some(form.category.trim().to_string())
    };

    PublishPayload {
        title,
        description_html,
        start_date: form.date,
        end_date: form.end_date,
        cover_url,
        privacy: form.privacy,
        category,
        location: form.location.clone(),
        multi_location: form.multi_location,
    }
}

/// Assemble description markup for manual mode: wrapped narrative followed
/// by media markup. Either part may be absent.
pub fn manual_description(narrative: &str, media: &[MediaView]) -> String {
    join_markup(wrap_paragraphs(narrative), media_markup(media))
}

/// Assemble description markup for assisted mode
///
/// The selected variant is used verbatim, except the original variant
/// without markup, which is wrapped with media markup appended, same as
/// manual mode. A custom copy edited down to plain text stays verbatim;
/// the user chose that text deliberately.
pub fn assisted_description(
    variant: DescriptionVariant,
    selected: &str,
    media: &[MediaView],
) -> String {
    if variant == DescriptionVariant::Original && !selected.contains('<') {
        join_markup(wrap_paragraphs(selected), media_markup(media))
    } else {
        selected.to_string()
    }
}

/// Markup for all ready media, in selection order
pub fn media_markup(media: &[MediaView]) -> String {
    media
        .iter()
        .filter_map(|view| {
            let url = view.remote_url.as_deref()?;
            Some(match view.kind {
                MediaKind::Image => format!("<img src=\"{}\" />", url),
                MediaKind::Video => format!("<video src=\"{}\" controls></video>", url),
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap plain text into paragraph markup, one `<p>` per blank-line-separated
/// block
pub fn wrap_paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| format!("<p>{}</p>", escape_html(block)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_markup(a: String, b: String) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b,
        (_, true) => a,
        (false, false) => format!("{}\n{}", a, b),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
