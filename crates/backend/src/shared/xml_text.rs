use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesText};

/// Appends decoded character data. Entity references arrive separately
/// as `Event::GeneralRef` and go through [`push_entity`].
pub fn push_text(out: &mut String, text: &BytesText<'_>) -> Result<(), quick_xml::Error> {
    out.push_str(&text.decode()?);
    Ok(())
}

/// Appends the text an entity reference stands for: numeric references
/// and the five XML built-ins. Anything else is kept as written.
pub fn push_entity(out: &mut String, entity: &BytesRef<'_>) -> Result<(), quick_xml::Error> {
    if let Some(ch) = entity.resolve_char_ref()? {
        out.push(ch);
        return Ok(());
    }
    let name = entity.decode()?;
    match resolve_predefined_entity(&name) {
        Some(resolved) => out.push_str(resolved),
        None => {
            out.push('&');
            out.push_str(&name);
            out.push(';');
        }
    }
    Ok(())
}
