//! Reply synthesis
//!
//! Lookup replies lead with the deterministic Sweetnotes catalogue link,
//! then append either the verified database hit or an invitation to
//! contribute. The user never gets an empty reply, even with an empty
//! store.

use super::notes::NoteRecord;

/// Fixed reply when the model itself is unreachable (timeout or transport
/// failure). The turn still completes; nothing is retried.
pub const FALLBACK_REPLY: &str = "My circuits are buzzing. Try again in a second!";

/// Generic user-safe reply for any classified internal failure.
pub const APOLOGY_REPLY: &str =
    "Sorry, I hit a snag handling that. Give it another try in a moment.";

/// Canonical catalogue link: `{base}/{sem}sem` when a semester is known,
/// the bare base otherwise. Independent of the store's contents.
pub fn catalogue_link(base: &str, semester: Option<&str>) -> String {
    let base = base.trim_end_matches('/');
    match semester {
        Some(sem) => format!("{base}/{sem}sem"),
        None => format!("{base}/"),
    }
}

/// Acknowledgement after a successful `save_note`.
pub fn save_ack(subject: &str) -> String {
    format!("Got it! I've saved those {subject} notes. They'll be live after a quick verification.")
}

/// Combined `find_note` reply: catalogue link first, database result (or
/// contribution invite) second.
pub fn find_reply(
    subject: &str,
    semester: Option<&str>,
    link: &str,
    note: Option<&NoteRecord>,
) -> String {
    let mut reply = format!(
        "Sure! You can find the main resources for semester {} here: {}",
        semester.unwrap_or("all"),
        link
    );

    match note {
        Some(note) => {
            reply.push_str(&format!(
                "\n\nI also found a specific verified note for {} in our database: {}",
                note.subject, note.link
            ));
        }
        None => {
            reply.push_str(&format!(
                "\n\nI couldn't find extra custom notes for \"{subject}\" in my database yet. \
                 Do you have a link to contribute?"
            ));
        }
    }

    reply
}
