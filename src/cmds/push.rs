use std::fs::File;
use std::io::{Read, Write};

use crate::cli::push::PushOptions;
use crate::error::AddContext;
use crate::notify::Notifier;
use crate::Result;

/// Renders the notification a push message would display. The payload is
/// read from the given file, or from `input` when no file is given.
pub fn execute<R: Read, W: Write>(
    options: PushOptions,
    notifier: &Notifier,
    input: R,
    writer: &mut W,
) -> Result<()> {
    let payload = match options.payload_path {
        Some(path) => {
            let file = File::open(&path).err_context(format!("Cannot open payload file {path}"))?;
            read_payload(file)?
        }
        None => read_payload(input)?,
    };
    match notifier.on_push(payload.as_deref()) {
        Some(notification) => {
            writeln!(writer, "{}", serde_json::to_string_pretty(&notification)?)?;
            let url = notifier.on_notification_click(&notification);
            writeln!(writer, "Click opens {url}")?;
        }
        None => writeln!(writer, "No notification to display")?,
    }
    Ok(())
}

pub fn sync<W: Write>(tag: &str, notifier: &Notifier, writer: &mut W) -> Result<()> {
    if notifier.on_sync(tag) {
        writeln!(writer, "Sync {tag} completed")?;
    } else {
        writeln!(writer, "Unknown sync tag {tag}, nothing to do")?;
    }
    Ok(())
}

// Blank input means the push message carried no data.
fn read_payload<R: Read>(mut reader: R) -> Result<Option<Vec<u8>>> {
    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;
    if payload.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }
    Ok(Some(payload))
}
