use ticketscan::{DetectionError, SUPPORTED_EXTENSIONS};

/// Hint lines printed after the error message, if any.
fn hints(err: &DetectionError) -> Vec<String> {
    match err {
        DetectionError::UnsupportedFormat { .. } => vec![
            "Convert the photo to one of the supported formats or rename it with the right suffix."
                .to_string(),
        ],
        DetectionError::UnsupportedContentType { .. } => vec![format!(
            "Upload the photo as an image/* type ({}).",
            SUPPORTED_EXTENSIONS.join(", ")
        )],
        DetectionError::DocumentNotDetected { contours } => vec![
            format!("Examined {contours} contours without finding a four-sided outline."),
            "Try one of the following:".to_string(),
            "  - Photograph the ticket against a plain, contrasting background".to_string(),
            "  - Lower the thresholds with --canny-low / --canny-high".to_string(),
            "  - Raise --epsilon-ratio to simplify outlines more aggressively".to_string(),
            "  - Run `ticketscan edges <input>` to inspect the edge map".to_string(),
        ],
        _ => Vec::new(),
    }
}

pub fn report_error(err: &DetectionError) {
    eprintln!("{err}");
    let hints = hints(err);
    if !hints.is_empty() {
        eprintln!();
        for line in hints {
            eprintln!("{line}");
        }
    }
}
