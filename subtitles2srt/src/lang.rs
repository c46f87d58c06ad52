//! Picking a Tesseract language.

use isolang::Language;

/// Tesseract names a few languages differently from ISO 639-3.
const TESSERACT_OVERRIDES: &[(&str, &str)] = &[("zho", "chi_sim")];

/// Convert an ISO 639-1 (or 639-3) code to the name of the matching
/// Tesseract language, if we know it.
///
/// ```text
/// "en" -> "eng", "de" -> "deu", "zh" -> "chi_sim"
/// ```
pub fn tesseract_language(code: &str) -> Option<String> {
    let code = code.trim().to_ascii_lowercase();
    let lang = match code.len() {
        2 => Language::from_639_1(&code),
        3 => Language::from_639_3(&code),
        _ => None,
    }?;
    let iso = lang.to_639_3();
    let name = TESSERACT_OVERRIDES
        .iter()
        .find(|(from, _)| *from == iso)
        .map_or(iso, |(_, to)| *to);
    Some(name.to_owned())
}

/// Decide which language to OCR in. An explicit Tesseract language always
/// wins, then the subtitle language (from the command line or the frame
/// index), and finally English.
pub fn select_language(
    tesseract_lang: Option<&str>,
    subtitle_lang: Option<&str>,
) -> String {
    if let Some(lang) = tesseract_lang {
        return lang.to_owned();
    }
    if let Some(code) = subtitle_lang {
        match tesseract_language(code) {
            Some(lang) => return lang,
            None => log::warn!("unknown language code {:?}, using English", code),
        }
    }
    "eng".to_owned()
}
