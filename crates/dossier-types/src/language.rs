//! Languages as ISO 639-3 codes. Two-letter ISO 639-1 codes and English
//! names are accepted as input.

use crate::text::fold;
use crate::{CleanContext, PropertyType};

pub static LANGUAGE: LanguageType = LanguageType;

/// `(iso 639-3, iso 639-1, English name)`
const LANGUAGES: &[(&str, &str, &str)] = &[
    ("afr", "af", "Afrikaans"),
    ("amh", "am", "Amharic"),
    ("ara", "ar", "Arabic"),
    ("aze", "az", "Azerbaijani"),
    ("bel", "be", "Belarusian"),
    ("ben", "bn", "Bengali"),
    ("bos", "bs", "Bosnian"),
    ("bul", "bg", "Bulgarian"),
    ("cat", "ca", "Catalan"),
    ("ces", "cs", "Czech"),
    ("cym", "cy", "Welsh"),
    ("dan", "da", "Danish"),
    ("deu", "de", "German"),
    ("ell", "el", "Greek"),
    ("eng", "en", "English"),
    ("est", "et", "Estonian"),
    ("eus", "eu", "Basque"),
    ("fas", "fa", "Persian"),
    ("fin", "fi", "Finnish"),
    ("fra", "fr", "French"),
    ("gle", "ga", "Irish"),
    ("glg", "gl", "Galician"),
    ("heb", "he", "Hebrew"),
    ("hin", "hi", "Hindi"),
    ("hrv", "hr", "Croatian"),
    ("hun", "hu", "Hungarian"),
    ("hye", "hy", "Armenian"),
    ("ind", "id", "Indonesian"),
    ("isl", "is", "Icelandic"),
    ("ita", "it", "Italian"),
    ("jpn", "ja", "Japanese"),
    ("kat", "ka", "Georgian"),
    ("kaz", "kk", "Kazakh"),
    ("khm", "km", "Khmer"),
    ("kor", "ko", "Korean"),
    ("kir", "ky", "Kyrgyz"),
    ("lav", "lv", "Latvian"),
    ("lit", "lt", "Lithuanian"),
    ("ltz", "lb", "Luxembourgish"),
    ("mkd", "mk", "Macedonian"),
    ("mlt", "mt", "Maltese"),
    ("mon", "mn", "Mongolian"),
    ("msa", "ms", "Malay"),
    ("mya", "my", "Burmese"),
    ("nep", "ne", "Nepali"),
    ("nld", "nl", "Dutch"),
    ("nor", "no", "Norwegian"),
    ("pol", "pl", "Polish"),
    ("por", "pt", "Portuguese"),
    ("pus", "ps", "Pashto"),
    ("ron", "ro", "Romanian"),
    ("rus", "ru", "Russian"),
    ("slk", "sk", "Slovak"),
    ("slv", "sl", "Slovenian"),
    ("som", "so", "Somali"),
    ("spa", "es", "Spanish"),
    ("sqi", "sq", "Albanian"),
    ("srp", "sr", "Serbian"),
    ("swa", "sw", "Swahili"),
    ("swe", "sv", "Swedish"),
    ("tgk", "tg", "Tajik"),
    ("tha", "th", "Thai"),
    ("tuk", "tk", "Turkmen"),
    ("tur", "tr", "Turkish"),
    ("ukr", "uk", "Ukrainian"),
    ("urd", "ur", "Urdu"),
    ("uzb", "uz", "Uzbek"),
    ("vie", "vi", "Vietnamese"),
    ("zho", "zh", "Chinese"),
];

/// Display name for a language code.
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(iso3, _, _)| *iso3 == code)
        .map(|(_, _, name)| *name)
}

#[derive(Debug, Clone, Copy)]
pub struct LanguageType;

impl PropertyType for LanguageType {
    fn name(&self) -> &'static str {
        "language"
    }

    fn label(&self) -> &'static str {
        "Language"
    }

    fn plural(&self) -> &'static str {
        "Languages"
    }

    fn group(&self) -> Option<&'static str> {
        Some("languages")
    }

    fn max_length(&self) -> usize {
        16
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let key = text.trim().to_lowercase();
        let folded = fold(text);
        LANGUAGES
            .iter()
            .find(|(iso3, iso2, name)| *iso3 == key || *iso2 == key || fold(name) == folded)
            .map(|(iso3, _, _)| (*iso3).to_string())
    }

    fn caption(&self, value: &str) -> String {
        language_name(value).unwrap_or(value).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_and_three_letter_codes() {
        let ctx = CleanContext::default();
        assert_eq!(LANGUAGE.clean("EN", &ctx).as_deref(), Some("eng"));
        assert_eq!(LANGUAGE.clean("deu", &ctx).as_deref(), Some("deu"));
        assert_eq!(LANGUAGE.clean("Russian", &ctx).as_deref(), Some("rus"));
        assert_eq!(LANGUAGE.clean("klingon", &ctx), None);
        assert_eq!(LANGUAGE.caption("fra"), "French");
    }
}
