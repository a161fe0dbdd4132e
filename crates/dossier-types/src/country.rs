//! Countries and territories, normalized to lowercase ISO 3166-1 alpha-2
//! codes.
//!
//! Besides the ISO list this accepts a handful of codes that investigative
//! data actually carries: dissolved states (`su`, `yucs`, `csxx`, `dd`),
//! supranational bodies (`eu`, `zz` for "global") and contested territories
//! with dashed sub-codes (`ge-ab`, `ua-cri`, ...).

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::text::fold;
use crate::{CleanContext, PropertyType};

pub static COUNTRY: CountryType = CountryType;

/// `(alpha-2, alpha-3, English name)`.
const ISO_COUNTRIES: &[(&str, &str, &str)] = &[
    ("ad", "and", "Andorra"),
    ("ae", "are", "United Arab Emirates"),
    ("af", "afg", "Afghanistan"),
    ("ag", "atg", "Antigua and Barbuda"),
    ("ai", "aia", "Anguilla"),
    ("al", "alb", "Albania"),
    ("am", "arm", "Armenia"),
    ("ao", "ago", "Angola"),
    ("aq", "ata", "Antarctica"),
    ("ar", "arg", "Argentina"),
    ("as", "asm", "American Samoa"),
    ("at", "aut", "Austria"),
    ("au", "aus", "Australia"),
    ("aw", "abw", "Aruba"),
    ("ax", "ala", "Åland Islands"),
    ("az", "aze", "Azerbaijan"),
    ("ba", "bih", "Bosnia and Herzegovina"),
    ("bb", "brb", "Barbados"),
    ("bd", "bgd", "Bangladesh"),
    ("be", "bel", "Belgium"),
    ("bf", "bfa", "Burkina Faso"),
    ("bg", "bgr", "Bulgaria"),
    ("bh", "bhr", "Bahrain"),
    ("bi", "bdi", "Burundi"),
    ("bj", "ben", "Benin"),
    ("bl", "blm", "Saint Barthélemy"),
    ("bm", "bmu", "Bermuda"),
    ("bn", "brn", "Brunei"),
    ("bo", "bol", "Bolivia"),
    ("bq", "bes", "Caribbean Netherlands"),
    ("br", "bra", "Brazil"),
    ("bs", "bhs", "Bahamas"),
    ("bt", "btn", "Bhutan"),
    ("bv", "bvt", "Bouvet Island"),
    ("bw", "bwa", "Botswana"),
    ("by", "blr", "Belarus"),
    ("bz", "blz", "Belize"),
    ("ca", "can", "Canada"),
    ("cc", "cck", "Cocos (Keeling) Islands"),
    ("cd", "cod", "DR Congo"),
    ("cf", "caf", "Central African Republic"),
    ("cg", "cog", "Congo-Brazzaville"),
    ("ch", "che", "Switzerland"),
    ("ci", "civ", "Côte d'Ivoire"),
    ("ck", "cok", "Cook Islands"),
    ("cl", "chl", "Chile"),
    ("cm", "cmr", "Cameroon"),
    ("cn", "chn", "China"),
    ("co", "col", "Colombia"),
    ("cr", "cri", "Costa Rica"),
    ("cu", "cub", "Cuba"),
    ("cv", "cpv", "Cape Verde"),
    ("cw", "cuw", "Curaçao"),
    ("cx", "cxr", "Christmas Island"),
    ("cy", "cyp", "Cyprus"),
    ("cz", "cze", "Czech Republic"),
    ("de", "deu", "Germany"),
    ("dj", "dji", "Djibouti"),
    ("dk", "dnk", "Denmark"),
    ("dm", "dma", "Dominica"),
    ("do", "dom", "Dominican Republic"),
    ("dz", "dza", "Algeria"),
    ("ec", "ecu", "Ecuador"),
    ("ee", "est", "Estonia"),
    ("eg", "egy", "Egypt"),
    ("eh", "esh", "Western Sahara"),
    ("er", "eri", "Eritrea"),
    ("es", "esp", "Spain"),
    ("et", "eth", "Ethiopia"),
    ("fi", "fin", "Finland"),
    ("fj", "fji", "Fiji"),
    ("fk", "flk", "Falkland Islands"),
    ("fm", "fsm", "Micronesia"),
    ("fo", "fro", "Faroe Islands"),
    ("fr", "fra", "France"),
    ("ga", "gab", "Gabon"),
    ("gb", "gbr", "United Kingdom"),
    ("gd", "grd", "Grenada"),
    ("ge", "geo", "Georgia"),
    ("gf", "guf", "French Guiana"),
    ("gg", "ggy", "Guernsey"),
    ("gh", "gha", "Ghana"),
    ("gi", "gib", "Gibraltar"),
    ("gl", "grl", "Greenland"),
    ("gm", "gmb", "Gambia"),
    ("gn", "gin", "Guinea"),
    ("gp", "glp", "Guadeloupe"),
    ("gq", "gnq", "Equatorial Guinea"),
    ("gr", "grc", "Greece"),
    ("gs", "sgs", "South Georgia and the South Sandwich Islands"),
    ("gt", "gtm", "Guatemala"),
    ("gu", "gum", "Guam"),
    ("gw", "gnb", "Guinea-Bissau"),
    ("gy", "guy", "Guyana"),
    ("hk", "hkg", "Hong Kong"),
    ("hm", "hmd", "Heard Island and McDonald Islands"),
    ("hn", "hnd", "Honduras"),
    ("hr", "hrv", "Croatia"),
    ("ht", "hti", "Haiti"),
    ("hu", "hun", "Hungary"),
    ("id", "idn", "Indonesia"),
    ("ie", "irl", "Ireland"),
    ("il", "isr", "Israel"),
    ("im", "imn", "Isle of Man"),
    ("in", "ind", "India"),
    ("io", "iot", "British Indian Ocean Territory"),
    ("iq", "irq", "Iraq"),
    ("ir", "irn", "Iran"),
    ("is", "isl", "Iceland"),
    ("it", "ita", "Italy"),
    ("je", "jey", "Jersey"),
    ("jm", "jam", "Jamaica"),
    ("jo", "jor", "Jordan"),
    ("jp", "jpn", "Japan"),
    ("ke", "ken", "Kenya"),
    ("kg", "kgz", "Kyrgyzstan"),
    ("kh", "khm", "Cambodia"),
    ("ki", "kir", "Kiribati"),
    ("km", "com", "Comoros"),
    ("kn", "kna", "Saint Kitts and Nevis"),
    ("kp", "prk", "North Korea"),
    ("kr", "kor", "South Korea"),
    ("kw", "kwt", "Kuwait"),
    ("ky", "cym", "Cayman Islands"),
    ("kz", "kaz", "Kazakhstan"),
    ("la", "lao", "Laos"),
    ("lb", "lbn", "Lebanon"),
    ("lc", "lca", "Saint Lucia"),
    ("li", "lie", "Liechtenstein"),
    ("lk", "lka", "Sri Lanka"),
    ("lr", "lbr", "Liberia"),
    ("ls", "lso", "Lesotho"),
    ("lt", "ltu", "Lithuania"),
    ("lu", "lux", "Luxembourg"),
    ("lv", "lva", "Latvia"),
    ("ly", "lby", "Libya"),
    ("ma", "mar", "Morocco"),
    ("mc", "mco", "Monaco"),
    ("md", "mda", "Moldova"),
    ("me", "mne", "Montenegro"),
    ("mf", "maf", "Saint Martin"),
    ("mg", "mdg", "Madagascar"),
    ("mh", "mhl", "Marshall Islands"),
    ("mk", "mkd", "North Macedonia"),
    ("ml", "mli", "Mali"),
    ("mm", "mmr", "Myanmar"),
    ("mn", "mng", "Mongolia"),
    ("mo", "mac", "Macao"),
    ("mp", "mnp", "Northern Mariana Islands"),
    ("mq", "mtq", "Martinique"),
    ("mr", "mrt", "Mauritania"),
    ("ms", "msr", "Montserrat"),
    ("mt", "mlt", "Malta"),
    ("mu", "mus", "Mauritius"),
    ("mv", "mdv", "Maldives"),
    ("mw", "mwi", "Malawi"),
    ("mx", "mex", "Mexico"),
    ("my", "mys", "Malaysia"),
    ("mz", "moz", "Mozambique"),
    ("na", "nam", "Namibia"),
    ("nc", "ncl", "New Caledonia"),
    ("ne", "ner", "Niger"),
    ("nf", "nfk", "Norfolk Island"),
    ("ng", "nga", "Nigeria"),
    ("ni", "nic", "Nicaragua"),
    ("nl", "nld", "Netherlands"),
    ("no", "nor", "Norway"),
    ("np", "npl", "Nepal"),
    ("nr", "nru", "Nauru"),
    ("nu", "niu", "Niue"),
    ("nz", "nzl", "New Zealand"),
    ("om", "omn", "Oman"),
    ("pa", "pan", "Panama"),
    ("pe", "per", "Peru"),
    ("pf", "pyf", "French Polynesia"),
    ("pg", "png", "Papua New Guinea"),
    ("ph", "phl", "Philippines"),
    ("pk", "pak", "Pakistan"),
    ("pl", "pol", "Poland"),
    ("pm", "spm", "Saint Pierre and Miquelon"),
    ("pn", "pcn", "Pitcairn Islands"),
    ("pr", "pri", "Puerto Rico"),
    ("ps", "pse", "Palestine"),
    ("pt", "prt", "Portugal"),
    ("pw", "plw", "Palau"),
    ("py", "pry", "Paraguay"),
    ("qa", "qat", "Qatar"),
    ("re", "reu", "Réunion"),
    ("ro", "rou", "Romania"),
    ("rs", "srb", "Serbia"),
    ("ru", "rus", "Russia"),
    ("rw", "rwa", "Rwanda"),
    ("sa", "sau", "Saudi Arabia"),
    ("sb", "slb", "Solomon Islands"),
    ("sc", "syc", "Seychelles"),
    ("sd", "sdn", "Sudan"),
    ("se", "swe", "Sweden"),
    ("sg", "sgp", "Singapore"),
    ("sh", "shn", "Saint Helena"),
    ("si", "svn", "Slovenia"),
    ("sj", "sjm", "Svalbard and Jan Mayen"),
    ("sk", "svk", "Slovakia"),
    ("sl", "sle", "Sierra Leone"),
    ("sm", "smr", "San Marino"),
    ("sn", "sen", "Senegal"),
    ("so", "som", "Somalia"),
    ("sr", "sur", "Suriname"),
    ("ss", "ssd", "South Sudan"),
    ("st", "stp", "São Tomé and Príncipe"),
    ("sv", "slv", "El Salvador"),
    ("sx", "sxm", "Sint Maarten"),
    ("sy", "syr", "Syria"),
    ("sz", "swz", "Eswatini"),
    ("tc", "tca", "Turks and Caicos Islands"),
    ("td", "tcd", "Chad"),
    ("tf", "atf", "French Southern Territories"),
    ("tg", "tgo", "Togo"),
    ("th", "tha", "Thailand"),
    ("tj", "tjk", "Tajikistan"),
    ("tk", "tkl", "Tokelau"),
    ("tl", "tls", "Timor-Leste"),
    ("tm", "tkm", "Turkmenistan"),
    ("tn", "tun", "Tunisia"),
    ("to", "ton", "Tonga"),
    ("tr", "tur", "Turkey"),
    ("tt", "tto", "Trinidad and Tobago"),
    ("tv", "tuv", "Tuvalu"),
    ("tw", "twn", "Taiwan"),
    ("tz", "tza", "Tanzania"),
    ("ua", "ukr", "Ukraine"),
    ("ug", "uga", "Uganda"),
    ("um", "umi", "United States Minor Outlying Islands"),
    ("us", "usa", "United States"),
    ("uy", "ury", "Uruguay"),
    ("uz", "uzb", "Uzbekistan"),
    ("va", "vat", "Vatican City"),
    ("vc", "vct", "Saint Vincent and the Grenadines"),
    ("ve", "ven", "Venezuela"),
    ("vg", "vgb", "British Virgin Islands"),
    ("vi", "vir", "US Virgin Islands"),
    ("vn", "vnm", "Vietnam"),
    ("vu", "vut", "Vanuatu"),
    ("wf", "wlf", "Wallis and Futuna"),
    ("ws", "wsm", "Samoa"),
    ("ye", "yem", "Yemen"),
    ("yt", "myt", "Mayotte"),
    ("za", "zaf", "South Africa"),
    ("zm", "zmb", "Zambia"),
    ("zw", "zwe", "Zimbabwe"),
];

/// Codes outside ISO 3166-1: legacy states, blocs and contested territories.
const EXTRA_TERRITORIES: &[(&str, &str)] = &[
    ("zz", "Global"),
    ("eu", "European Union"),
    ("xk", "Kosovo"),
    ("su", "Soviet Union"),
    ("yucs", "Yugoslavia"),
    ("csxx", "Serbia and Montenegro"),
    ("cshh", "Czechoslovakia"),
    ("dd", "East Germany"),
    ("ge-ab", "Abkhazia"),
    ("ge-so", "South Ossetia"),
    ("cy-trnc", "Northern Cyprus"),
    ("so-som", "Somaliland"),
    ("iq-kr", "Kurdistan"),
    ("md-pmr", "Transnistria"),
    ("az-nk", "Artsakh"),
    ("ua-cri", "Crimea"),
    ("ua-dpr", "Donetsk People's Republic"),
    ("ua-lpr", "Luhansk People's Republic"),
    ("x-so", "Somaliland"),
];

/// Common alternative spellings, folded, mapped to a code.
const ALIASES: &[(&str, &str)] = &[
    ("uk", "gb"),
    ("great britain", "gb"),
    ("england", "gb"),
    ("scotland", "gb"),
    ("wales", "gb"),
    ("northern ireland", "gb"),
    ("united states of america", "us"),
    ("america", "us"),
    ("russian federation", "ru"),
    ("ussr", "su"),
    ("soviet union", "su"),
    ("yugoslavia", "yucs"),
    ("federal republic of germany", "de"),
    ("deutschland", "de"),
    ("west germany", "de"),
    ("german democratic republic", "dd"),
    ("holland", "nl"),
    ("the netherlands", "nl"),
    ("czechia", "cz"),
    ("ivory coast", "ci"),
    ("burma", "mm"),
    ("swaziland", "sz"),
    ("macedonia", "mk"),
    ("republic of korea", "kr"),
    ("korea south", "kr"),
    ("democratic people s republic of korea", "kp"),
    ("korea north", "kp"),
    ("islamic republic of iran", "ir"),
    ("syrian arab republic", "sy"),
    ("viet nam", "vn"),
    ("lao people s democratic republic", "la"),
    ("republic of moldova", "md"),
    ("democratic republic of the congo", "cd"),
    ("congo kinshasa", "cd"),
    ("republic of the congo", "cg"),
    ("congo", "cg"),
    ("turkiye", "tr"),
    ("cabo verde", "cv"),
    ("east timor", "tl"),
    ("vatican", "va"),
    ("holy see", "va"),
    ("bolivia plurinational state of", "bo"),
    ("venezuela bolivarian republic of", "ve"),
    ("tanzania united republic of", "tz"),
    ("united republic of tanzania", "tz"),
    ("state of palestine", "ps"),
    ("occupied palestinian territory", "ps"),
    ("republic of kosovo", "xk"),
    ("trnc", "cy-trnc"),
    ("turkish republic of northern cyprus", "cy-trnc"),
    ("transnistria", "md-pmr"),
    ("pridnestrovie", "md-pmr"),
    ("nagorno karabakh", "az-nk"),
    ("crimea", "ua-cri"),
    ("dpr", "ua-dpr"),
    ("lpr", "ua-lpr"),
    ("worldwide", "zz"),
    ("international", "zz"),
];

struct CountryTables {
    /// lookup key → code
    lookup: HashMap<String, &'static str>,
    /// code → display name
    names: HashMap<&'static str, &'static str>,
    /// folded names for fuzzy matching
    folded_names: Vec<(String, &'static str)>,
}

static TABLES: LazyLock<CountryTables> = LazyLock::new(|| {
    let mut lookup: HashMap<String, &'static str> = HashMap::new();
    let mut names = HashMap::new();
    let mut folded_names = Vec::new();
    for (code, alpha3, name) in ISO_COUNTRIES {
        lookup.insert((*code).to_string(), *code);
        lookup.insert((*alpha3).to_string(), *code);
        lookup.insert(fold(name), *code);
        names.insert(*code, *name);
        folded_names.push((fold(name), *code));
    }
    for (code, name) in EXTRA_TERRITORIES {
        lookup.insert((*code).to_string(), *code);
        lookup.entry(fold(name)).or_insert(*code);
        names.entry(*code).or_insert(*name);
        folded_names.push((fold(name), *code));
    }
    for (alias, code) in ALIASES {
        lookup.insert((*alias).to_string(), *code);
    }
    CountryTables {
        lookup,
        names,
        folded_names,
    }
});

/// Display name for a country code.
pub fn country_name(code: &str) -> Option<&'static str> {
    TABLES.names.get(code).copied()
}

/// All known codes, unordered.
pub fn country_codes() -> impl Iterator<Item = &'static str> {
    TABLES.names.keys().copied()
}

#[derive(Debug, Clone, Copy)]
pub struct CountryType;

impl CountryType {
    fn fuzzy_lookup(folded: &str) -> Option<&'static str> {
        let mut best: Option<(f64, &'static str)> = None;
        for (name, code) in &TABLES.folded_names {
            let score = strsim::jaro_winkler(folded, name);
            if score >= 0.92 && best.map_or(true, |(s, _)| score > s) {
                best = Some((score, code));
            }
        }
        best.map(|(_, code)| code)
    }
}

impl PropertyType for CountryType {
    fn name(&self) -> &'static str {
        "country"
    }

    fn label(&self) -> &'static str {
        "Country"
    }

    fn plural(&self) -> &'static str {
        "Countries"
    }

    fn group(&self) -> Option<&'static str> {
        Some("countries")
    }

    fn matchable(&self) -> bool {
        true
    }

    fn pivot(&self) -> bool {
        true
    }

    fn max_length(&self) -> usize {
        16
    }

    fn clean_text(&self, text: &str, ctx: &CleanContext<'_>) -> Option<String> {
        let lowered = text.trim().to_lowercase();
        if let Some(code) = TABLES.lookup.get(&lowered) {
            return Some((*code).to_string());
        }
        let folded = fold(text);
        if let Some(code) = TABLES.lookup.get(&folded) {
            return Some((*code).to_string());
        }
        if ctx.fuzzy && folded.chars().count() > 3 {
            return Self::fuzzy_lookup(&folded).map(str::to_string);
        }
        None
    }

    fn country_hint(&self, value: &str) -> Option<String> {
        Some(value.to_string())
    }

    fn caption(&self, value: &str) -> String {
        country_name(value).unwrap_or(value).to_string()
    }

    fn node_id(&self, value: &str) -> Option<String> {
        Some(format!("country:{value}"))
    }
}
