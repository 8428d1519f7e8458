//! GHS classification data.
//!
//! Maps GHS H-codes to pictogram classes. See
//! https://pubchem.ncbi.nlm.nih.gov/ghs/ for the published table.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// H-code to comma-joined pictogram classes. Combination codes joined with
/// `+` are distinct keys and must be looked up verbatim, never split.
static PICTOGRAMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("H200", "GHS01"),
        ("H201", "GHS01"),
        ("H202", "GHS01"),
        ("H203", "GHS01"),
        ("H204", "GHS01,GHS07"),
        ("H205", "GHS02"),
        ("H206", "GHS02"),
        ("H207", "GHS02"),
        ("H208", "GHS02"),
        ("H209", "GHS01"),
        ("H210", "GHS01"),
        ("H211", "GHS01"),
        ("H220", "GHS02"),
        ("H221", "GHS02"),
        ("H222", "GHS02"),
        ("H223", "GHS02"),
        ("H224", "GHS02"),
        ("H225", "GHS02"),
        ("H226", "GHS02"),
        ("H228", "GHS02"),
        ("H229", "GHS02"),
        ("H230", "GHS02"),
        ("H231", "GHS02"),
        ("H232", "GHS02"),
        ("H240", "GHS01"),
        ("H241", "GHS01,GHS02"),
        ("H242", "GHS02"),
        ("H250", "GHS02"),
        ("H251", "GHS02"),
        ("H252", "GHS02"),
        ("H260", "GHS02"),
        ("H261", "GHS02"),
        ("H270", "GHS03"),
        ("H271", "GHS03"),
        ("H272", "GHS03"),
        ("H280", "GHS04"),
        ("H281", "GHS04"),
        ("H282", "GHS02,GHS04"),
        ("H283", "GHS02,GHS04"),
        ("H284", "GHS04"),
        ("H290", "GHS05"),
        ("H300", "GHS06"),
        ("H301", "GHS06"),
        ("H302", "GHS07"),
        ("H304", "GHS08"),
        ("H305", "GHS08"),
        ("H310", "GHS06"),
        ("H311", "GHS06"),
        ("H312", "GHS07"),
        ("H314", "GHS05"),
        ("H315", "GHS07"),
        ("H317", "GHS07"),
        ("H318", "GHS05"),
        ("H319", "GHS07"),
        ("H330", "GHS06"),
        ("H331", "GHS06"),
        ("H332", "GHS07"),
        ("H334", "GHS08"),
        ("H335", "GHS07"),
        ("H336", "GHS07"),
        ("H340", "GHS08"),
        ("H341", "GHS08"),
        ("H350", "GHS08"),
        ("H351", "GHS08"),
        ("H360", "GHS08"),
        ("H361", "GHS08"),
        ("H370", "GHS08"),
        ("H371", "GHS08"),
        ("H372", "GHS08"),
        ("H373", "GHS08"),
        ("H400", "GHS09"),
        ("H410", "GHS09"),
        ("H411", "GHS09"),
        ("H420", "GHS07"),
        ("H300+H310", "GHS06"),
        ("H300+H330", "GHS06"),
        ("H310+H330", "GHS06"),
        ("H300+H310+H330", "GHS06"),
        ("H301+H311", "GHS06"),
        ("H301+H331", "GHS06"),
        ("H311+H331", "GHS06"),
        ("H301+H311+H331", "GHS06"),
        ("H302+H312", "GHS07"),
        ("H302+H332", "GHS07"),
        ("H312+H332", "GHS07"),
        ("H302+H312+H332", "GHS07"),
        ("H315+H320", "GHS07"),
    ])
});

/// Pictogram classes for an H-code, when the code is in the table.
pub fn pictogram_for(code: &str) -> Option<&'static str> {
    PICTOGRAMS.get(code).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve() {
        assert_eq!(pictogram_for("H302"), Some("GHS07"));
        assert_eq!(pictogram_for("H204"), Some("GHS01,GHS07"));
        assert_eq!(pictogram_for("H420"), Some("GHS07"));
    }

    #[test]
    fn combination_codes_are_verbatim_keys() {
        assert_eq!(pictogram_for("H301+H311+H331"), Some("GHS06"));
        // The parts of a combination code are in the table, but the
        // combination itself is the identity being looked up.
        assert_eq!(pictogram_for("H315+H320"), Some("GHS07"));
    }

    #[test]
    fn unlisted_codes_have_no_pictogram() {
        assert_eq!(pictogram_for("H999"), None);
        assert_eq!(pictogram_for(""), None);
    }
}
