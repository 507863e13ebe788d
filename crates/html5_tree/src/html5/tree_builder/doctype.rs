//! Doctype classification into document compatibility modes.

use super::modes::QuirksMode;

/// Public identifier prefixes that force quirks mode.
const QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

const QUIRKY_PUBLIC_EXACT: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

const QUIRKY_SYSTEM_EXACT: &str = "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd";

/// Quirks without a system identifier, limited quirks with one.
const HTML401_LOOSE_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

const LIMITED_QUIRKS_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

/// Obsolete but permitted `(public, system)` pairs; `None` system means the
/// identifier may also be missing.
const OBSOLETE_PERMITTED: &[(&str, Option<&str>)] = &[
    (
        "-//W3C//DTD HTML 4.0//EN",
        Some("http://www.w3.org/TR/REC-html40/strict.dtd"),
    ),
    (
        "-//W3C//DTD HTML 4.01//EN",
        Some("http://www.w3.org/TR/html4/strict.dtd"),
    ),
    (
        "-//W3C//DTD XHTML 1.0 Strict//EN",
        Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"),
    ),
    (
        "-//W3C//DTD XHTML 1.1//EN",
        Some("http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd"),
    ),
];

/// How a doctype token relates to the no-quirks `<!DOCTYPE html>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DoctypeClass {
    Quirks,
    LimitedQuirks,
    /// Obsolete permitted doctype; standards mode with a warning.
    Obsolete,
    /// Unrecognised identifiers; standards mode with an error.
    Unknown,
    Standard,
}

impl DoctypeClass {
    pub(crate) fn quirks_mode(self) -> QuirksMode {
        match self {
            DoctypeClass::Quirks => QuirksMode::Quirks,
            DoctypeClass::LimitedQuirks => QuirksMode::LimitedQuirks,
            DoctypeClass::Obsolete | DoctypeClass::Unknown | DoctypeClass::Standard => {
                QuirksMode::NoQuirks
            }
        }
    }
}

fn starts_with_any(haystack: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| haystack.starts_with(prefix))
}

pub(crate) fn classify_doctype(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
) -> DoctypeClass {
    let public = public_id.map(str::to_ascii_lowercase);
    let system = system_id.map(str::to_ascii_lowercase);
    let public_lower = public.as_deref().unwrap_or("");

    let is_html = name.is_some_and(|name| name.eq_ignore_ascii_case("html"));
    if force_quirks
        || !is_html
        || QUIRKY_PUBLIC_EXACT.contains(&public_lower)
        || starts_with_any(public_lower, QUIRKY_PUBLIC_PREFIXES)
        || system.as_deref() == Some(QUIRKY_SYSTEM_EXACT)
        || (system.is_none() && starts_with_any(public_lower, HTML401_LOOSE_PREFIXES))
    {
        return DoctypeClass::Quirks;
    }

    if starts_with_any(public_lower, LIMITED_QUIRKS_PREFIXES)
        || (system.is_some() && starts_with_any(public_lower, HTML401_LOOSE_PREFIXES))
    {
        return DoctypeClass::LimitedQuirks;
    }

    if let Some(public_id) = public_id {
        let obsolete = OBSOLETE_PERMITTED.iter().any(|(public, system)| {
            *public == public_id
                && (system_id == *system
                    || (system_id.is_none()
                        && (public.contains("HTML 4.0//") || public.contains("HTML 4.01//"))))
        });
        if obsolete {
            return DoctypeClass::Obsolete;
        }
    }

    let legacy_compat = system_id.is_none_or(|system| system == "about:legacy-compat");
    if public_id.is_some() || !legacy_compat {
        return DoctypeClass::Unknown;
    }
    DoctypeClass::Standard
}
