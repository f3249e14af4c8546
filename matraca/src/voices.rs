//! Built-in voice catalog for the speech service.
//!
//! Labels map to real service voice identifiers, grouped by locale. The
//! service does not publish a consistent age classification, so the "young"
//! and "mature" labels reuse an adult voice wherever a locale has no distinct
//! option; those fallbacks are marked inline. A child voice is only listed
//! where the service tags one (en-US).
//!
//! The table is immutable. The pipeline never reads it: callers resolve a
//! label here and pass the resulting identifier into the job as an opaque
//! string, so unlisted service voices work too.

/// One locale's worth of selectable voices.
#[derive(Debug, Clone, Copy)]
pub struct LocaleVoices {
    /// Human-readable language name.
    pub language: &'static str,
    /// BCP-47 locale tag.
    pub locale: &'static str,
    /// `(label, service voice id)` pairs in display order. Labels carry the
    /// locale tag so they stay unique across the whole catalog.
    pub voices: &'static [(&'static str, &'static str)],
}

pub const CATALOG: &[LocaleVoices] = &[
    LocaleVoices {
        language: "Portuguese (Brazil)",
        locale: "pt-BR",
        voices: &[
            ("Adult narrator (male / pt-BR)", "pt-BR-AntonioNeural"),
            ("Adult narrator (female / pt-BR)", "pt-BR-FranciscaNeural"),
            // Only male voice in pt-BR.
            ("Young voice (male / pt-BR)", "pt-BR-AntonioNeural"),
            ("Young voice (female / pt-BR)", "pt-BR-ThalitaMultilingualNeural"),
            // No official senior voices; the deepest adult timbres stand in.
            ("Mature voice (male / pt-BR)", "pt-BR-AntonioNeural"),
            ("Mature voice (female / pt-BR)", "pt-BR-FranciscaNeural"),
        ],
    },
    LocaleVoices {
        language: "Spanish (Spain)",
        locale: "es-ES",
        voices: &[
            ("Adult narrator (male / es-ES)", "es-ES-AlvaroNeural"),
            ("Adult narrator (female / es-ES)", "es-ES-ElviraNeural"),
            // Only male voice in es-ES.
            ("Young voice (male / es-ES)", "es-ES-AlvaroNeural"),
            ("Young voice (female / es-ES)", "es-ES-XimenaNeural"),
            ("Mature voice (male / es-ES)", "es-ES-AlvaroNeural"),
            ("Mature voice (female / es-ES)", "es-ES-ElviraNeural"),
        ],
    },
    LocaleVoices {
        language: "English (United States)",
        locale: "en-US",
        voices: &[
            ("Adult narrator (male / en-US)", "en-US-GuyNeural"),
            ("Adult narrator (female / en-US)", "en-US-JennyNeural"),
            ("Young voice (male / en-US)", "en-US-BrianNeural"),
            ("Young voice (female / en-US)", "en-US-EmmaNeural"),
            // Tagged Cartoon/Cute by the service.
            ("Child voice (female / en-US)", "en-US-AnaNeural"),
            ("Mature voice (male / en-US)", "en-US-ChristopherNeural"),
            ("Mature voice (female / en-US)", "en-US-AriaNeural"),
        ],
    },
    LocaleVoices {
        language: "French (France)",
        locale: "fr-FR",
        voices: &[
            ("Adult narrator (male / fr-FR)", "fr-FR-HenriNeural"),
            ("Adult narrator (female / fr-FR)", "fr-FR-DeniseNeural"),
            ("Young voice (male / fr-FR)", "fr-FR-RemyMultilingualNeural"),
            ("Young voice (female / fr-FR)", "fr-FR-EloiseNeural"),
            ("Mature voice (male / fr-FR)", "fr-FR-HenriNeural"),
            ("Mature voice (female / fr-FR)", "fr-FR-VivienneMultilingualNeural"),
        ],
    },
    LocaleVoices {
        language: "German (Germany)",
        locale: "de-DE",
        voices: &[
            ("Adult narrator (male / de-DE)", "de-DE-ConradNeural"),
            ("Adult narrator (female / de-DE)", "de-DE-KatjaNeural"),
            ("Young voice (male / de-DE)", "de-DE-KillianNeural"),
            ("Young voice (female / de-DE)", "de-DE-AmalaNeural"),
            ("Mature voice (male / de-DE)", "de-DE-FlorianMultilingualNeural"),
            ("Mature voice (female / de-DE)", "de-DE-SeraphinaMultilingualNeural"),
        ],
    },
];

/// Resolve a display label to its service voice identifier.
pub fn resolve(label: &str) -> Option<&'static str> {
    CATALOG
        .iter()
        .flat_map(|l| l.voices.iter())
        .find(|(name, _)| *name == label)
        .map(|(_, id)| *id)
}

/// Look up a locale's voice list by its BCP-47 tag.
pub fn find_locale(tag: &str) -> Option<&'static LocaleVoices> {
    CATALOG.iter().find(|l| l.locale.eq_ignore_ascii_case(tag))
}
