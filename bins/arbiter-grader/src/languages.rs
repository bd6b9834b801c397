// Language registry: fixed table from our language identifiers to the
// execution sandbox's numeric language ids. Unknown languages fail closed.

use arbiter_common::error::GraderError;
use arbiter_common::types::Language;

/// Resolve a language to the sandbox's internal language id.
pub fn resolve(language: Language) -> u32 {
    match language {
        Language::C => 50,
        Language::Cpp => 54,
        Language::Java => 62,
        Language::Python => 71,
        Language::Javascript => 63,
    }
}

/// Resolve a raw language key as supplied by a caller. An unrecognized key
/// is an explicit error, never a silent default.
pub fn resolve_key(key: &str) -> Result<(Language, u32), GraderError> {
    let language: Language = key.parse()?;
    Ok((language, resolve(language)))
}
